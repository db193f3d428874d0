//! LDPC systematic encoder.
//!
//! This module implements a systematic encoder for `(n, k)` codes whose
//! parity-check matrix `H` has shape `(n-k) x n` and full row rank, with the
//! square submatrix formed by the last `n-k` columns of `H` invertible over
//! GF(2). Writing `H = [B | C]` with `B` `(n-k) x k` and `C` square
//! `(n-k) x (n-k)`, the encoder computes `A = C^-1 . B` by Gauss-Jordan
//! elimination directly over GF(2) (never by inverting a floating-point
//! matrix and rounding), so that `encode(u) = [u | A.u mod 2]` lies in the
//! null space of `H` for every message `u`.

use crate::{
    gf2::{gauss_reduction, GaussError, Gf2},
    sparse::SPMatrix,
};
use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix1};
use num_traits::{One, Zero};
use thiserror::Error;

/// Error building an [`Encoder`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum Error {
    /// The square submatrix formed by the last `n-k` columns of `H` is not
    /// invertible over GF(2), so no systematic encoder exists for this `H`.
    #[error("the square systematic submatrix of H is not invertible over GF(2)")]
    SingularSystematicBlock,
}

impl From<GaussError> for Error {
    fn from(e: GaussError) -> Error {
        match e {
            GaussError::NotInvertible => Error::SingularSystematicBlock,
        }
    }
}

/// A systematic LDPC encoder derived from a parity-check matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoder {
    /// `A`, of shape `(n-k) x k`: `parity = A . message (mod 2)`.
    gen_block: Array2<Gf2>,
}

impl Encoder {
    /// Builds the systematic encoder for a parity-check matrix `h` of shape
    /// `(n-k) x n`.
    ///
    /// `h`'s first `k` columns are the message positions (`B`) and its last
    /// `n-k` columns are the parity positions (`C`), matching the systematic
    /// codeword layout `[u | parity]`.
    ///
    /// # Errors
    /// Returns [`Error::SingularSystematicBlock`] if `C` is not invertible
    /// over GF(2).
    pub fn from_h(h: &SPMatrix) -> Result<Encoder, Error> {
        let rows = h.num_rows(); // n - k
        let cols = h.num_cols(); // n
        let k = cols - rows;

        // Build [C | B] as a dense GF(2) matrix, with C (h's last `rows`
        // columns) moved to the front so that eliminating the leading
        // `rows` columns reduces C to the identity and carries B through.
        let mut a = Array2::zeros((rows, cols));
        for (i, j) in h.iter_all() {
            let t = if j < k { j + rows } else { j - k };
            a[[i, t]] = Gf2::one();
        }

        gauss_reduction(&mut a)?;

        let gen_block = a.slice(s![.., rows..]).to_owned();
        Ok(Encoder { gen_block })
    }

    /// Encodes a length-`k` message into the length-`n` systematic codeword
    /// `[message | parity]`.
    pub fn encode<S>(&self, message: &ArrayBase<S, Ix1>) -> Array1<Gf2>
    where
        S: Data<Elem = Gf2>,
    {
        let parity = self.gen_block.dot(message);
        ndarray::concatenate(ndarray::Axis(0), &[message.view(), parity.view()]).unwrap()
    }

    /// Number of parity bits (`n - k`).
    pub fn parity_len(&self) -> usize {
        self.gen_block.nrows()
    }

    /// Number of message bits (`k`).
    pub fn message_len(&self) -> usize {
        self.gen_block.ncols()
    }
}

/// Converts a slice of `u8` bits (0/1) into a [`Gf2`] array, for convenience
/// at call sites that generate messages as plain bytes.
pub fn bits_to_gf2(bits: &[u8]) -> Array1<Gf2> {
    Array1::from_iter(bits.iter().map(|&b| if b == 1 { Gf2::one() } else { Gf2::zero() }))
}

/// The inverse of [`bits_to_gf2`].
pub fn gf2_to_bits<S>(a: &ArrayBase<S, Ix1>) -> Vec<u8>
where
    S: Data<Elem = Gf2>,
{
    a.iter().map(|g| g.bit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::{Rng, SeedableRng};
    use rand::Rng as _;

    fn small_h() -> SPMatrix {
        // A 4 x 12 parity check matrix (k = 8) whose last 4 columns (the
        // parity block) form an invertible block over GF(2).
        let dense: Vec<Vec<u8>> = vec![
            vec![1, 0, 0, 0, 1, 0, 1, 1, 0, 0, 0, 1],
            vec![1, 1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0],
            vec![0, 1, 1, 0, 1, 1, 0, 0, 1, 0, 1, 0],
            vec![0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 1],
        ];
        SPMatrix::from_dense(&dense).unwrap()
    }

    fn checks(h: &SPMatrix, codeword: &[u8]) -> bool {
        (0..h.num_rows()).all(|i| {
            h.iter_row(i).filter(|&&j| codeword[j] == 1).count() % 2 == 0
        })
    }

    #[test]
    fn encoder_is_systematic_and_in_kernel() {
        let h = small_h();
        let encoder = Encoder::from_h(&h).unwrap();
        assert_eq!(encoder.message_len(), 8);
        assert_eq!(encoder.parity_len(), 4);

        let mut rng = Rng::seed_from_u64(0);
        for _ in 0..20 {
            let message: Vec<u8> = (0..8).map(|_| rng.gen_range(0u8..=1u8)).collect();
            let codeword = encoder.encode(&bits_to_gf2(&message));
            let codeword = gf2_to_bits(&codeword);
            assert_eq!(&codeword[..8], &message[..]);
            assert!(checks(&h, &codeword));
        }
    }

    #[test]
    fn singular_block_is_rejected() {
        // Last two columns (the parity block C) are identical in both rows,
        // so C is rank 1 and not invertible over GF(2).
        let dense = vec![vec![1u8, 0, 1, 0], vec![0, 1, 1, 0]];
        let h = SPMatrix::from_dense(&dense).unwrap();
        assert_eq!(Encoder::from_h(&h), Err(Error::SingularSystematicBlock));
    }

    #[test]
    fn generator_is_in_kernel_for_every_message() {
        let h = small_h();
        let encoder = Encoder::from_h(&h).unwrap();
        for i in 0..(1u32 << 8) {
            let message: Vec<u8> = (0..8).map(|b| ((i >> b) & 1) as u8).collect();
            let codeword = gf2_to_bits(&encoder.encode(&bits_to_gf2(&message)));
            assert!(checks(&h, &codeword), "message {i} failed parity check");
        }
    }
}
