//! Protograph expander.
//!
//! Lifts a small integer base matrix `Hb` into the full binary parity-check
//! matrix `H` by replacing each entry with a `z x z` all-zero block (if
//! negative) or a cyclic shift of the `z x z` identity (if non-negative),
//! where `z = n / 24`. This is the same "base matrix + expansion factor"
//! construction used by the IEEE 802.16e structured LDPC codes, and mirrors
//! how [`crate::sparse::SPMatrix`] is assembled directly by the 5G NR and
//! CCSDS base-graph liftings in the wider LDPC literature.

use crate::sparse::SPMatrix;
use thiserror::Error;

/// Error expanding a base matrix.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum Error {
    /// The requested code length is too small to yield an integer expansion
    /// factor `z = n / 24 >= 1`.
    #[error("code length too small: n = {0} gives expansion factor < 1")]
    InvalidCodeLength(usize),
}

/// Expands a compressed base matrix `hb` into the lifted `SPMatrix` of a
/// code of length `n` and rate `rate`.
///
/// `rate` selects the shift rule: `"2/3A"` uses `p = v mod z`; every other
/// rate label uses `p = floor(v * z / 96)`.
///
/// # Errors
/// Returns [`Error::InvalidCodeLength`] if `z = n / 24 < 1`.
pub fn expand(hb: &[Vec<i64>], n: usize, rate: &str) -> Result<SPMatrix, Error> {
    let z = n / 24;
    if z < 1 {
        return Err(Error::InvalidCodeLength(n));
    }
    let base_rows = hb.len();
    let base_cols = hb.first().map_or(0, |row| row.len());
    let mut h = SPMatrix::new(base_rows * z, base_cols * z);
    for (bi, row) in hb.iter().enumerate() {
        for (bj, &v) in row.iter().enumerate() {
            if v < 0 {
                continue;
            }
            let p = shift(v, z, rate);
            for r in 0..z {
                h.insert(bi * z + r, bj * z + (r + p) % z);
            }
        }
    }
    Ok(h)
}

/// Computes the cyclic column shift `p` for a non-negative base-matrix entry
/// `v`, given the expansion factor `z` and the rate label.
fn shift(v: i64, z: usize, rate: &str) -> usize {
    if rate == "2/3A" {
        (v as usize) % z
    } else {
        ((v as u64) * (z as u64) / 96) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_short_code() {
        let hb = vec![vec![0, -1], vec![-1, 0]];
        assert_eq!(expand(&hb, 23, "1/2"), Err(Error::InvalidCodeLength(23)));
    }

    #[test]
    fn zero_block_is_all_zero() {
        let hb = vec![vec![-1]];
        let h = expand(&hb, 96, "1/2").unwrap();
        assert_eq!(h.num_rows(), 4);
        assert_eq!(h.num_cols(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert!(!h.contains(i, j));
            }
        }
    }

    // Scenario E: v=10, n=96 (z=4).
    #[test]
    fn scenario_e_rate_1_2() {
        let hb = vec![vec![10]];
        let h = expand(&hb, 96, "1/2").unwrap();
        // p = floor(10*4/96) = 0: plain identity.
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(h.contains(i, j), i == j);
            }
        }
    }

    #[test]
    fn scenario_e_rate_2_3a() {
        let hb = vec![vec![10]];
        let h = expand(&hb, 96, "2/3A").unwrap();
        // p = 10 mod 4 = 2: identity shifted right by 2 columns.
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(h.contains(i, j), j == (i + 2) % 4);
            }
        }
    }

    #[test]
    fn block_shape_follows_base_matrix_shape() {
        let hb = vec![vec![-1, 0, 1], vec![2, -1, 3]];
        let h = expand(&hb, 48, "1/2").unwrap();
        assert_eq!(h.num_rows(), 2 * 2);
        assert_eq!(h.num_cols(), 3 * 2);
    }

    #[test]
    fn each_nonnegative_block_has_z_ones() {
        let hb = vec![vec![5, 7], vec![-1, 3]];
        let h = expand(&hb, 240, "1/2").unwrap();
        let z = 240 / 24;
        // block (0,0)
        let count = (0..z).filter(|&i| (0..z).any(|j| h.contains(i, j))).count();
        assert_eq!(count, z);
    }
}
