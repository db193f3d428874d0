//! BPSK modulation and AWGN channel simulation.
//!
//! Maps codeword bits to symbols, adds Gaussian noise, and converts the
//! noisy symbols into the intrinsic log-likelihood ratios the decoder
//! consumes.

use crate::gf2::Gf2;
use ndarray::{ArrayBase, Data, Ix1};
use num_traits::{One, Zero};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// BPSK modulator.
///
/// Maps the bit 0 to the symbol +1.0 and the bit 1 to the symbol -1.0.
#[derive(Debug, Clone, Default)]
pub struct BpskModulator {}

impl BpskModulator {
    /// Creates a new BPSK modulator.
    pub fn new() -> BpskModulator {
        BpskModulator::default()
    }

    /// Modulates a sequence of bits into symbols.
    pub fn modulate<S>(&self, codeword: &ArrayBase<S, Ix1>) -> Vec<f64>
    where
        S: Data<Elem = Gf2>,
    {
        codeword.iter().cloned().map(Self::modulate_bit).collect()
    }

    fn modulate_bit(bit: Gf2) -> f64 {
        if bit.is_zero() {
            1.0
        } else if bit.is_one() {
            -1.0
        } else {
            panic!("invalid Gf2 value")
        }
    }
}

/// AWGN channel simulation.
///
/// Adds real Gaussian noise, mean zero, standard deviation `noise_sigma`, to
/// a sequence of real symbols.
#[derive(Debug, Clone)]
pub struct AwgnChannel {
    distr: Normal<f64>,
}

impl AwgnChannel {
    /// Creates a new AWGN channel.
    ///
    /// # Panics
    /// Panics if `noise_sigma` is negative.
    pub fn new(noise_sigma: f64) -> AwgnChannel {
        assert!(noise_sigma >= 0.0);
        AwgnChannel {
            distr: Normal::new(0.0, noise_sigma).unwrap(),
        }
    }

    /// Adds noise in-place to a sequence of symbols.
    pub fn add_noise<R: Rng>(&self, rng: &mut R, symbols: &mut [f64]) {
        for x in symbols.iter_mut() {
            *x += self.distr.sample(rng);
        }
    }
}

/// Computes the intrinsic LLRs `lambda = 2r / sigma^2` for a sequence of
/// received real symbols `r`, under the [`BpskModulator`] mapping (bit 0 ->
/// +1, so a positive LLR favors the bit-0 hypothesis).
///
/// # Panics
/// Panics if `sigma` is not a positive finite number.
pub fn intrinsic_llrs(r: &[f64], sigma: f64) -> Vec<f64> {
    assert!(sigma > 0.0 && sigma.is_finite());
    let scale = 2.0 / (sigma * sigma);
    r.iter().map(|&x| scale * x).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::{Rng as ChaChaRng, SeedableRng};
    use ndarray::arr1;

    #[test]
    fn bpsk_mapping() {
        let modulator = BpskModulator::new();
        let x = modulator.modulate(&arr1(&[Gf2::zero(), Gf2::one()]));
        assert_eq!(&x, &[1.0, -1.0]);
    }

    #[test]
    #[should_panic]
    fn negative_noise_sigma_panics() {
        let _ = AwgnChannel::new(-1.0);
    }

    #[test]
    fn zero_noise_is_identity() {
        let channel = AwgnChannel::new(0.0);
        let mut rng = ChaChaRng::seed_from_u64(0);
        let mut symbols = vec![1.0, -1.0, 1.0, 1.0];
        let original = symbols.clone();
        channel.add_noise(&mut rng, &mut symbols);
        assert_eq!(symbols, original);
    }

    #[test]
    fn noise_is_reproducible_for_a_fixed_seed() {
        let channel = AwgnChannel::new(0.5);
        let mut rng_a = ChaChaRng::seed_from_u64(7);
        let mut rng_b = ChaChaRng::seed_from_u64(7);
        let mut a = vec![1.0; 16];
        let mut b = vec![1.0; 16];
        channel.add_noise(&mut rng_a, &mut a);
        channel.add_noise(&mut rng_b, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn llr_sign_favors_bit_zero_on_positive_symbol() {
        let llrs = intrinsic_llrs(&[1.0, -1.0], 1.0);
        assert!(llrs[0] > 0.0);
        assert!(llrs[1] < 0.0);
    }

    #[test]
    fn llr_scales_inversely_with_sigma_squared() {
        let strong = intrinsic_llrs(&[1.0], 0.5);
        let weak = intrinsic_llrs(&[1.0], 2.0);
        assert!(strong[0] > weak[0]);
    }

    #[test]
    #[should_panic]
    fn llr_rejects_nonpositive_sigma() {
        let _ = intrinsic_llrs(&[1.0], 0.0);
    }
}
