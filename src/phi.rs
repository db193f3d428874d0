//! The `phi` kernel used by the sum-product check-node update.
//!
//! `phi(x) = log((1+e^-x)/(1-e^-x))` is its own inverse on `(0, infinity)`,
//! which is what lets the check-node update combine magnitudes with a single
//! nonlinearity instead of a running product of tanh terms.

/// Evaluates the `phi` kernel at `x > 0`.
///
/// Saturates to `12.0` for `x < 1e-5` and to `0.0` for `x > 12.0`; both
/// clamps are load-bearing for numerical stability (without them, `phi`
/// diverges to `+inf` as `x -> 0` and underflows to exactly `0.0`, silently,
/// for large `x`, which is also correct but costs a redundant `exp`/`ln`).
pub fn phi(x: f64) -> f64 {
    if x < 1e-5 {
        12.0
    } else if x > 12.0 {
        0.0
    } else {
        let k = (-x).exp();
        ((1.0 + k) / (1.0 - k)).ln()
    }
}

/// Applies [`phi`] elementwise to a slice, returning a new vector.
pub fn phi_vec(xs: &[f64]) -> Vec<f64> {
    xs.iter().copied().map(phi).collect()
}

/// Returns `+1.0` if the number of negative entries in `v` is even, `-1.0`
/// otherwise.
///
/// This is a reference/test utility for the sign-combining rule used by the
/// check-node update; the decoder itself tracks the sign with a running XOR
/// rather than calling this on every edge. `v` must not contain an exact
/// zero (debug-checked only, since the decoder's own `phi` clamp keeps every
/// magnitude it combines strictly positive).
pub fn global_sign(v: &[f64]) -> f64 {
    debug_assert!(v.iter().all(|&x| x != 0.0), "global_sign called with a zero entry");
    if v.iter().filter(|&&x| x < 0.0).count() % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn involutive_on_support() {
        let mut x = 1e-4_f64;
        while x <= 10.0 {
            assert!((phi(phi(x)) - x).abs() < 1e-6, "x = {x}");
            x *= 1.3;
        }
    }

    #[test]
    fn phi_of_phi_0_37() {
        assert!((phi(phi(0.37)) - 0.37).abs() < 1e-6);
    }

    #[test]
    fn saturation_small_x() {
        assert_eq!(phi(1e-6), 12.0);
        assert_eq!(phi(1e-5 - 1e-12), 12.0);
    }

    #[test]
    fn saturation_large_x() {
        assert_eq!(phi(12.0001), 0.0);
        assert_eq!(phi(100.0), 0.0);
    }

    #[test]
    fn vector_matches_scalar() {
        let xs = [0.1, 1.0, 5.0, 11.9, 1e-7, 50.0];
        let got = phi_vec(&xs);
        let want: Vec<f64> = xs.iter().map(|&x| phi(x)).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn global_sign_truth_table() {
        assert_eq!(global_sign(&[1.0, 2.0, 3.0]), 1.0);
        assert_eq!(global_sign(&[1.0, -1.0, 3.0]), -1.0);
        assert_eq!(global_sign(&[1.0]), 1.0);
        assert_eq!(global_sign(&[-2.0, -2.0]), 1.0);
    }
}
