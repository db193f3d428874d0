//! Finite field GF(2) arithmetic.
//!
//! This module contains [`Gf2`], the finite-field element type used by the
//! encoder's Gaussian elimination.

use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use ndarray::ScalarOperand;
use num_traits::{One, Zero};

/// An element of the finite field GF(2), i.e. a single bit with addition
/// being XOR and multiplication being AND.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Gf2(u8);

impl Gf2 {
    /// Builds a `Gf2` from a bit (0 or 1).
    ///
    /// # Panics
    /// Panics if `bit` is neither 0 nor 1.
    pub fn new(bit: u8) -> Gf2 {
        assert!(bit == 0 || bit == 1, "Gf2 bit must be 0 or 1");
        Gf2(bit)
    }

    /// Returns the underlying bit as `u8`.
    pub fn bit(self) -> u8 {
        self.0
    }
}

impl Zero for Gf2 {
    fn zero() -> Gf2 {
        Gf2(0)
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn set_zero(&mut self) {
        *self = Self::zero()
    }
}

impl One for Gf2 {
    fn one() -> Gf2 {
        Gf2(1)
    }

    fn set_one(&mut self) {
        *self = Self::one()
    }

    fn is_one(&self) -> bool {
        *self == Self::one()
    }
}

impl Add for Gf2 {
    type Output = Gf2;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Gf2) -> Gf2 {
        Gf2(self.0 ^ rhs.0)
    }
}

impl Sub for Gf2 {
    type Output = Gf2;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: Gf2) -> Gf2 {
        self + rhs
    }
}

impl Mul for Gf2 {
    type Output = Gf2;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, rhs: Gf2) -> Gf2 {
        Gf2(self.0 & rhs.0)
    }
}

impl Div for Gf2 {
    type Output = Gf2;

    fn div(self, rhs: Gf2) -> Gf2 {
        if rhs.is_zero() {
            panic!("division by zero in GF(2)");
        }
        self
    }
}

macro_rules! impl_ops {
    ($op:ident, $opmethod:ident, $opassign:ident, $opassign_method:ident) => {
        impl $op<&Gf2> for Gf2 {
            type Output = Gf2;
            fn $opmethod(self, rhs: &Gf2) -> Gf2 {
                self.$opmethod(*rhs)
            }
        }

        impl $opassign for Gf2 {
            fn $opassign_method(&mut self, rhs: Gf2) {
                *self = self.$opmethod(rhs);
            }
        }

        impl $opassign<&Gf2> for Gf2 {
            fn $opassign_method(&mut self, rhs: &Gf2) {
                *self = self.$opmethod(*rhs);
            }
        }
    };
}

impl_ops!(Add, add, AddAssign, add_assign);
impl_ops!(Sub, sub, SubAssign, sub_assign);
impl_ops!(Mul, mul, MulAssign, mul_assign);
impl_ops!(Div, div, DivAssign, div_assign);

impl ScalarOperand for Gf2 {}

/// Performs Gauss-Jordan elimination over GF(2) in place, reducing the
/// leading `n x n` block of `array` (shape `n x m`, `m >= n`) to the
/// identity matrix, carrying the same row operations through the remaining
/// `m - n` columns.
///
/// # Errors
/// Returns [`GaussError::NotInvertible`] if the leading `n x n` block has no
/// pivot in some column (i.e. is singular over GF(2)).
pub fn gauss_reduction(array: &mut ndarray::Array2<Gf2>) -> Result<(), GaussError> {
    use ndarray::s;
    let (n, m) = array.dim();

    for j in 0..n {
        let pivot = array
            .slice(s![j.., j])
            .iter()
            .enumerate()
            .find_map(|(t, x)| if x.is_zero() { None } else { Some(j + t) })
            .ok_or(GaussError::NotInvertible)?;

        if pivot != j {
            for t in 0..m {
                array.swap([j, t], [pivot, t]);
            }
        }

        for t in (j + 1)..n {
            if array[[t, j]].is_one() {
                for u in j..m {
                    let x = array[[j, u]];
                    array[[t, u]] += x;
                }
            }
        }
    }

    for j in (0..n).rev() {
        for t in 0..j {
            if array[[t, j]].is_one() {
                for u in j..m {
                    let x = array[[j, u]];
                    array[[t, u]] += x;
                }
            }
        }
    }

    Ok(())
}

/// Error from [`gauss_reduction`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GaussError {
    /// The submatrix to reduce is singular over GF(2).
    NotInvertible,
}
