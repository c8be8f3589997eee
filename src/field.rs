use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The field modulus. Chosen small enough that `3 * (MOD - 1)^2 < 2^63`, so
/// every intermediate product in the comparison protocol stays inside a
/// signed 64-bit accumulator even before reduction.
pub const MOD: u32 = 10289;

/// Bit length of a comparison operand: `floor(log2(MOD - 1)) + 1`.
pub const BIT_LEN: usize = 14;

/// An element of `Z_p` with `p = MOD`, always held in `[0, MOD)`.
///
/// Multiplication widens to `u64` before reducing, since `(MOD - 1)^2`
/// already exceeds what a `u32` can hold.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct FieldElem(u32);

impl FieldElem {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    /// Reduces an arbitrary `u32` into `[0, MOD)`.
    pub const fn new(value: u32) -> Self {
        Self(value % MOD)
    }

    /// Reduces a wider integer, for callers building a field element from a
    /// plaintext `u64` (e.g. comparison operands before bit decomposition).
    pub fn from_u64(value: u64) -> Self {
        Self((value % MOD as u64) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn add(self, other: Self) -> Self {
        let sum = self.0 + other.0;
        Self(if sum >= MOD { sum - MOD } else { sum })
    }

    pub fn negate(self) -> Self {
        if self.0 == 0 {
            Self::ZERO
        } else {
            Self(MOD - self.0)
        }
    }

    pub fn subtract(self, other: Self) -> Self {
        self.add(other.negate())
    }

    pub fn multiply(self, other: Self) -> Self {
        let product = self.0 as u64 * other.0 as u64;
        Self((product % MOD as u64) as u32)
    }

    /// `1 - self`, used throughout the comparison protocol to complement a
    /// shared bit.
    pub fn complement(self) -> Self {
        Self::ONE.subtract(self)
    }

    /// Uniform draw in `[0, MOD)`. A modulo-reduction bias over a 32-bit PRNG
    /// is acceptable given how small `MOD` is.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..MOD))
    }

    /// Interprets `self` as a raw wire value in `[0, MOD)`; used when decoding
    /// shares that arrived as `i32`/`u32` over the network.
    pub fn from_wire(raw: i32) -> Self {
        let unsigned = raw.rem_euclid(MOD as i32) as u32;
        Self(unsigned)
    }

    pub fn to_wire(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Debug for FieldElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElem({})", self.0)
    }
}

impl From<u32> for FieldElem {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl Add for FieldElem {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        FieldElem::add(self, rhs)
    }
}

impl Sub for FieldElem {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        FieldElem::subtract(self, rhs)
    }
}

impl Mul for FieldElem {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        FieldElem::multiply(self, rhs)
    }
}

impl Neg for FieldElem {
    type Output = Self;
    fn neg(self) -> Self {
        FieldElem::negate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};

    #[test]
    fn zero_is_identity() {
        let mut rng = thread_rng();
        let x = FieldElem::random(&mut rng);
        assert_eq!(x.add(FieldElem::ZERO), x);
        assert_eq!(x.subtract(FieldElem::ZERO), x);
    }

    #[test]
    fn one_is_multiplicative_identity() {
        let mut rng = thread_rng();
        let x = FieldElem::random(&mut rng);
        assert_eq!(x.multiply(FieldElem::ONE), x);
    }

    #[test]
    fn negate_then_add_is_zero() {
        let mut rng = thread_rng();
        let x = FieldElem::random(&mut rng);
        assert_eq!(x.add(x.negate()), FieldElem::ZERO);
    }

    #[test]
    fn mul_matches_plain_arithmetic() {
        let a = FieldElem::new(200);
        let b = FieldElem::new(300);
        assert_eq!(a.multiply(b).value(), 60000 % MOD);
    }

    #[test]
    fn mul_commutes() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let a = FieldElem::random(&mut rng);
            let b = FieldElem::random(&mut rng);
            assert_eq!(a.multiply(b), b.multiply(a));
        }
    }

    #[test]
    fn values_stay_normalized() {
        let mut rng = thread_rng();
        for _ in 0..200 {
            let a = FieldElem::random(&mut rng);
            let b = FieldElem::random(&mut rng);
            assert!(a.add(b).value() < MOD);
            assert!(a.subtract(b).value() < MOD);
            assert!(a.multiply(b).value() < MOD);
            assert!(a.negate().value() < MOD);
        }
    }

    #[test]
    fn from_wire_normalizes_negative_values() {
        let raw: i32 = -3;
        assert_eq!(FieldElem::from_wire(raw).value(), MOD - 3);
    }

    #[test]
    fn random_never_escapes_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            assert!(FieldElem::random(&mut rng).value() < MOD);
        }
    }
}
