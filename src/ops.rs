//! Outcome-level operations used as convolution kernels.

use std::cmp::Ordering;

use num::{Integer, Signed, ToPrimitive, Zero};

use crate::{Error, Outcome, Result, MAX_EXPONENT};

/// What a convolution does with a pair whose divisor outcome is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ZeroDivision {
    /// The whole operation fails with [`Error::DivisionByZero`].
    #[default]
    Fail,
    /// The pair contributes nothing; the result's total weight shrinks.
    Skip,
}

impl ZeroDivision {
    fn guard<F>(self, rhs: &Outcome, f: F) -> Result<Option<Outcome>>
    where
        F: FnOnce() -> Outcome,
    {
        match (rhs.is_zero(), self) {
            (false, _) => Ok(Some(f())),
            (true, ZeroDivision::Fail) => Err(Error::DivisionByZero),
            (true, ZeroDivision::Skip) => Ok(None),
        }
    }
}

pub fn add(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    lhs + rhs
}

pub fn sub(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    lhs - rhs
}

pub fn mul(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    lhs * rhs
}

pub fn max(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    lhs.max(rhs).clone()
}

pub fn min(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    lhs.min(rhs).clone()
}

pub fn bitand(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    lhs & rhs
}

pub fn bitor(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    lhs | rhs
}

pub fn bitxor(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    lhs ^ rhs
}

/// Division rounding towards negative infinity.
pub fn div_floor(lhs: &Outcome, rhs: &Outcome, policy: ZeroDivision) -> Result<Option<Outcome>> {
    policy.guard(rhs, || lhs.div_floor(rhs))
}

/// Remainder taking the sign of the divisor.
pub fn mod_floor(lhs: &Outcome, rhs: &Outcome, policy: ZeroDivision) -> Result<Option<Outcome>> {
    policy.guard(rhs, || lhs.mod_floor(rhs))
}

/// Integer power; exponents outside `0..=MAX_EXPONENT` are rejected.
pub fn pow(lhs: &Outcome, rhs: &Outcome) -> Result<Outcome> {
    let exp = rhs
        .to_usize()
        .filter(|&exp| exp <= MAX_EXPONENT)
        .ok_or_else(|| Error::InvalidExponent(rhs.clone()))?;
    Ok(num::pow::pow(lhs.clone(), exp))
}

pub fn invert(value: &Outcome) -> Outcome {
    -value - 1
}

pub fn abs(value: &Outcome) -> Outcome {
    value.abs()
}

/// `-1`, `0` or `1` as `lhs` loses to, ties or beats `rhs`.
pub fn versus(lhs: &Outcome, rhs: &Outcome) -> Outcome {
    match lhs.cmp(rhs) {
        Ordering::Less => Outcome::from(-1),
        Ordering::Equal => Outcome::from(0),
        Ordering::Greater => Outcome::from(1),
    }
}

pub fn truth(value: bool) -> Outcome {
    Outcome::from(u8::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn o(x: i64) -> Outcome {
        Outcome::from(x)
    }

    #[test]
    fn floor_semantics_for_negative_operands() {
        assert_eq!(div_floor(&o(-7), &o(2), ZeroDivision::Fail), Ok(Some(o(-4))));
        assert_eq!(mod_floor(&o(-7), &o(2), ZeroDivision::Fail), Ok(Some(o(1))));
        assert_eq!(mod_floor(&o(7), &o(-2), ZeroDivision::Fail), Ok(Some(o(-1))));
    }

    #[test]
    fn zero_divisor_follows_policy() {
        assert_eq!(div_floor(&o(3), &o(0), ZeroDivision::Fail), Err(Error::DivisionByZero));
        assert_eq!(mod_floor(&o(3), &o(0), ZeroDivision::Skip), Ok(None));
    }

    #[test]
    fn pow_rejects_negative_exponent() {
        assert_eq!(pow(&o(2), &o(10)), Ok(o(1024)));
        assert_eq!(pow(&o(2), &o(-1)), Err(Error::InvalidExponent(o(-1))));
    }

    #[test]
    fn pow_rejects_huge_exponent() {
        let limit = o(MAX_EXPONENT as i64);
        assert_eq!(pow(&o(1), &limit), Ok(o(1)));
        assert_eq!(pow(&o(-1), &limit), Ok(o(1)));
        let over = &limit + 1;
        assert_eq!(pow(&o(3), &over), Err(Error::InvalidExponent(over.clone())));
        let huge = o(4_000_000_000);
        assert_eq!(pow(&o(3), &huge), Err(Error::InvalidExponent(huge.clone())));
    }

    #[test]
    fn invert_is_bitwise_not() {
        assert_eq!(invert(&o(0)), o(-1));
        assert_eq!(invert(&o(5)), o(-6));
    }
}
