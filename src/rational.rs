//! Exact rational arithmetic.
//!
//! A [`Rational`] is always carried in lowest terms with a strictly positive
//! denominator; a zero numerator always normalizes its denominator to one.
//! Nothing in this crate's dependence or transformation decisions uses
//! floating point — the rewriter (`crate::rewriter`) is the only place a
//! `Rational` is ever converted to an `f64`, and only to format an emitted
//! literal.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// An exact rational number `num / den` with `den > 0` and `gcd(|num|, den) = 1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    num: BigInt,
    den: BigInt,
}

impl Rational {
    /// Construct `num / den`, normalizing sign and reducing by the gcd.
    ///
    /// # Panics
    /// Panics on `den == 0`; a zero denominator is a program invariant
    /// violation, not a recoverable analysis error.
    pub fn new(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        let num = num.into();
        let den = den.into();
        assert!(!den.is_zero(), "Rational::new: zero denominator");
        Self::normalize(num, den)
    }

    /// Construct an integer-valued rational `n / 1`.
    pub fn from_int(n: impl Into<BigInt>) -> Self {
        Self { num: n.into(), den: BigInt::one() }
    }

    fn normalize(mut num: BigInt, mut den: BigInt) -> Self {
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        if num.is_zero() {
            return Self { num: BigInt::zero(), den: BigInt::one() };
        }
        let g = num.gcd(&den);
        if g > BigInt::one() {
            num /= &g;
            den /= &g;
        }
        Self { num, den }
    }

    /// Numerator of the reduced fraction.
    pub fn numer(&self) -> &BigInt {
        &self.num
    }

    /// Denominator of the reduced fraction (always positive).
    pub fn denom(&self) -> &BigInt {
        &self.den
    }

    /// True iff this rational is an integer (`den == 1`).
    pub fn is_integer(&self) -> bool {
        self.den.is_one()
    }

    /// `ceil(self)` as a `BigInt`.
    pub fn ceil(&self) -> BigInt {
        let (q, r) = self.num.div_rem(&self.den);
        if r.is_zero() || self.num.is_negative() {
            q
        } else {
            q + BigInt::one()
        }
    }

    /// `floor(self)` as a `BigInt`.
    pub fn floor(&self) -> BigInt {
        let (q, r) = self.num.div_rem(&self.den);
        if r.is_zero() || !self.num.is_negative() {
            q
        } else {
            q - BigInt::one()
        }
    }

    /// Lossy conversion used only by the rewriter when formatting an emitted
    /// floating literal; never used for an analysis decision.
    pub fn to_f64_lossy(&self) -> f64 {
        // BigInt has no infallible to_f64; this is a best-effort textual
        // rendering path only, so ratio-of-strings via f64 parse is fine.
        let n: f64 = self.num.to_string().parse().unwrap_or(f64::NAN);
        let d: f64 = self.den.to_string().parse().unwrap_or(f64::NAN);
        n / d
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_int(n)
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self { num: BigInt::zero(), den: BigInt::one() }
    }
    fn is_zero(&self) -> bool {
        self.num.is_zero()
    }
}

impl One for Rational {
    fn one() -> Self {
        Self::from_int(1)
    }
}

impl Add for Rational {
    type Output = Rational;
    fn add(self, rhs: Rational) -> Rational {
        &self + &rhs
    }
}
impl Add for &Rational {
    type Output = Rational;
    fn add(self, rhs: &Rational) -> Rational {
        let num = &self.num * &rhs.den + &rhs.num * &self.den;
        let den = &self.den * &rhs.den;
        Rational::normalize(num, den)
    }
}

impl Sub for &Rational {
    type Output = Rational;
    fn sub(self, rhs: &Rational) -> Rational {
        self + &rhs.clone().neg()
    }
}
impl Sub for Rational {
    type Output = Rational;
    fn sub(self, rhs: Rational) -> Rational {
        &self - &rhs
    }
}

impl Mul for &Rational {
    type Output = Rational;
    fn mul(self, rhs: &Rational) -> Rational {
        Rational::normalize(&self.num * &rhs.num, &self.den * &rhs.den)
    }
}
impl Mul for Rational {
    type Output = Rational;
    fn mul(self, rhs: Rational) -> Rational {
        &self * &rhs
    }
}

impl Div for &Rational {
    type Output = Rational;
    fn div(self, rhs: &Rational) -> Rational {
        assert!(!rhs.is_zero(), "Rational division by zero");
        Rational::normalize(&self.num * &rhs.den, &self.den * &rhs.num)
    }
}
impl Div for Rational {
    type Output = Rational;
    fn div(self, rhs: Rational) -> Rational {
        &self / &rhs
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational { num: -self.num, den: self.den }
    }
}
impl Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational { num: -self.num.clone(), den: self.den.clone() }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_sign_and_gcd() {
        let r = Rational::new(-4, -8);
        assert_eq!(r.numer(), &BigInt::from(1));
        assert_eq!(r.denom(), &BigInt::from(2));
    }

    #[test]
    fn zero_forces_unit_denominator() {
        let r = Rational::new(0, 17);
        assert_eq!(r.denom(), &BigInt::from(1));
    }

    #[test]
    fn ceil_and_floor_match_s1_scenario() {
        // x2 upper bound 5/2, lower bound 23/10 (spec.md S1).
        let upper = Rational::new(5, 2);
        let lower = Rational::new(23, 10);
        assert_eq!(upper.ceil(), BigInt::from(3));
        assert_eq!(lower.floor(), BigInt::from(2));
        // No integer in [23/10, 5/2]: ceil(lower) > floor(upper).
        assert!(lower.ceil() > upper.floor());
    }

    #[test]
    fn arithmetic_round_trips() {
        let a = Rational::new(1, 3);
        let b = Rational::new(1, 6);
        assert_eq!(&a + &b, Rational::new(1, 2));
        assert_eq!(&a - &b, Rational::new(1, 6));
        assert_eq!(&a * &b, Rational::new(1, 18));
        assert_eq!(&a / &b, Rational::new(2, 1));
    }

    #[test]
    fn ordering_is_exact() {
        let a = Rational::new(1, 3);
        let b = Rational::new(2, 6);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert!(Rational::new(1, 2) > Rational::new(1, 3));
    }
}
