// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.


//! Exact rationals extended with signed infinities.
//!
//! `Rational` is the only number type used by the curve algebra. Finite
//! values are reduced `BigRational`s, so every sum, product and crossing
//! time is computed without error. The two infinities model undefined
//! (`+∞` in min-plus) and absorbing (`-∞` in max-plus) values of curves.
//!
//! The operator traits (`+`, `-`, `*`, `/`) panic on indeterminate forms,
//! mirroring how primitive integers panic on overflow. The `checked_*`
//! methods return an [`ArithmeticError`] instead.

use crate::num::error::ArithmeticError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::{
    cmp::Ordering,
    ops::{Add, Div, Mul, Neg, Sub},
    str::FromStr,
};

/// An exact fraction or one of the two signed infinities.
///
/// The variant order defines the total order: `-∞ < finite < +∞`.
///
/// # Examples
///
/// ```rust
/// # use tropic_core::num::rational::Rational;
///
/// let a = Rational::new(1, 3);
/// let b = Rational::new(1, 6);
/// assert_eq!(&a + &b, Rational::new(1, 2));
/// assert!(Rational::MINUS_INFINITY < a && a < Rational::PLUS_INFINITY);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rational {
    MinusInfinity,
    Finite(BigRational),
    PlusInfinity,
}

impl Rational {
    pub const PLUS_INFINITY: Rational = Rational::PlusInfinity;
    pub const MINUS_INFINITY: Rational = Rational::MinusInfinity;

    /// Creates the reduced fraction `numerator / denominator`.
    ///
    /// # Panics
    ///
    /// Panics if `denominator == 0`.
    #[inline]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        assert!(
            denominator != 0,
            "Invalid rational: denominator must be non-zero"
        );
        Self::Finite(BigRational::new(
            BigInt::from(numerator),
            BigInt::from(denominator),
        ))
    }

    /// Creates the reduced fraction `numerator / denominator`, failing on a zero denominator.
    #[inline]
    pub fn try_new(numerator: i64, denominator: i64) -> Result<Self, ArithmeticError> {
        if denominator == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }
        Ok(Self::new(numerator, denominator))
    }

    #[inline]
    pub fn from_integer(value: i64) -> Self {
        Self::Finite(BigRational::from_integer(BigInt::from(value)))
    }

    #[inline]
    pub fn from_ratio(value: BigRational) -> Self {
        Self::Finite(value)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Finite(_))
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    #[inline]
    pub fn is_plus_infinite(&self) -> bool {
        matches!(self, Self::PlusInfinity)
    }

    #[inline]
    pub fn is_minus_infinite(&self) -> bool {
        matches!(self, Self::MinusInfinity)
    }

    /// Returns `true` for finite values greater than zero and for `+∞`.
    #[inline]
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Finite(v) => v.is_positive(),
            Self::PlusInfinity => true,
            Self::MinusInfinity => false,
        }
    }

    /// Returns `true` for finite values less than zero and for `-∞`.
    #[inline]
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Finite(v) => v.is_negative(),
            Self::PlusInfinity => false,
            Self::MinusInfinity => true,
        }
    }

    /// Returns the finite value, if any.
    #[inline]
    pub fn as_finite(&self) -> Option<&BigRational> {
        match self {
            Self::Finite(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn numerator(&self) -> Option<&BigInt> {
        self.as_finite().map(|v| v.numer())
    }

    #[inline]
    pub fn denominator(&self) -> Option<&BigInt> {
        self.as_finite().map(|v| v.denom())
    }

    /// Returns the absolute value; both infinities map to `+∞`.
    pub fn abs(&self) -> Self {
        match self {
            Self::Finite(v) => Self::Finite(v.abs()),
            _ => Self::PlusInfinity,
        }
    }

    /// Rounds towards `-∞`. Infinities are returned unchanged.
    pub fn floor(&self) -> Self {
        match self {
            Self::Finite(v) => Self::Finite(v.floor()),
            other => other.clone(),
        }
    }

    /// Rounds towards `+∞`. Infinities are returned unchanged.
    pub fn ceil(&self) -> Self {
        match self {
            Self::Finite(v) => Self::Finite(v.ceil()),
            other => other.clone(),
        }
    }

    /// Returns the smaller of two values by reference, without cloning.
    #[inline]
    pub fn min_ref<'a>(&'a self, other: &'a Self) -> &'a Self {
        if other < self { other } else { self }
    }

    /// Returns the larger of two values by reference, without cloning.
    #[inline]
    pub fn max_ref<'a>(&'a self, other: &'a Self) -> &'a Self {
        if other > self { other } else { self }
    }

    /// Checked addition.
    ///
    /// `+∞` absorbs every finite value, as does `-∞`. Adding infinities of
    /// opposite sign is indeterminate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let inf = Rational::PLUS_INFINITY;
    /// assert_eq!(inf.checked_add(&Rational::from(3)), Ok(Rational::PLUS_INFINITY));
    /// assert!(inf.checked_add(&Rational::MINUS_INFINITY).is_err());
    /// ```
    pub fn checked_add(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        match (self, rhs) {
            (Self::Finite(a), Self::Finite(b)) => Ok(Self::Finite(a + b)),
            (Self::PlusInfinity, Self::MinusInfinity) | (Self::MinusInfinity, Self::PlusInfinity) => {
                Err(ArithmeticError::Indeterminate("+∞ + -∞"))
            }
            (Self::PlusInfinity, _) | (_, Self::PlusInfinity) => Ok(Self::PlusInfinity),
            (Self::MinusInfinity, _) | (_, Self::MinusInfinity) => Ok(Self::MinusInfinity),
        }
    }

    /// Checked subtraction, defined as `self + (-rhs)`.
    #[inline]
    pub fn checked_sub(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        self.checked_add(&-rhs)
    }

    /// Checked multiplication. `0 · ∞` is indeterminate.
    pub fn checked_mul(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        match (self, rhs) {
            (Self::Finite(a), Self::Finite(b)) => Ok(Self::Finite(a * b)),
            (Self::Finite(z), _) | (_, Self::Finite(z)) if z.is_zero() => {
                Err(ArithmeticError::Indeterminate("0 · ∞"))
            }
            (a, b) => Ok(Self::signed_infinity(a.is_negative() != b.is_negative())),
        }
    }

    /// Checked division. Dividing by zero or `∞ / ∞` fails; `finite / ∞ = 0`.
    pub fn checked_div(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        match (self, rhs) {
            (_, Self::Finite(b)) if b.is_zero() => Err(ArithmeticError::DivisionByZero),
            (Self::Finite(a), Self::Finite(b)) => Ok(Self::Finite(a / b)),
            (Self::Finite(_), _) => Ok(<Self as Zero>::zero()),
            (_, Self::Finite(b)) => Ok(Self::signed_infinity(self.is_negative() != b.is_negative())),
            _ => Err(ArithmeticError::Indeterminate("∞ / ∞")),
        }
    }

    /// Greatest common divisor of two strictly positive finite rationals:
    /// `gcd(a/b, c/d) = gcd(a, c) / lcm(b, d)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let g = Rational::new(3, 4).gcd(&Rational::new(1, 2)).unwrap();
    /// assert_eq!(g, Rational::new(1, 4));
    /// ```
    pub fn gcd(&self, other: &Self) -> Result<Self, ArithmeticError> {
        let (a, b) = (self.positive_finite()?, other.positive_finite()?);
        Ok(Self::Finite(BigRational::new(
            a.numer().gcd(b.numer()),
            a.denom().lcm(b.denom()),
        )))
    }

    /// Least common multiple of two strictly positive finite rationals:
    /// `lcm(a/b, c/d) = lcm(a, c) / gcd(b, d)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let l = Rational::new(3, 4).lcm(&Rational::new(1, 2)).unwrap();
    /// assert_eq!(l, Rational::new(3, 2));
    /// ```
    pub fn lcm(&self, other: &Self) -> Result<Self, ArithmeticError> {
        let (a, b) = (self.positive_finite()?, other.positive_finite()?);
        Ok(Self::Finite(BigRational::new(
            a.numer().lcm(b.numer()),
            a.denom().gcd(b.denom()),
        )))
    }

    /// Returns the integer part of a finite value as `i64`, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        use num_traits::ToPrimitive;
        self.as_finite().and_then(|v| v.to_integer().to_i64())
    }

    fn positive_finite(&self) -> Result<&BigRational, ArithmeticError> {
        match self {
            Self::Finite(v) if v.is_positive() => Ok(v),
            Self::Finite(_) => Err(ArithmeticError::NotPositive(self.to_string())),
            _ => Err(ArithmeticError::NotFinite(self.to_string())),
        }
    }

    #[inline]
    fn signed_infinity(negative: bool) -> Self {
        if negative {
            Self::MinusInfinity
        } else {
            Self::PlusInfinity
        }
    }
}

impl Zero for Rational {
    #[inline]
    fn zero() -> Self {
        Self::Finite(BigRational::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        matches!(self, Self::Finite(v) if v.is_zero())
    }
}

impl One for Rational {
    #[inline]
    fn one() -> Self {
        Self::Finite(BigRational::one())
    }
}

impl Default for Rational {
    #[inline]
    fn default() -> Self {
        <Self as Zero>::zero()
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        match self {
            Rational::Finite(v) => Rational::Finite(-v),
            Rational::PlusInfinity => Rational::MinusInfinity,
            Rational::MinusInfinity => Rational::PlusInfinity,
        }
    }
}

impl Neg for Rational {
    type Output = Rational;

    #[inline]
    fn neg(self) -> Rational {
        -&self
    }
}

macro_rules! impl_binary_op {
    ($trait_name:ident, $method:ident, $checked:ident) => {
        impl $trait_name<&Rational> for &Rational {
            type Output = Rational;

            #[inline]
            fn $method(self, rhs: &Rational) -> Rational {
                match self.$checked(rhs) {
                    Ok(v) => v,
                    Err(e) => panic!("Rational::{}({}, {}): {}", stringify!($method), self, rhs, e),
                }
            }
        }

        impl $trait_name<Rational> for Rational {
            type Output = Rational;

            #[inline]
            fn $method(self, rhs: Rational) -> Rational {
                (&self).$method(&rhs)
            }
        }

        impl $trait_name<&Rational> for Rational {
            type Output = Rational;

            #[inline]
            fn $method(self, rhs: &Rational) -> Rational {
                (&self).$method(rhs)
            }
        }

        impl $trait_name<Rational> for &Rational {
            type Output = Rational;

            #[inline]
            fn $method(self, rhs: Rational) -> Rational {
                self.$method(&rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, checked_add);
impl_binary_op!(Sub, sub, checked_sub);
impl_binary_op!(Mul, mul, checked_mul);
impl_binary_op!(Div, div, checked_div);

macro_rules! impl_from_integer {
    ($t:ty) => {
        impl From<$t> for Rational {
            #[inline]
            fn from(value: $t) -> Self {
                Self::Finite(BigRational::from_integer(BigInt::from(value)))
            }
        }
    };
}

impl_from_integer!(i32);
impl_from_integer!(i64);
impl_from_integer!(u32);
impl_from_integer!(u64);
impl_from_integer!(usize);

impl From<BigRational> for Rational {
    #[inline]
    fn from(value: BigRational) -> Self {
        Self::Finite(value)
    }
}

impl From<BigInt> for Rational {
    #[inline]
    fn from(value: BigInt) -> Self {
        Self::Finite(BigRational::from_integer(value))
    }
}

impl From<&Rational> for Rational {
    #[inline]
    fn from(value: &Rational) -> Self {
        value.clone()
    }
}

impl PartialEq<i64> for Rational {
    fn eq(&self, other: &i64) -> bool {
        *self == Rational::from(*other)
    }
}

impl PartialOrd<i64> for Rational {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(self.cmp(&Rational::from(*other)))
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(v) if v.is_integer() => write!(f, "{}", v.numer()),
            Self::Finite(v) => write!(f, "{}/{}", v.numer(), v.denom()),
            Self::PlusInfinity => write!(f, "+Inf"),
            Self::MinusInfinity => write!(f, "-Inf"),
        }
    }
}

impl std::fmt::Debug for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl FromStr for Rational {
    type Err = ArithmeticError;

    /// Parses `n`, `n/d`, `+Inf`, `Inf` or `-Inf` (surrounding whitespace is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        match token {
            "+Inf" | "Inf" => return Ok(Self::PlusInfinity),
            "-Inf" => return Ok(Self::MinusInfinity),
            _ => {}
        }

        let parse_int = |part: &str| {
            BigInt::from_str(part.trim()).map_err(|_| ArithmeticError::Parse(token.to_string()))
        };
        match token.split_once('/') {
            Some((n, d)) => {
                let (n, d) = (parse_int(n)?, parse_int(d)?);
                if d.is_zero() {
                    return Err(ArithmeticError::DivisionByZero);
                }
                Ok(Self::Finite(BigRational::new(n, d)))
            }
            None => Ok(Self::Finite(BigRational::from_integer(parse_int(token)?))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    #[test]
    fn test_construction_reduces() {
        let a = r(4, 8);
        assert_eq!(a, r(1, 2));
        assert_eq!(a.numerator(), Some(&BigInt::from(1)));
        assert_eq!(a.denominator(), Some(&BigInt::from(2)));

        // Sign is carried by the numerator
        let b = r(3, -6);
        assert_eq!(b.numerator(), Some(&BigInt::from(-1)));
        assert_eq!(b.denominator(), Some(&BigInt::from(2)));
    }

    #[test]
    #[should_panic(expected = "Invalid rational")]
    fn test_new_panic() {
        r(1, 0);
    }

    #[test]
    fn test_try_new() {
        assert!(Rational::try_new(1, 2).is_ok());
        assert_eq!(Rational::try_new(1, 0), Err(ArithmeticError::DivisionByZero));
    }

    #[test]
    fn test_total_order() {
        let values = [
            Rational::PLUS_INFINITY,
            r(1, 2),
            Rational::MINUS_INFINITY,
            r(-7, 3),
            Rational::from(0),
        ];
        let mut sorted = values.to_vec();
        sorted.sort();
        assert_eq!(
            sorted,
            vec![
                Rational::MINUS_INFINITY,
                r(-7, 3),
                Rational::from(0),
                r(1, 2),
                Rational::PLUS_INFINITY
            ]
        );
    }

    #[test]
    fn test_infinity_arithmetic() {
        let inf = Rational::PLUS_INFINITY;
        let minf = Rational::MINUS_INFINITY;
        assert_eq!(&inf + &r(5, 1), inf);
        assert_eq!(&minf + &r(5, 1), minf);
        assert_eq!(&inf - &minf, inf);
        assert_eq!(&inf * &r(-2, 1), minf);
        assert_eq!(&r(3, 1) / &inf, Rational::from(0));
        assert_eq!(-&inf, minf);
    }

    #[test]
    fn test_indeterminate_forms() {
        let inf = Rational::PLUS_INFINITY;
        let minf = Rational::MINUS_INFINITY;
        assert!(matches!(
            inf.checked_add(&minf),
            Err(ArithmeticError::Indeterminate(_))
        ));
        assert!(matches!(
            inf.checked_sub(&inf),
            Err(ArithmeticError::Indeterminate(_))
        ));
        assert!(matches!(
            inf.checked_mul(&Rational::from(0)),
            Err(ArithmeticError::Indeterminate(_))
        ));
        assert_eq!(
            r(1, 2).checked_div(&Rational::from(0)),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    #[should_panic(expected = "indeterminate form")]
    fn test_operator_panics_on_indeterminate() {
        let _ = Rational::PLUS_INFINITY + Rational::MINUS_INFINITY;
    }

    #[test]
    fn test_gcd_lcm() {
        assert_eq!(r(3, 4).lcm(&r(1, 2)).unwrap(), r(3, 2));
        assert_eq!(r(3, 4).gcd(&r(1, 2)).unwrap(), r(1, 4));
        assert_eq!(Rational::from(4).lcm(&Rational::from(6)).unwrap(), Rational::from(12));
        assert!(matches!(
            Rational::from(0).lcm(&r(1, 2)),
            Err(ArithmeticError::NotPositive(_))
        ));
        assert!(matches!(
            Rational::PLUS_INFINITY.gcd(&r(1, 2)),
            Err(ArithmeticError::NotFinite(_))
        ));
    }

    #[test]
    fn test_floor_ceil() {
        assert_eq!(r(7, 2).floor(), Rational::from(3));
        assert_eq!(r(7, 2).ceil(), Rational::from(4));
        assert_eq!(r(-7, 2).floor(), Rational::from(-4));
        assert_eq!(Rational::PLUS_INFINITY.floor(), Rational::PLUS_INFINITY);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(r(3, 4).to_string(), "3/4");
        assert_eq!(r(-10, 2).to_string(), "-5");
        assert_eq!(Rational::PLUS_INFINITY.to_string(), "+Inf");
        assert_eq!(Rational::MINUS_INFINITY.to_string(), "-Inf");

        assert_eq!("3/4".parse::<Rational>().unwrap(), r(3, 4));
        assert_eq!(" -5 ".parse::<Rational>().unwrap(), Rational::from(-5));
        assert_eq!("+Inf".parse::<Rational>().unwrap(), Rational::PLUS_INFINITY);
        assert_eq!("-Inf".parse::<Rational>().unwrap(), Rational::MINUS_INFINITY);
        assert!(matches!("x/2".parse::<Rational>(), Err(ArithmeticError::Parse(_))));
        assert_eq!("1/0".parse::<Rational>(), Err(ArithmeticError::DivisionByZero));
    }

    proptest! {
        #[test]
        fn prop_add_commutes(a in -1000i64..1000, b in 1i64..50, c in -1000i64..1000, d in 1i64..50) {
            let x = r(a, b);
            let y = r(c, d);
            prop_assert_eq!(&x + &y, &y + &x);
        }

        #[test]
        fn prop_sub_inverts_add(a in -1000i64..1000, b in 1i64..50, c in -1000i64..1000, d in 1i64..50) {
            let x = r(a, b);
            let y = r(c, d);
            prop_assert_eq!(&(&x + &y) - &y, x);
        }

        #[test]
        fn prop_display_round_trip(a in -1000i64..1000, b in 1i64..50) {
            let x = r(a, b);
            prop_assert_eq!(x.to_string().parse::<Rational>().unwrap(), x);
        }

        #[test]
        fn prop_lcm_is_multiple(a in 1i64..200, b in 1i64..20, c in 1i64..200, d in 1i64..20) {
            let x = r(a, b);
            let y = r(c, d);
            let l = x.lcm(&y).unwrap();
            let kx = &l / &x;
            let ky = &l / &y;
            prop_assert!(kx.as_finite().unwrap().is_integer());
            prop_assert!(ky.as_finite().unwrap().is_integer());
        }
    }
}
