//! Arbitrary-precision fixed-point reals
//!
//! The curve raises reserves of order 1e24 to non-integer powers and then
//! subtracts terms of nearly equal size, so 28-digit `Decimal` is not enough.
//! `Real` stores `value * 10^72` in a `BigInt`, giving 72 fractional digits
//! on top of an unbounded integer part. `ln`/`exp`/`pow` are evaluated with
//! series that run until the next term truncates to zero.

use crate::error::YieldSpaceError;
use num::bigint::{BigInt, BigUint, Sign};
use num::integer::Integer;
use num::traits::{Signed, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Decimal digits kept after the point
pub const FRACTION_DIGITS: u32 = 72;

/// `exp` refuses arguments above this; e^1024 is far beyond any reserve
const MAX_EXP_ARGUMENT: i64 = 1024;

static SCALE: Lazy<BigInt> = Lazy::new(|| BigInt::from(10u32).pow(FRACTION_DIGITS));

/// ln 2 = 2 * atanh(1/3)
static LN_2: Lazy<Real> = Lazy::new(|| atanh_series(&Real::one().div_small(3)).mul_small(2));

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Real(BigInt);

impl Real {
    pub fn zero() -> Self {
        Real(BigInt::zero())
    }

    pub fn one() -> Self {
        Real(SCALE.clone())
    }

    /// `raw / 10^FRACTION_DIGITS`
    pub fn from_raw(raw: BigInt) -> Self {
        Real(raw)
    }

    /// Exact `numerator / denominator`, floored at the last digit
    pub fn from_ratio(numerator: &BigInt, denominator: &BigInt) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        Some(Real((numerator * &*SCALE).div_floor(denominator)))
    }

    /// Decode an unsigned 64.64 binary fixed-point value (`raw / 2^64`)
    pub fn from_fixed64x64(raw: u128) -> Self {
        Real((BigInt::from(raw) * &*SCALE) >> 64usize)
    }

    /// Decode an 18-decimal fixed-point value (`raw / 10^18`)
    pub fn from_wad(raw: &BigUint) -> Self {
        let shift = BigInt::from(10u32).pow(FRACTION_DIGITS - 18);
        Real(BigInt::from(raw.clone()) * shift)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn abs(&self) -> Self {
        Real(self.0.abs())
    }

    /// Largest integer not above `self`
    pub fn floor(&self) -> BigInt {
        self.0.div_floor(&SCALE)
    }

    /// Smallest integer not below `self`
    pub fn ceil(&self) -> BigInt {
        -((-&self.0).div_floor(&SCALE))
    }

    /// `floor(self)` as an unsigned amount, `None` when negative
    pub fn floor_to_biguint(&self) -> Option<BigUint> {
        self.floor().to_biguint()
    }

    pub fn checked_div(&self, rhs: &Real) -> Option<Real> {
        if rhs.is_zero() {
            return None;
        }
        Some(Real((&self.0 * &*SCALE).div_floor(&rhs.0)))
    }

    /// Multiply by a machine integer without rescaling
    pub(crate) fn mul_small(&self, factor: i64) -> Real {
        Real(&self.0 * factor)
    }

    /// Divide by a non-zero machine integer, truncating toward zero
    pub(crate) fn div_small(&self, divisor: u64) -> Real {
        Real(&self.0 / divisor)
    }

    /// Natural logarithm, `None` for non-positive input
    pub fn ln(&self) -> Option<Real> {
        if !self.is_positive() {
            return None;
        }

        // Bring the mantissa into [1, 2): self = m * 2^k
        let one_bits = SCALE.bits() as i64;
        let mut k = self.0.bits() as i64 - one_bits;
        let mut m = shift(&self.0, -k);
        let two = &*SCALE << 1usize;
        while m >= two {
            m >>= 1usize;
            k += 1;
        }
        while m < *SCALE {
            m <<= 1usize;
            k -= 1;
        }

        let m = Real(m);
        let one = Real::one();
        let s = (&m - &one).checked_div(&(&m + &one))?;
        let ln_m = atanh_series(&s).mul_small(2);
        Some(&LN_2.mul_small(k) + &ln_m)
    }

    /// `e^self`, `None` when the result would be astronomically large
    pub fn exp(&self) -> Option<Real> {
        let limit = Real::from(MAX_EXP_ARGUMENT);
        if *self > limit {
            return None;
        }
        if *self < -limit {
            return Some(Real::zero());
        }

        // self = k * ln2 + r with |r| <= ln2 / 2
        let half = Real::one().div_small(2);
        let k = (&self.checked_div(&LN_2)? + &half).floor().to_i64()?;
        let r = self - &LN_2.mul_small(k);

        let mut sum = Real::one();
        let mut term = Real::one();
        let mut n: u64 = 1;
        loop {
            term = (&term * &r).div_small(n);
            if term.is_zero() {
                break;
            }
            sum = &sum + &term;
            n += 1;
        }

        Some(Real(shift(&sum.0, k)))
    }

    /// `self^exponent` for real exponents via `exp(exponent * ln(self))`
    ///
    /// Negative bases have no real power and yield `None`, as does `0^e` for
    /// non-positive `e`.
    pub fn pow(&self, exponent: &Real) -> Option<Real> {
        match self.0.sign() {
            Sign::Minus => None,
            Sign::NoSign => exponent.is_positive().then(Real::zero),
            Sign::Plus => {
                if exponent.is_zero() {
                    return Some(Real::one());
                }
                (&self.ln()? * exponent).exp()
            }
        }
    }
}

/// `raw * 2^bits`, flooring when `bits` is negative
fn shift(raw: &BigInt, bits: i64) -> BigInt {
    if bits >= 0 {
        raw << bits as usize
    } else {
        raw >> bits.unsigned_abs() as usize
    }
}

/// `atanh(s) = s + s^3/3 + s^5/5 + ...`, for `0 <= s <= 1/3`
fn atanh_series(s: &Real) -> Real {
    let s_squared = s * s;
    let mut power = s.clone();
    let mut sum = Real::zero();
    let mut k: u64 = 1;
    loop {
        let term = power.div_small(k);
        if term.is_zero() {
            break;
        }
        sum = &sum + &term;
        power = &power * &s_squared;
        k += 2;
    }
    sum
}

impl Add<&Real> for &Real {
    type Output = Real;

    fn add(self, rhs: &Real) -> Real {
        Real(&self.0 + &rhs.0)
    }
}

impl Sub<&Real> for &Real {
    type Output = Real;

    fn sub(self, rhs: &Real) -> Real {
        Real(&self.0 - &rhs.0)
    }
}

impl Mul<&Real> for &Real {
    type Output = Real;

    fn mul(self, rhs: &Real) -> Real {
        Real((&self.0 * &rhs.0).div_floor(&SCALE))
    }
}

macro_rules! forward_owned_binop {
    ($imp:ident, $method:ident) => {
        impl $imp<Real> for Real {
            type Output = Real;

            fn $method(self, rhs: Real) -> Real {
                (&self).$method(&rhs)
            }
        }

        impl $imp<&Real> for Real {
            type Output = Real;

            fn $method(self, rhs: &Real) -> Real {
                (&self).$method(rhs)
            }
        }

        impl $imp<Real> for &Real {
            type Output = Real;

            fn $method(self, rhs: Real) -> Real {
                self.$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl Neg for Real {
    type Output = Real;

    fn neg(self) -> Real {
        Real(-self.0)
    }
}

impl Neg for &Real {
    type Output = Real;

    fn neg(self) -> Real {
        Real(-&self.0)
    }
}

impl From<i64> for Real {
    fn from(value: i64) -> Self {
        Real(BigInt::from(value) * &*SCALE)
    }
}

impl From<u64> for Real {
    fn from(value: u64) -> Self {
        Real(BigInt::from(value) * &*SCALE)
    }
}

impl From<&BigUint> for Real {
    fn from(value: &BigUint) -> Self {
        Real(BigInt::from(value.clone()) * &*SCALE)
    }
}

impl From<&BigInt> for Real {
    fn from(value: &BigInt) -> Self {
        Real(value * &*SCALE)
    }
}

impl From<Decimal> for Real {
    fn from(value: Decimal) -> Self {
        // Decimal scale never exceeds 28 digits
        let shift = BigInt::from(10u32).pow(FRACTION_DIGITS - value.scale());
        Real(BigInt::from(value.mantissa()) * shift)
    }
}

impl FromStr for Real {
    type Err = YieldSpaceError;

    /// Parses plain decimal notation, e.g. `-12.5`; digits past the 72nd
    /// fractional place are truncated
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || YieldSpaceError::InvalidParameter {
            name: "real",
            reason: format!("cannot parse {:?} as a decimal number", s),
        };

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().chain(frac_part.chars()).all(|ch| ch.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut digits: String = frac_part.chars().take(FRACTION_DIGITS as usize).collect();
        while digits.len() < FRACTION_DIGITS as usize {
            digits.push('0');
        }
        let int_value = if int_part.is_empty() {
            BigInt::zero()
        } else {
            int_part.parse::<BigInt>().map_err(|_| invalid())?
        };
        let frac_value = digits.parse::<BigInt>().map_err(|_| invalid())?;

        let raw = int_value * &*SCALE + frac_value;
        Ok(Real(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let (int_part, frac_part) = self.0.abs().div_rem(&SCALE);
        if frac_part.is_zero() {
            return write!(f, "{}{}", sign, int_part);
        }
        let digits = frac_part.to_string();
        let padding = "0".repeat(FRACTION_DIGITS as usize - digits.len());
        let fraction = format!("{}{}", padding, digits);
        write!(f, "{}{}.{}", sign, int_part, fraction.trim_end_matches('0'))
    }
}

impl fmt::Debug for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Real({})", self)
    }
}
