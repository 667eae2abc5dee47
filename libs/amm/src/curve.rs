//! YieldSpace curve parameters and invariant terms
//!
//! The pool keeps `(c/mu) * (mu * Z)^a + Y^a` constant, where `Z` is the base
//! reserve, `Y` the virtual fyToken reserve and `a = 1 - g * ts * t` shrinks
//! the curve toward constant-sum as maturity approaches. `g` is `g1` when the
//! trader sells base or buys fyToken and `g2 = 1/g1` otherwise.

use crate::error::{Result, YieldSpaceError};
use crate::real::Real;
use num::bigint::BigUint;
use tracing::trace;
use yieldspace_config::{defaults, CurveConfig};

/// Price per share of the yield-bearing base
///
/// `c` is the current price, `mu` the price when the pool was initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePrice {
    c: Real,
    mu: Real,
    c_over_mu: Real,
}

impl SharePrice {
    /// `c = mu = 1`, the plain (non-yield-bearing) curve
    pub fn par() -> Self {
        Self {
            c: Real::one(),
            mu: Real::one(),
            c_over_mu: Real::one(),
        }
    }

    pub fn new(c: Real, mu: Real) -> Result<Self> {
        if !c.is_positive() || !mu.is_positive() {
            return Err(YieldSpaceError::InvalidParameter {
                name: "share_price",
                reason: format!("c and mu must be positive, got c={} mu={}", c, mu),
            });
        }
        let c_over_mu = c
            .checked_div(&mu)
            .ok_or(YieldSpaceError::DivisionByZero { context: "mu" })?;
        Ok(Self { c, mu, c_over_mu })
    }

    /// From 18-decimal fixed-point `c` and `mu`
    pub fn from_wad(c: &BigUint, mu: &BigUint) -> Result<Self> {
        Self::new(Real::from_wad(c), Real::from_wad(mu))
    }

    pub fn c(&self) -> &Real {
        &self.c
    }

    pub fn mu(&self) -> &Real {
        &self.mu
    }
}

/// Curve parameters for one pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveParams {
    pub ts: Real,
    pub g1: Real,
    pub g2: Real,
    pub share_price: SharePrice,
    /// Rounding offset in 18-decimal compute units
    pub precision_fee: Real,
}

impl CurveParams {
    pub fn new(
        ts: Real,
        g1: Real,
        g2: Real,
        share_price: SharePrice,
        precision_fee: Real,
    ) -> Result<Self> {
        if !ts.is_positive() {
            return Err(invalid("ts", format!("must be positive, got {}", ts)));
        }
        if !g1.is_positive() || g1 > Real::one() {
            return Err(invalid("g1", format!("must be in (0, 1], got {}", g1)));
        }
        if g2 < Real::one() {
            return Err(invalid("g2", format!("must be at least 1, got {}", g2)));
        }
        if precision_fee.is_negative() {
            return Err(invalid(
                "precision_fee",
                format!("must not be negative, got {}", precision_fee),
            ));
        }
        Ok(Self {
            ts,
            g1,
            g2,
            share_price,
            precision_fee,
        })
    }

    /// From the encodings a deployed pool exposes: `ts`, `g1`, `g2` as 64.64
    /// binary fixed point, `c` and `mu` as 18-decimal fixed point
    pub fn from_fixed(
        ts: u128,
        g1: u128,
        g2: u128,
        c: &BigUint,
        mu: &BigUint,
        precision_fee: &BigUint,
    ) -> Result<Self> {
        Self::new(
            Real::from_fixed64x64(ts),
            Real::from_fixed64x64(g1),
            Real::from_fixed64x64(g2),
            SharePrice::from_wad(c, mu)?,
            Real::from(precision_fee),
        )
    }

    pub fn from_config(config: &CurveConfig) -> Result<Self> {
        if config.time_scale_seconds == 0 {
            return Err(invalid("time_scale_seconds", "must be positive".to_string()));
        }
        let ts = Real::one().div_small(config.time_scale_seconds);
        let g1 = Real::from(config.g1);
        let g2 = match config.g2 {
            Some(g2) => Real::from(g2),
            None => Real::one()
                .checked_div(&g1)
                .ok_or_else(|| invalid("g1", "must be positive".to_string()))?,
        };
        let share_price = SharePrice::new(Real::from(config.c), Real::from(config.mu))?;
        Self::new(ts, g1, g2, share_price, Real::from(config.precision_fee))
    }

    pub fn with_share_price(mut self, share_price: SharePrice) -> Self {
        self.share_price = share_price;
        self
    }
}

impl Default for CurveParams {
    /// Ten-year time scale, `g1 = 0.95`, `g2 = 1/0.95`, par share price
    fn default() -> Self {
        Self {
            ts: Real::one().div_small(defaults::curve::SECONDS_IN_TEN_YEARS),
            g1: Real::from(defaults::curve::G1),
            g2: Real::from(20u64).div_small(19),
            share_price: SharePrice::par(),
            precision_fee: Real::from(defaults::curve::PRECISION_FEE),
        }
    }
}

fn invalid(name: &'static str, reason: String) -> YieldSpaceError {
    YieldSpaceError::InvalidParameter { name, reason }
}

/// Seconds from `now` until `maturity`, negative once the pool has matured
pub fn time_to_maturity(maturity: u64, now: u64) -> i64 {
    let seconds = i128::from(maturity) - i128::from(now);
    seconds.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Curve exponent and its inverse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exponent {
    pub a: Real,
    pub inv_a: Real,
}

/// `t = ts * time_to_maturity`, `a = 1 - g * t`, `inv_a = 1 / a`
///
/// Fails when the pool has matured or when `a` leaves (0, 1].
pub fn compute_exponent(time_to_maturity: i64, ts: &Real, g: &Real) -> Result<Exponent> {
    if time_to_maturity < 0 {
        return Err(YieldSpaceError::PastMaturity {
            seconds: time_to_maturity,
        });
    }

    let t = ts * &Real::from(time_to_maturity);
    let a = Real::one() - g * &t;
    if !a.is_positive() || a > Real::one() {
        return Err(YieldSpaceError::ExponentOutOfRange { a });
    }

    let inv_a = Real::one()
        .checked_div(&a)
        .ok_or(YieldSpaceError::DivisionByZero { context: "curve exponent" })?;
    trace!(time_to_maturity, a = %a, "computed curve exponent");
    Ok(Exponent { a, inv_a })
}

/// Invariant terms for one exponent and share price
///
/// Every method returns `None` when its power has no real value.
#[derive(Debug, Clone)]
pub struct Curve<'a> {
    exponent: Exponent,
    share_price: &'a SharePrice,
}

impl<'a> Curve<'a> {
    pub fn new(exponent: Exponent, share_price: &'a SharePrice) -> Self {
        Self {
            exponent,
            share_price,
        }
    }

    pub fn exponent(&self) -> &Exponent {
        &self.exponent
    }

    /// `(c/mu) * (mu * z)^a`
    pub fn base_term(&self, base: &Real) -> Option<Real> {
        let shares = &self.share_price.mu * base;
        Some(&self.share_price.c_over_mu * &shares.pow(&self.exponent.a)?)
    }

    /// `y^a`
    pub fn fy_token_term(&self, fy_token: &Real) -> Option<Real> {
        fy_token.pow(&self.exponent.a)
    }

    /// Base reserve whose term equals `term`
    pub fn base_for_term(&self, term: &Real) -> Option<Real> {
        let normalized = term.checked_div(&self.share_price.c_over_mu)?;
        normalized
            .pow(&self.exponent.inv_a)?
            .checked_div(&self.share_price.mu)
    }

    /// fyToken reserve whose term equals `term`
    pub fn fy_token_for_term(&self, term: &Real) -> Option<Real> {
        term.pow(&self.exponent.inv_a)
    }

    /// `(c/mu) * (mu * z)^a + y^a`
    pub fn invariant(&self, base: &Real, fy_token: &Real) -> Option<Real> {
        Some(self.base_term(base)? + self.fy_token_term(fy_token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const NINETY_DAYS: i64 = 90 * 24 * 60 * 60;

    fn real(s: &str) -> Real {
        s.parse().unwrap()
    }

    #[test]
    fn test_exponent_for_ninety_days() {
        let params = CurveParams::default();
        let exponent = compute_exponent(NINETY_DAYS, &params.ts, &params.g1).unwrap();

        // a = 1 - 0.95 * 7776000 / 315576000
        let expected = Real::one() - &(&real("0.95") * &Real::from(NINETY_DAYS))
            .checked_div(&Real::from(315_576_000u64))
            .unwrap();
        assert!((&exponent.a - &expected).abs() < real("0.000000000000000000000000000001"));
        assert!(exponent.a < Real::one());
        assert!((&exponent.a * &exponent.inv_a - Real::one()).abs() < real("0.0000000000000000000001"));

        // g2 > 1 bends the curve further than g1
        let selling_fy = compute_exponent(NINETY_DAYS, &params.ts, &params.g2).unwrap();
        assert!(selling_fy.a < exponent.a);
    }

    #[test]
    fn test_exponent_at_maturity_is_one() {
        let params = CurveParams::default();
        let exponent = compute_exponent(0, &params.ts, &params.g2).unwrap();
        assert_eq!(exponent.a, Real::one());
        assert_eq!(exponent.inv_a, Real::one());
    }

    #[test]
    fn test_exponent_domain_guard() {
        let params = CurveParams::default();
        assert_eq!(
            compute_exponent(-1, &params.ts, &params.g1),
            Err(YieldSpaceError::PastMaturity { seconds: -1 })
        );

        // Ten years of g2 pushes a below zero
        let err = compute_exponent(315_576_000, &params.ts, &params.g2).unwrap_err();
        assert!(matches!(err, YieldSpaceError::ExponentOutOfRange { .. }));
        assert!(err.is_domain_error());

        // Just past one time-scale period with g = 1
        let err = compute_exponent(315_576_001, &params.ts, &Real::one()).unwrap_err();
        assert!(err.is_domain_error());
    }

    #[test]
    fn test_params_from_fixed_encodings() {
        // floor(2^64 / 315576000), 0.95 * 2^64, 2^64 / 0.95
        let ts = (1u128 << 64) / 315_576_000;
        let g1 = (1u128 << 64) * 95 / 100;
        let g2 = (1u128 << 64) * 100 / 95;
        let wad = BigUint::from(1_000_000_000_000_000_000u64);
        let params = CurveParams::from_fixed(ts, g1, g2, &wad, &wad, &BigUint::from(1_000_000_000_000u64)).unwrap();

        let reference = CurveParams::default();
        assert!((&params.ts - &reference.ts).abs() < real("0.0000000000000000001"));
        assert!((&params.g1 - &reference.g1).abs() < real("0.0000000000000000001"));
        assert!((&params.g2 - &reference.g2).abs() < real("0.0000000000000000001"));
        assert_eq!(params.share_price, SharePrice::par());
        assert_eq!(params.precision_fee, reference.precision_fee);
    }

    #[test]
    fn test_params_from_config() {
        let config = CurveConfig {
            g1: dec!(0.9),
            c: dec!(1.1),
            mu: dec!(1.05),
            ..CurveConfig::default()
        };
        let params = CurveParams::from_config(&config).unwrap();
        assert_eq!(params.g1, real("0.9"));
        assert_eq!(params.g2, Real::one().checked_div(&real("0.9")).unwrap());
        assert_eq!(params.share_price.c(), &real("1.1"));
        assert_eq!(params.share_price.mu(), &real("1.05"));

        let default_params = CurveParams::from_config(&CurveConfig::default()).unwrap();
        assert_eq!(default_params.ts, CurveParams::default().ts);
        assert_eq!(default_params.g1, CurveParams::default().g1);
    }

    #[test]
    fn test_params_validation() {
        let reference = CurveParams::default();
        let too_big_g1 = CurveParams::new(
            reference.ts.clone(),
            real("1.01"),
            reference.g2.clone(),
            SharePrice::par(),
            reference.precision_fee.clone(),
        );
        assert!(too_big_g1.is_err());

        let zero_ts = CurveParams::new(
            Real::zero(),
            reference.g1.clone(),
            reference.g2.clone(),
            SharePrice::par(),
            reference.precision_fee.clone(),
        );
        assert!(zero_ts.is_err());

        assert!(SharePrice::new(Real::zero(), Real::one()).is_err());
    }

    #[test]
    fn test_time_to_maturity() {
        assert_eq!(time_to_maturity(1_700_000_000, 1_690_000_000), 10_000_000);
        assert_eq!(time_to_maturity(1_690_000_000, 1_700_000_000), -10_000_000);
        assert_eq!(time_to_maturity(u64::MAX, 0), i64::MAX);
    }

    #[test]
    fn test_curve_terms_invert() {
        let share_price = SharePrice::new(real("1.1"), real("1.05")).unwrap();
        let params = CurveParams::default();
        let exponent = compute_exponent(NINETY_DAYS, &params.ts, &params.g1).unwrap();
        let curve = Curve::new(exponent, &share_price);

        let base = real("1000000000000000000000000");
        let term = curve.base_term(&base).unwrap();
        let back = curve.base_for_term(&term).unwrap();
        assert!((&back - &base).abs() < real("0.000000000000000000000000000001"));

        let fy_token = real("1100000000000000000000000");
        let term = curve.fy_token_term(&fy_token).unwrap();
        let back = curve.fy_token_for_term(&term).unwrap();
        assert!((&back - &fy_token).abs() < real("0.000000000000000000000000000001"));

        assert!(curve.fy_token_term(&real("-1")).is_none());
    }
}
