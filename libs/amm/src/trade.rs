//! Trade pricing on the YieldSpace invariant
//!
//! All four trades solve `base_term(Z') + fy_term(Y') = base_term(Z) + fy_term(Y)`
//! for the one reserve the trader does not fix. They differ only in which side
//! the trader's amount moves, in which direction, and in which fee multiplier
//! sets the exponent, so they share one solver.
//!
//! ## Rounding
//!
//! The pool never rounds against itself: payouts are reduced by the precision
//! fee and costs are increased by it, then both are floored back into native
//! units.

use crate::curve::{compute_exponent, Curve, CurveParams, SharePrice};
use crate::error::{Result, YieldSpaceError};
use crate::real::Real;
use crate::units::Scale;
use num::bigint::BigUint;
use std::fmt;
use tracing::trace;

/// Direction of a trade, from the trader's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeKind {
    /// Base in, fyToken out
    SellBase,
    /// fyToken in, base out
    BuyBase,
    /// fyToken in, base out
    SellFyToken,
    /// Base in, fyToken out
    BuyFyToken,
}

impl TradeKind {
    pub const ALL: [TradeKind; 4] = [
        TradeKind::SellBase,
        TradeKind::BuyBase,
        TradeKind::SellFyToken,
        TradeKind::BuyFyToken,
    ];

    /// `g1` when base flows into the pool, `g2` when it flows out
    pub fn fee_multiplier(self, params: &CurveParams) -> &Real {
        match self {
            TradeKind::SellBase | TradeKind::BuyFyToken => &params.g1,
            TradeKind::BuyBase | TradeKind::SellFyToken => &params.g2,
        }
    }

    /// The trader fixes what goes in and is quoted what comes out
    pub fn is_sell(self) -> bool {
        matches!(self, TradeKind::SellBase | TradeKind::SellFyToken)
    }

    /// The trader's amount is denominated in base
    pub fn amount_is_base(self) -> bool {
        matches!(self, TradeKind::SellBase | TradeKind::BuyBase)
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeKind::SellBase => "sellBase",
            TradeKind::BuyBase => "buyBase",
            TradeKind::SellFyToken => "sellFYToken",
            TradeKind::BuyFyToken => "buyFYToken",
        };
        f.write_str(name)
    }
}

/// Whether the exponent carries the trading fee
///
/// `NoFee` prices on the `g = 1` curve. The precision fee still applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeMode {
    #[default]
    WithFee,
    NoFee,
}

/// Reserves and amount of one trade, in native units
#[derive(Debug, Clone, Copy)]
pub(crate) struct TradeInput<'a> {
    pub base_reserves: &'a BigUint,
    pub fy_token_reserves: &'a BigUint,
    pub amount: &'a BigUint,
    pub time_to_maturity: i64,
}

/// Pricing engine for one pool's curve parameters
///
/// Stateless apart from the parameters: every method is a pure function of
/// its arguments and can be called from any number of threads.
#[derive(Debug, Clone)]
pub struct YieldMath {
    params: CurveParams,
    par: SharePrice,
}

impl YieldMath {
    pub fn new(params: CurveParams) -> Self {
        Self {
            params,
            par: SharePrice::par(),
        }
    }

    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    /// fyToken paid out for `base_in` base
    pub fn sell_base(
        &self,
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        base_in: &BigUint,
        time_to_maturity: i64,
        scale: &Scale,
        fee: FeeMode,
    ) -> Result<BigUint> {
        let input = TradeInput {
            base_reserves,
            fy_token_reserves,
            amount: base_in,
            time_to_maturity,
        };
        self.price(TradeKind::SellBase, input, scale, fee)
    }

    /// fyToken the trader must pay for `base_out` base
    pub fn buy_base(
        &self,
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        base_out: &BigUint,
        time_to_maturity: i64,
        scale: &Scale,
        fee: FeeMode,
    ) -> Result<BigUint> {
        let input = TradeInput {
            base_reserves,
            fy_token_reserves,
            amount: base_out,
            time_to_maturity,
        };
        self.price(TradeKind::BuyBase, input, scale, fee)
    }

    /// Base paid out for `fy_token_in` fyToken
    pub fn sell_fy_token(
        &self,
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        fy_token_in: &BigUint,
        time_to_maturity: i64,
        scale: &Scale,
        fee: FeeMode,
    ) -> Result<BigUint> {
        let input = TradeInput {
            base_reserves,
            fy_token_reserves,
            amount: fy_token_in,
            time_to_maturity,
        };
        self.price(TradeKind::SellFyToken, input, scale, fee)
    }

    /// Base the trader must pay for `fy_token_out` fyToken
    ///
    /// Priced in share-adjusted space with the pool's `c` and `mu`. Amounts
    /// are in an asset with `decimals` native decimals and are normalized to
    /// 18 decimals internally.
    pub fn buy_fy_token(
        &self,
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        fy_token_out: &BigUint,
        time_to_maturity: i64,
        decimals: u8,
    ) -> Result<BigUint> {
        let scale = Scale::from_decimals(decimals)?;
        let input = TradeInput {
            base_reserves,
            fy_token_reserves,
            amount: fy_token_out,
            time_to_maturity,
        };
        self.price(TradeKind::BuyFyToken, input, &scale, FeeMode::WithFee)
    }

    /// `base_term(Z) + fy_term(Y)` on the curve a `kind` trade would use
    ///
    /// Reserves are taken as compute units (18 decimals).
    pub fn invariant(
        &self,
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        time_to_maturity: i64,
        kind: TradeKind,
        fee: FeeMode,
    ) -> Result<Real> {
        let curve = self.curve_for(kind, time_to_maturity, fee)?;
        curve
            .invariant(&Real::from(base_reserves), &Real::from(fy_token_reserves))
            .ok_or(YieldSpaceError::InfeasibleTrade {
                kind,
                reason: "reserves are outside the curve domain",
            })
    }

    pub(crate) fn price(
        &self,
        kind: TradeKind,
        input: TradeInput<'_>,
        scale: &Scale,
        fee: FeeMode,
    ) -> Result<BigUint> {
        let base = scale.upscale(input.base_reserves);
        let fy_token = scale.upscale(input.fy_token_reserves);
        let amount = scale.upscale(input.amount);

        let delta = self.solve_invariant(kind, &base, &fy_token, &amount, input.time_to_maturity, fee)?;
        let settled = if kind.is_sell() {
            delta - &self.params.precision_fee
        } else {
            delta + &self.params.precision_fee
        };

        let native = if kind.is_sell() {
            scale.downscale(&settled)
        } else {
            scale.downscale_ceil(&settled)
        };
        native.ok_or(YieldSpaceError::InfeasibleTrade {
            kind,
            reason: "payout does not cover the precision fee",
        })
    }

    /// Reserve change on the side the trader does not fix, before the
    /// precision fee, in compute units
    fn solve_invariant(
        &self,
        kind: TradeKind,
        base: &Real,
        fy_token: &Real,
        amount: &Real,
        time_to_maturity: i64,
        fee: FeeMode,
    ) -> Result<Real> {
        let curve = self.curve_for(kind, time_to_maturity, fee)?;
        let infeasible = |reason: &'static str| YieldSpaceError::InfeasibleTrade { kind, reason };

        let k = curve
            .invariant(base, fy_token)
            .ok_or_else(|| infeasible("reserves are outside the curve domain"))?;
        let signed_amount = if kind.is_sell() {
            amount.clone()
        } else {
            -amount
        };

        let (before, after) = if kind.amount_is_base() {
            let known = curve
                .base_term(&(base + &signed_amount))
                .ok_or_else(|| infeasible("reserve would become negative"))?;
            let solved = curve
                .fy_token_for_term(&(&k - &known))
                .ok_or_else(|| infeasible("invariant has no real solution"))?;
            (fy_token, solved)
        } else {
            let known = curve
                .fy_token_term(&(fy_token + &signed_amount))
                .ok_or_else(|| infeasible("reserve would become negative"))?;
            let solved = curve
                .base_for_term(&(&k - &known))
                .ok_or_else(|| infeasible("invariant has no real solution"))?;
            (base, solved)
        };

        let delta = if kind.is_sell() {
            before - &after
        } else {
            after - before
        };
        trace!(%kind, a = %curve.exponent().a, delta = %delta, "solved invariant");
        Ok(delta)
    }

    fn curve_for(&self, kind: TradeKind, time_to_maturity: i64, fee: FeeMode) -> Result<Curve<'_>> {
        let one = Real::one();
        let g = match fee {
            FeeMode::WithFee => kind.fee_multiplier(&self.params),
            FeeMode::NoFee => &one,
        };
        let exponent = compute_exponent(time_to_maturity, &self.params.ts, g)?;
        Ok(Curve::new(exponent, self.share_price_for(kind)))
    }

    /// Only fyToken purchases are priced in share-adjusted space
    fn share_price_for(&self, kind: TradeKind) -> &SharePrice {
        match kind {
            TradeKind::BuyFyToken => &self.params.share_price,
            _ => &self.par,
        }
    }
}

impl Default for YieldMath {
    fn default() -> Self {
        Self::new(CurveParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::traits::ToPrimitive;

    const NINETY_DAYS: i64 = 7_776_000;

    fn wad(units: u64) -> BigUint {
        BigUint::from(units) * BigUint::from(1_000_000_000_000_000_000u64)
    }

    fn assert_within(actual: &BigUint, expected: u128, tolerance: u128) {
        let actual = actual.to_u128().unwrap();
        let diff = actual.abs_diff(expected);
        assert!(
            diff <= tolerance,
            "expected {} within {}, got {}",
            expected,
            tolerance,
            actual
        );
    }

    fn reserves() -> (BigUint, BigUint) {
        (wad(1_000_000), wad(1_100_000))
    }

    #[test]
    fn test_sell_base_reference_values() {
        let math = YieldMath::default();
        let (z, y) = reserves();
        let scale = Scale::unit();

        let with_fee = math
            .sell_base(&z, &y, &wad(1_000), NINETY_DAYS, &scale, FeeMode::WithFee)
            .unwrap();
        let no_fee = math
            .sell_base(&z, &y, &wad(1_000), NINETY_DAYS, &scale, FeeMode::NoFee)
            .unwrap();
        assert_within(&with_fee, 1_002_211_152_727_196_357_265, 1);
        assert_within(&no_fee, 1_002_327_663_271_035_248_157, 1);
        assert!(with_fee < no_fee);
    }

    #[test]
    fn test_buy_base_reference_values() {
        let math = YieldMath::default();
        let (z, y) = reserves();
        let scale = Scale::unit();

        let with_fee = math
            .buy_base(&z, &y, &wad(1_000), NINETY_DAYS, &scale, FeeMode::WithFee)
            .unwrap();
        let no_fee = math
            .buy_base(&z, &y, &wad(1_000), NINETY_DAYS, &scale, FeeMode::NoFee)
            .unwrap();
        assert_within(&with_fee, 1_002_500_020_628_567_560_858, 1);
        assert_within(&no_fee, 1_002_374_869_932_603_733_925, 1);
        assert!(with_fee > no_fee);
    }

    #[test]
    fn test_sell_fy_token_reference_values() {
        let math = YieldMath::default();
        let (z, y) = reserves();
        let scale = Scale::unit();

        let with_fee = math
            .sell_fy_token(&z, &y, &wad(1_000), NINETY_DAYS, &scale, FeeMode::WithFee)
            .unwrap();
        let no_fee = math
            .sell_fy_token(&z, &y, &wad(1_000), NINETY_DAYS, &scale, FeeMode::NoFee)
            .unwrap();
        assert_within(&with_fee, 997_506_275_547_932_522_252, 1);
        assert_within(&no_fee, 997_630_812_366_870_134_149, 1);
    }

    #[test]
    fn test_buy_fy_token_reference_values() {
        let math = YieldMath::default();
        let (z, y) = reserves();

        let cost = math
            .buy_fy_token(&z, &y, &wad(1_000), NINETY_DAYS, 18)
            .unwrap();
        assert_within(&cost, 997_793_676_447_664_080_897, 1);

        // Same trade quoted in a 6-decimal asset
        let z6 = BigUint::from(1_000_000_000_000u64);
        let y6 = BigUint::from(1_100_000_000_000u64);
        let cost6 = math
            .buy_fy_token(&z6, &y6, &BigUint::from(1_000_000_000u64), NINETY_DAYS, 6)
            .unwrap();
        assert_within(&cost6, 997_793_676, 1);
    }

    #[test]
    fn test_buy_fy_token_with_share_price() {
        let share_price = SharePrice::new("1.1".parse().unwrap(), "1.05".parse().unwrap()).unwrap();
        let math = YieldMath::new(CurveParams::default().with_share_price(share_price));
        let (z, y) = reserves();

        let cost = math
            .buy_fy_token(&z, &y, &wad(1_000), NINETY_DAYS, 18)
            .unwrap();
        assert_within(&cost, 908_120_791_406_203_036_153, 1);

        // Share price does not reach the other three trades
        let plain = YieldMath::default();
        assert_eq!(
            math.sell_base(&z, &y, &wad(1_000), NINETY_DAYS, &Scale::unit(), FeeMode::WithFee)
                .unwrap(),
            plain
                .sell_base(&z, &y, &wad(1_000), NINETY_DAYS, &Scale::unit(), FeeMode::WithFee)
                .unwrap()
        );
    }

    #[test]
    fn test_dust_payout_is_infeasible() {
        let math = YieldMath::default();
        let (z, y) = reserves();
        let err = math
            .sell_base(&z, &y, &BigUint::from(1_000u64), NINETY_DAYS, &Scale::unit(), FeeMode::WithFee)
            .unwrap_err();
        assert!(err.is_infeasible_trade());
        assert_eq!(
            err,
            YieldSpaceError::InfeasibleTrade {
                kind: TradeKind::SellBase,
                reason: "payout does not cover the precision fee",
            }
        );
    }

    #[test]
    fn test_buying_past_reserves_is_infeasible() {
        let math = YieldMath::default();
        let (z, y) = reserves();

        let err = math
            .buy_fy_token(&z, &y, &wad(2_000_000), NINETY_DAYS, 18)
            .unwrap_err();
        assert_eq!(
            err,
            YieldSpaceError::InfeasibleTrade {
                kind: TradeKind::BuyFyToken,
                reason: "reserve would become negative",
            }
        );

        let err = math
            .buy_base(&z, &y, &wad(1_000_001), NINETY_DAYS, &Scale::unit(), FeeMode::WithFee)
            .unwrap_err();
        assert!(err.is_infeasible_trade());
    }

    #[test]
    fn test_matured_pool_rejects_trades() {
        let math = YieldMath::default();
        let (z, y) = reserves();
        let err = math
            .sell_fy_token(&z, &y, &wad(1), -60, &Scale::unit(), FeeMode::WithFee)
            .unwrap_err();
        assert_eq!(err, YieldSpaceError::PastMaturity { seconds: -60 });
    }

    #[test]
    fn test_no_fee_round_trip() {
        let math = YieldMath::default();
        let (z, y) = reserves();
        let scale = Scale::unit();
        let x = wad(1_000);

        let fy_out = math
            .sell_base(&z, &y, &x, NINETY_DAYS, &scale, FeeMode::NoFee)
            .unwrap();
        let z2 = &z + &x;
        let y2 = &y - &fy_out;

        // Buying the same base back costs what was received plus both precision fees
        let fy_in = math
            .buy_base(&z2, &y2, &x, NINETY_DAYS, &scale, FeeMode::NoFee)
            .unwrap();
        assert!(fy_in > fy_out);
        assert_within(&(&fy_in - &fy_out), 2_000_000_000_000, 100_000_000);

        // Selling it back returns the base less both precision fees (in base terms)
        let base_back = math
            .sell_fy_token(&z2, &y2, &fy_out, NINETY_DAYS, &scale, FeeMode::NoFee)
            .unwrap();
        assert!(base_back < x);
        assert!(&x - &base_back < BigUint::from(3_000_000_000_000u64));
    }

    #[test]
    fn test_fee_trade_grows_invariant() {
        let math = YieldMath::default();
        let (z, y) = reserves();
        let x = wad(1_000);
        let fy_out = math
            .sell_base(&z, &y, &x, NINETY_DAYS, &Scale::unit(), FeeMode::WithFee)
            .unwrap();

        let before = math
            .invariant(&z, &y, NINETY_DAYS, TradeKind::SellBase, FeeMode::WithFee)
            .unwrap();
        let after = math
            .invariant(&(&z + &x), &(&y - &fy_out), NINETY_DAYS, TradeKind::SellBase, FeeMode::WithFee)
            .unwrap();
        assert!(after > before);
    }

    #[test]
    fn test_trade_kind_properties() {
        let params = CurveParams::default();
        assert_eq!(TradeKind::SellBase.fee_multiplier(&params), &params.g1);
        assert_eq!(TradeKind::BuyFyToken.fee_multiplier(&params), &params.g1);
        assert_eq!(TradeKind::BuyBase.fee_multiplier(&params), &params.g2);
        assert_eq!(TradeKind::SellFyToken.fee_multiplier(&params), &params.g2);

        let sells: Vec<_> = TradeKind::ALL.iter().filter(|k| k.is_sell()).collect();
        assert_eq!(sells, vec![&TradeKind::SellBase, &TradeKind::SellFyToken]);
        assert_eq!(TradeKind::SellFyToken.to_string(), "sellFYToken");
    }
}
