//! YieldSpace Curve Property Tests
//!
//! These tests validate properties that must hold for every pool with a
//! positive implied rate, regardless of reserve sizes or time to maturity.

use proptest::prelude::*;
use yieldspace_amm::{
    compute_exponent, BigUint, CurveParams, FeeMode, LiquidityMath, MintDriver, Real, Scale,
    TradeKind, YieldMath,
};

const WAD: u64 = 1_000_000_000_000_000_000;
const PRECISION_FEE: u64 = 1_000_000_000_000;

/// Pool with fyToken reserves above base reserves
#[derive(Debug, Clone)]
struct PoolCase {
    base: BigUint,
    fy_token: BigUint,
    time_to_maturity: i64,
}

fn units(amount: u64) -> BigUint {
    BigUint::from(amount) * BigUint::from(WAD)
}

// Property test strategies
prop_compose! {
    fn pool_case()
        (
            base_units in 10_000u64..10_000_000u64,
            premium_bps in 100u64..2_000u64,
            time_to_maturity in 86_400i64..31_536_000i64,
        ) -> PoolCase {
        let base = units(base_units);
        let fy_token = &base * (10_000 + premium_bps) / 10_000u64;
        PoolCase { base, fy_token, time_to_maturity }
    }
}

prop_compose! {
    /// Pool plus a trade of 0.01% to 0.1% of the base reserve
    fn pool_and_trade()
        (pool in pool_case(), size_bps in 1u64..=10u64) -> (PoolCase, BigUint) {
        let amount = &pool.base * size_bps / 10_000u64;
        (pool, amount)
    }
}

fn fee_tolerance(multiple: u64) -> BigUint {
    BigUint::from(PRECISION_FEE * multiple)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the exponent stays inside (0, 1) before maturity
    #[test]
    fn exponent_in_unit_interval(time_to_maturity in 1i64..315_576_000i64 / 2) {
        let params = CurveParams::default();
        for kind in TradeKind::ALL {
            let exponent = compute_exponent(time_to_maturity, &params.ts, kind.fee_multiplier(&params)).unwrap();
            prop_assert!(exponent.a.is_positive());
            prop_assert!(exponent.a < Real::one());
        }
    }

    /// Property: charging the fee never improves the trader's terms
    #[test]
    fn fee_monotonicity((pool, amount) in pool_and_trade()) {
        let math = YieldMath::default();
        let scale = Scale::unit();
        let quote = |kind: TradeKind, fee: FeeMode| {
            let result = match kind {
                TradeKind::SellBase => math.sell_base(&pool.base, &pool.fy_token, &amount, pool.time_to_maturity, &scale, fee),
                TradeKind::BuyBase => math.buy_base(&pool.base, &pool.fy_token, &amount, pool.time_to_maturity, &scale, fee),
                TradeKind::SellFyToken => math.sell_fy_token(&pool.base, &pool.fy_token, &amount, pool.time_to_maturity, &scale, fee),
                TradeKind::BuyFyToken => unreachable!(),
            };
            result.unwrap()
        };

        prop_assert!(quote(TradeKind::SellBase, FeeMode::WithFee) < quote(TradeKind::SellBase, FeeMode::NoFee));
        prop_assert!(quote(TradeKind::BuyBase, FeeMode::WithFee) > quote(TradeKind::BuyBase, FeeMode::NoFee));
        prop_assert!(quote(TradeKind::SellFyToken, FeeMode::WithFee) < quote(TradeKind::SellFyToken, FeeMode::NoFee));
    }

    /// Property: selling base then buying it back never leaves the trader ahead
    #[test]
    fn invariant_conservation((pool, amount) in pool_and_trade()) {
        let math = YieldMath::default();
        let scale = Scale::unit();
        let ttm = pool.time_to_maturity;

        let fy_out = math.sell_base(&pool.base, &pool.fy_token, &amount, ttm, &scale, FeeMode::NoFee).unwrap();
        let base_mid = &pool.base + &amount;
        let fy_mid = &pool.fy_token - &fy_out;
        let fy_in = math.buy_base(&base_mid, &fy_mid, &amount, ttm, &scale, FeeMode::NoFee).unwrap();
        let fy_end = &fy_mid + &fy_in;

        let before = math.invariant(&pool.base, &pool.fy_token, ttm, TradeKind::SellBase, FeeMode::NoFee).unwrap();
        let after = math.invariant(&pool.base, &fy_end, ttm, TradeKind::SellBase, FeeMode::NoFee).unwrap();
        prop_assert!(after >= before);

        // The pool keeps no more than the two precision fees plus curvature dust
        prop_assert!(fy_end >= pool.fy_token);
        prop_assert!(&fy_end - &pool.fy_token <= fee_tolerance(4));
    }

    /// Property: a fee-bearing trade grows the invariant it was priced on
    #[test]
    fn fee_trade_favors_pool((pool, amount) in pool_and_trade()) {
        let math = YieldMath::default();
        let ttm = pool.time_to_maturity;
        let fy_out = math.sell_base(&pool.base, &pool.fy_token, &amount, ttm, &Scale::unit(), FeeMode::WithFee).unwrap();

        let before = math.invariant(&pool.base, &pool.fy_token, ttm, TradeKind::SellBase, FeeMode::WithFee).unwrap();
        let after = math
            .invariant(&(&pool.base + &amount), &(&pool.fy_token - &fy_out), ttm, TradeKind::SellBase, FeeMode::WithFee)
            .unwrap();
        prop_assert!(after > before);
    }

    /// Property: without the fee, selling the bought fyToken returns the base
    #[test]
    fn no_fee_symmetry((pool, amount) in pool_and_trade()) {
        let math = YieldMath::default();
        let scale = Scale::unit();
        let ttm = pool.time_to_maturity;

        let fy_out = math.sell_base(&pool.base, &pool.fy_token, &amount, ttm, &scale, FeeMode::NoFee).unwrap();
        let base_back = math
            .sell_fy_token(&(&pool.base + &amount), &(&pool.fy_token - &fy_out), &fy_out, ttm, &scale, FeeMode::NoFee)
            .unwrap();

        prop_assert!(base_back < amount);
        prop_assert!(&amount - &base_back <= fee_tolerance(4));
    }

    /// Property: burning freshly minted shares returns the deposit
    #[test]
    fn mint_burn_round_trip(
        base in 1_000_000u64..1_000_000_000_000u64,
        fy_token in 1_000_000u64..1_000_000_000_000u64,
        supply in 1_000_000u64..1_000_000_000_000u64,
        deposit in 1u64..1_000_000_000u64,
    ) {
        // More shares than the supply cannot be burned
        prop_assume!(deposit <= base);
        let (z, y, s, x) = (BigUint::from(base), BigUint::from(fy_token), BigUint::from(supply), BigUint::from(deposit));
        let minted = LiquidityMath::mint(&z, &y, &s, &x, MintDriver::Base).unwrap();
        let burned = LiquidityMath::burn(&z, &y, &s, &minted.shares).unwrap();

        prop_assert!(burned.base <= x);
        prop_assert!(&x - &burned.base <= &z / &s + 1u32);

        let fy_gap = if burned.fy_token > minted.paired {
            &burned.fy_token - &minted.paired
        } else {
            &minted.paired - &burned.fy_token
        };
        prop_assert!(fy_gap <= &y / &s + 2u32);
    }
}
