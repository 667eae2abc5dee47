//! Quotes against a live pool
//!
//! A pool holds base and fyToken balances, an LP supply, and a reserve cache
//! written at its last sync. Tokens transferred in since then show up as the
//! balance above the cache, which is what the pool will price on its next
//! trade. [`PoolEstimator`] reads those figures through [`PoolState`] and
//! forwards them to [`YieldMath`].

use crate::curve::time_to_maturity;
use crate::error::{Result, YieldSpaceError};
use crate::liquidity::{BurnOutcome, LiquidityMath, MintDriver, MintOutcome, MintWithBaseOutcome};
use crate::reserves::Reserves;
use crate::solver::{ExactBaseMintSolver, MintSizing};
use crate::trade::{FeeMode, YieldMath};
use crate::units::Scale;
use num::bigint::BigUint;
use serde::{Deserialize, Serialize};
use yieldspace_config::SolverConfig;

/// Read access to a pool's balances and parameters
pub trait PoolState {
    /// Base held by the pool
    fn base_balance(&self) -> BigUint;

    /// Virtual fyToken balance: real balance plus LP supply
    fn fy_token_balance(&self) -> BigUint;

    fn fy_token_real_balance(&self) -> BigUint;

    fn total_supply(&self) -> BigUint;

    /// `(base, virtual fyToken)` as of the last sync
    fn cached_reserves(&self) -> (BigUint, BigUint);

    /// Unix seconds
    fn maturity(&self) -> u64;

    fn decimals(&self) -> u8;

    fn scale(&self) -> Result<Scale> {
        Scale::from_decimals(self.decimals())
    }
}

/// In-memory pool state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub base_balance: BigUint,
    pub fy_token_real_balance: BigUint,
    pub total_supply: BigUint,
    pub base_cached: BigUint,
    pub fy_token_cached: BigUint,
    pub maturity: u64,
    pub decimals: u8,
}

impl PoolSnapshot {
    /// A freshly synced pool
    pub fn new(
        base_balance: BigUint,
        fy_token_real_balance: BigUint,
        total_supply: BigUint,
        maturity: u64,
        decimals: u8,
    ) -> Self {
        let fy_token_cached = &fy_token_real_balance + &total_supply;
        Self {
            base_cached: base_balance.clone(),
            base_balance,
            fy_token_real_balance,
            total_supply,
            fy_token_cached,
            maturity,
            decimals,
        }
    }

    /// Pool initialized with `initial_base` (shares minted 1:1), then given
    /// `initial_base / 9` real fyToken and synced
    pub fn bootstrap(initial_base: BigUint, maturity: u64, decimals: u8) -> Self {
        let fy_token = &initial_base / 9u32;
        Self::new(initial_base.clone(), fy_token, initial_base, maturity, decimals)
    }

    /// Base sent to the pool but not yet synced
    pub fn with_base_transferred(mut self, amount: &BigUint) -> Self {
        self.base_balance += amount;
        self
    }

    /// fyToken sent to the pool but not yet synced
    pub fn with_fy_token_transferred(mut self, amount: &BigUint) -> Self {
        self.fy_token_real_balance += amount;
        self
    }

    /// Write current balances into the cache
    pub fn sync(&mut self) {
        self.base_cached = self.base_balance.clone();
        self.fy_token_cached = self.fy_token_balance();
    }
}

impl PoolState for PoolSnapshot {
    fn base_balance(&self) -> BigUint {
        self.base_balance.clone()
    }

    fn fy_token_balance(&self) -> BigUint {
        &self.fy_token_real_balance + &self.total_supply
    }

    fn fy_token_real_balance(&self) -> BigUint {
        self.fy_token_real_balance.clone()
    }

    fn total_supply(&self) -> BigUint {
        self.total_supply.clone()
    }

    fn cached_reserves(&self) -> (BigUint, BigUint) {
        (self.base_cached.clone(), self.fy_token_cached.clone())
    }

    fn maturity(&self) -> u64 {
        self.maturity
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }
}

/// Prices every pool operation at a fixed point in time
pub struct PoolEstimator<'a, P: PoolState> {
    pool: &'a P,
    math: &'a YieldMath,
    now: u64,
}

impl<'a, P: PoolState> PoolEstimator<'a, P> {
    pub fn new(pool: &'a P, math: &'a YieldMath, now: u64) -> Self {
        Self { pool, math, now }
    }

    /// Negative once the pool has matured
    pub fn time_to_maturity(&self) -> i64 {
        time_to_maturity(self.pool.maturity(), self.now)
    }

    pub fn reserves(&self) -> Result<Reserves> {
        Reserves::new(
            self.pool.base_balance(),
            self.pool.fy_token_balance(),
            self.pool.fy_token_real_balance(),
        )
    }

    /// fyToken out for the base transferred in since the last sync
    pub fn sell_base(&self) -> Result<BigUint> {
        let (base_cached, fy_token_cached) = self.pool.cached_reserves();
        let base_in = unsynced(self.pool.base_balance(), &base_cached, "base_balance")?;
        self.math.sell_base(
            &base_cached,
            &fy_token_cached,
            &base_in,
            self.time_to_maturity(),
            &self.pool.scale()?,
            FeeMode::WithFee,
        )
    }

    /// Base out for the fyToken transferred in since the last sync
    pub fn sell_fy_token(&self) -> Result<BigUint> {
        let (base_cached, fy_token_cached) = self.pool.cached_reserves();
        let fy_token_in = unsynced(self.pool.fy_token_balance(), &fy_token_cached, "fy_token_balance")?;
        self.math.sell_fy_token(
            &base_cached,
            &fy_token_cached,
            &fy_token_in,
            self.time_to_maturity(),
            &self.pool.scale()?,
            FeeMode::WithFee,
        )
    }

    /// fyToken in for `base_out` base
    pub fn buy_base(&self, base_out: &BigUint) -> Result<BigUint> {
        let (base_cached, fy_token_cached) = self.pool.cached_reserves();
        self.math.buy_base(
            &base_cached,
            &fy_token_cached,
            base_out,
            self.time_to_maturity(),
            &self.pool.scale()?,
            FeeMode::WithFee,
        )
    }

    /// Base in for `fy_token_out` fyToken
    pub fn buy_fy_token(&self, fy_token_out: &BigUint) -> Result<BigUint> {
        let (base_cached, fy_token_cached) = self.pool.cached_reserves();
        self.math.buy_fy_token(
            &base_cached,
            &fy_token_cached,
            fy_token_out,
            self.time_to_maturity(),
            self.pool.decimals(),
        )
    }

    pub fn mint(&self, input: &BigUint, driver: MintDriver) -> Result<MintOutcome> {
        LiquidityMath::mint(
            &self.pool.base_balance(),
            &self.pool.fy_token_real_balance(),
            &self.pool.total_supply(),
            input,
            driver,
        )
    }

    pub fn burn(&self, shares: &BigUint) -> Result<BurnOutcome> {
        LiquidityMath::burn(
            &self.pool.base_balance(),
            &self.pool.fy_token_real_balance(),
            &self.pool.total_supply(),
            shares,
        )
    }

    pub fn mint_with_base(&self, fy_token: &BigUint) -> Result<MintWithBaseOutcome> {
        self.math.mint_with_base(
            &self.reserves()?,
            fy_token,
            self.time_to_maturity(),
            self.pool.decimals(),
        )
    }

    pub fn burn_for_base(&self, shares: &BigUint) -> Result<BigUint> {
        self.math.burn_for_base(
            &self.reserves()?,
            &self.pool.total_supply(),
            shares,
            self.time_to_maturity(),
            &self.pool.scale()?,
        )
    }

    /// fyToken to pass to [`Self::mint_with_base`] to spend about `base_in`
    pub fn size_mint_with_base(&self, base_in: &BigUint, config: &SolverConfig) -> Result<MintSizing> {
        ExactBaseMintSolver::new(self.math, config)?.solve_fy_token_for_exact_base_mint(
            &self.reserves()?,
            base_in,
            self.time_to_maturity(),
            self.pool.decimals(),
        )
    }
}

fn unsynced(balance: BigUint, cached: &BigUint, name: &'static str) -> Result<BigUint> {
    if &balance < cached {
        return Err(YieldSpaceError::InvalidParameter {
            name,
            reason: format!("balance {} is below the cached reserve {}", balance, cached),
        });
    }
    Ok(balance - cached)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;
    const NINETY_DAYS: u64 = 7_776_000;

    fn wad(units: u64) -> BigUint {
        BigUint::from(units) * BigUint::from(1_000_000_000_000_000_000u64)
    }

    #[test]
    fn test_bootstrap_shape() {
        let pool = PoolSnapshot::bootstrap(wad(900_000), NOW + NINETY_DAYS, 18);
        assert_eq!(pool.total_supply(), wad(900_000));
        assert_eq!(pool.fy_token_real_balance(), wad(100_000));
        assert_eq!(pool.fy_token_balance(), wad(1_000_000));
        assert_eq!(pool.cached_reserves(), (wad(900_000), wad(1_000_000)));
    }

    #[test]
    fn test_sell_base_prices_the_unsynced_balance() {
        let math = YieldMath::default();
        let pool = PoolSnapshot::bootstrap(wad(900_000), NOW + NINETY_DAYS, 18)
            .with_base_transferred(&wad(1_000));
        let estimator = PoolEstimator::new(&pool, &math, NOW);

        let quoted = estimator.sell_base().unwrap();
        let direct = math
            .sell_base(
                &wad(900_000),
                &wad(1_000_000),
                &wad(1_000),
                NINETY_DAYS as i64,
                &Scale::unit(),
                FeeMode::WithFee,
            )
            .unwrap();
        assert_eq!(quoted, direct);
    }

    #[test]
    fn test_sell_fy_token_prices_the_unsynced_balance() {
        let math = YieldMath::default();
        let pool = PoolSnapshot::bootstrap(wad(900_000), NOW + NINETY_DAYS, 18)
            .with_fy_token_transferred(&wad(500));
        let estimator = PoolEstimator::new(&pool, &math, NOW);

        let quoted = estimator.sell_fy_token().unwrap();
        assert!(quoted > BigUint::from(0u32));
        assert!(quoted < wad(500));
    }

    #[test]
    fn test_nothing_transferred_is_infeasible() {
        let math = YieldMath::default();
        let pool = PoolSnapshot::bootstrap(wad(900_000), NOW + NINETY_DAYS, 18);
        let err = PoolEstimator::new(&pool, &math, NOW).sell_base().unwrap_err();
        assert!(err.is_infeasible_trade());
    }

    #[test]
    fn test_matured_pool() {
        let math = YieldMath::default();
        let pool = PoolSnapshot::bootstrap(wad(900_000), NOW, 18);
        let estimator = PoolEstimator::new(&pool, &math, NOW + 1);
        assert_eq!(estimator.time_to_maturity(), -1);
        assert_eq!(
            estimator.buy_base(&wad(1)).unwrap_err(),
            YieldSpaceError::PastMaturity { seconds: -1 }
        );

        // Proportional liquidity does not depend on time
        assert!(estimator.burn(&wad(1)).is_ok());
    }

    #[test]
    fn test_liquidity_round_trip() {
        let math = YieldMath::default();
        let pool = PoolSnapshot::bootstrap(wad(900_000), NOW + NINETY_DAYS, 18);
        let estimator = PoolEstimator::new(&pool, &math, NOW);

        let minted = estimator.mint(&wad(9_000), MintDriver::Base).unwrap();
        assert_eq!(minted.shares, wad(9_000));
        assert_eq!(minted.paired, wad(1_000));

        let burned = estimator.burn(&minted.shares).unwrap();
        assert_eq!(burned.base, wad(9_000));
        assert_eq!(burned.fy_token, wad(1_000));
    }

    #[test]
    fn test_single_sided_flows() {
        let math = YieldMath::default();
        let pool = PoolSnapshot::bootstrap(wad(900_000), NOW + NINETY_DAYS, 18);
        let estimator = PoolEstimator::new(&pool, &math, NOW);

        let sizing = estimator
            .size_mint_with_base(&wad(1_000), &SolverConfig::default())
            .unwrap();
        let minted = estimator.mint_with_base(&sizing.fy_token).unwrap();
        assert!(minted.base_in <= wad(1_000));

        let base_out = estimator.burn_for_base(&minted.shares).unwrap();
        assert!(base_out > BigUint::from(0u32));
        // Round trip through both trades loses value to fees
        assert!(base_out < wad(1_000));
    }

    #[test]
    fn test_snapshot_sync() {
        let mut pool = PoolSnapshot::bootstrap(wad(900), NOW, 18).with_base_transferred(&wad(1));
        pool.sync();
        assert_eq!(pool.cached_reserves(), (wad(901), wad(1_000)));
    }
}
