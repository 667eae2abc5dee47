//! Liquidity provision
//!
//! Plain mint and burn are proportional and independent of time. The
//! single-sided variants compose them with a trade against the curve so the
//! provider only handles base.

use crate::error::{Result, YieldSpaceError};
use crate::reserves::Reserves;
use crate::trade::{FeeMode, TradeKind, YieldMath};
use crate::units::Scale;
use num::bigint::BigUint;
use num::traits::Zero;
use serde::Serialize;
use tracing::trace;

/// Which side of the pool the deposited amount is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintDriver {
    Base,
    FyToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintOutcome {
    /// LP shares issued
    pub shares: BigUint,
    /// Amount of the other asset that must accompany the deposit
    pub paired: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BurnOutcome {
    pub base: BigUint,
    pub fy_token: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintWithBaseOutcome {
    pub shares: BigUint,
    /// Total base consumed: the synthetic fyToken purchase plus the mint
    pub base_in: BigUint,
}

/// An amount divided between the two reserves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquiditySplit {
    pub base: BigUint,
    pub fy_token: BigUint,
}

/// Proportional mint and burn
pub struct LiquidityMath;

impl LiquidityMath {
    /// `shares = S * amount / R_driver`, `paired = R_other * shares / S`
    ///
    /// Both results are floored. An empty pool cannot be priced this way and
    /// yields `DivisionByZero`.
    pub fn mint(
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        supply: &BigUint,
        amount: &BigUint,
        driver: MintDriver,
    ) -> Result<MintOutcome> {
        let (driving, other) = match driver {
            MintDriver::Base => (base_reserves, fy_token_reserves),
            MintDriver::FyToken => (fy_token_reserves, base_reserves),
        };
        if driving.is_zero() {
            return Err(YieldSpaceError::DivisionByZero {
                context: "driving reserve",
            });
        }
        if supply.is_zero() {
            return Err(YieldSpaceError::DivisionByZero {
                context: "total supply",
            });
        }

        // paired = R_other * (S * amount / R_driver) / S, without flooring shares first
        let shares = supply * amount / driving;
        let paired = other * amount / driving;
        Ok(MintOutcome { shares, paired })
    }

    /// `base = shares * Z / S`, `fy_token = shares * Y / S`, both floored
    pub fn burn(
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        supply: &BigUint,
        shares: &BigUint,
    ) -> Result<BurnOutcome> {
        if supply.is_zero() {
            return Err(YieldSpaceError::DivisionByZero {
                context: "total supply",
            });
        }
        if shares > supply {
            return Err(YieldSpaceError::InvalidParameter {
                name: "shares",
                reason: format!("burning {} of a supply of {}", shares, supply),
            });
        }

        Ok(BurnOutcome {
            base: shares * base_reserves / supply,
            fy_token: shares * fy_token_reserves / supply,
        })
    }
}

impl LiquidityMath {
    /// Divide `amount` in the ratio of the reserves
    ///
    /// `base = amount * Z / (Z + Y)` floored, the fyToken side takes the rest
    /// so the parts always sum to `amount`.
    pub fn split(
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        amount: &BigUint,
    ) -> Result<LiquiditySplit> {
        let total = base_reserves + fy_token_reserves;
        if total.is_zero() {
            return Err(YieldSpaceError::DivisionByZero {
                context: "combined reserves",
            });
        }

        let base = amount * base_reserves / &total;
        let fy_token = amount - &base;
        Ok(LiquiditySplit { base, fy_token })
    }
}

impl YieldMath {
    /// Mint from base alone
    ///
    /// Buys `fy_token` from the pool, then mints against the post-trade
    /// reserves with that fyToken as the driving amount. The LP supply is the
    /// one embedded in the virtual fyToken reserve.
    pub fn mint_with_base(
        &self,
        reserves: &Reserves,
        fy_token: &BigUint,
        time_to_maturity: i64,
        decimals: u8,
    ) -> Result<MintWithBaseOutcome> {
        if fy_token > reserves.fy_token_real() {
            return Err(YieldSpaceError::InfeasibleTrade {
                kind: TradeKind::BuyFyToken,
                reason: "exceeds the real fyToken reserves",
            });
        }

        let trade_cost = self.buy_fy_token(
            reserves.base(),
            reserves.fy_token_virtual(),
            fy_token,
            time_to_maturity,
            decimals,
        )?;
        let base_after = reserves.base() + &trade_cost;
        let fy_token_after = reserves.fy_token_real() - fy_token;

        let minted = LiquidityMath::mint(
            &base_after,
            &fy_token_after,
            &reserves.embedded_supply(),
            fy_token,
            MintDriver::FyToken,
        )?;
        trace!(
            trade_cost = %trade_cost,
            mint_cost = %minted.paired,
            shares = %minted.shares,
            "priced mint with base"
        );

        Ok(MintWithBaseOutcome {
            shares: minted.shares,
            base_in: trade_cost + minted.paired,
        })
    }

    /// Burn and sell the fyToken leg, returning base only
    ///
    /// The fyToken leg is sold against the reserves as they were before the
    /// burn.
    pub fn burn_for_base(
        &self,
        reserves: &Reserves,
        supply: &BigUint,
        shares: &BigUint,
        time_to_maturity: i64,
        scale: &Scale,
    ) -> Result<BigUint> {
        let burned = LiquidityMath::burn(reserves.base(), reserves.fy_token_real(), supply, shares)?;
        let sold = self.sell_fy_token(
            reserves.base(),
            reserves.fy_token_virtual(),
            &burned.fy_token,
            time_to_maturity,
            scale,
            FeeMode::WithFee,
        )?;
        Ok(burned.base + sold)
    }
}
