//! Decimal normalization between native token units and compute precision
//!
//! ## Precision Requirements
//!
//! - **Amounts**: unbounded non-negative integers in the asset's native
//!   decimals (18 for DAI/WETH, 6 for USDC)
//! - **Compute space**: every reserve and amount is scaled up to 18 decimals
//!   before it reaches the curve; payouts are truncated back to native
//!   units and costs are rounded up
//! - **Ratios**: `c` and `mu` are 18-decimal fixed point, `ts`/`g1`/`g2` are
//!   64.64 binary fixed point when they come from the pool

use crate::error::{Result, YieldSpaceError};
use crate::real::Real;
use num::bigint::BigUint;
use num::integer::Integer;
use num::traits::{One, Zero};
use yieldspace_config::defaults::asset::WAD_DECIMALS;
use yieldspace_config::AssetConfig;

/// Multiplier taking native units to compute units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    factor: BigUint,
}

impl Scale {
    /// No rescaling, for 18-decimal assets
    pub fn unit() -> Self {
        Self {
            factor: BigUint::one(),
        }
    }

    pub fn new(factor: BigUint) -> Result<Self> {
        if factor.is_zero() {
            return Err(YieldSpaceError::InvalidParameter {
                name: "scale_factor",
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self { factor })
    }

    /// `10^(18 - decimals)`
    pub fn from_decimals(decimals: u8) -> Result<Self> {
        let missing = missing_decimals(decimals)?;
        Ok(Self {
            factor: BigUint::from(10u32).pow(missing),
        })
    }

    pub fn factor(&self) -> &BigUint {
        &self.factor
    }

    /// Native amount into compute space
    pub fn upscale(&self, amount: &BigUint) -> Real {
        Real::from(&(amount * &self.factor))
    }

    /// Compute-space value back to native units, rounding down
    ///
    /// `None` when the value is negative.
    pub fn downscale(&self, value: &Real) -> Option<BigUint> {
        value
            .checked_div(&Real::from(&self.factor))?
            .floor_to_biguint()
    }

    /// Compute-space value back to native units, rounding up
    ///
    /// Used for amounts the trader pays, so dust below the native precision
    /// is charged rather than forgiven. `None` when the value is negative.
    pub fn downscale_ceil(&self, value: &Real) -> Option<BigUint> {
        let units = value.ceil().to_biguint()?;
        Some(units.div_ceil(&self.factor))
    }

    /// Native decimals from the pool's asset settings
    pub fn from_config(asset: &AssetConfig) -> Result<Self> {
        Self::from_decimals(asset.decimals)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::unit()
    }
}

/// Append `18 - decimals` zero digits
pub fn to_wad(amount: &BigUint, decimals: u8) -> Result<BigUint> {
    let missing = missing_decimals(decimals)?;
    Ok(amount * BigUint::from(10u32).pow(missing))
}

/// Drop the last `18 - decimals` digits (truncating, never rounding up)
pub fn from_wad(amount: &BigUint, decimals: u8) -> Result<BigUint> {
    let missing = missing_decimals(decimals)?;
    Ok(amount / BigUint::from(10u32).pow(missing))
}

fn missing_decimals(decimals: u8) -> Result<u32> {
    if decimals > WAD_DECIMALS {
        return Err(YieldSpaceError::InvalidParameter {
            name: "decimals",
            reason: format!("must be at most {}, got {}", WAD_DECIMALS, decimals),
        });
    }
    Ok(u32::from(WAD_DECIMALS - decimals))
}
