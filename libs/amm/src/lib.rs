//! # YieldSpace AMM Library - Fixed-Maturity Pool Pricing Engine
//!
//! ## Purpose
//!
//! Pricing engine for pools that trade a base asset against a fixed-maturity
//! fyToken redeemable 1:1 for base at maturity. Quotes all four trade
//! directions on the YieldSpace invariant `(c/mu)(mu Z)^a + Y^a = k`,
//! proportional and single-sided liquidity provision, the bisection that
//! sizes a base-only deposit, and the fee a trade carries.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool balances, reserve cache and maturity through
//!   [`PoolState`]; curve parameters from [`yieldspace_config`] or from the
//!   raw fixed-point values a deployed pool exposes
//! - **Output Destinations**: Trade quotes, liquidity outcomes and mint sizing
//!   for routers, frontends and test harnesses
//! - **Precision**: Amounts in native token decimals (18 DAI/WETH, 6 USDC),
//!   normalized to 18 decimals for the curve and truncated on the way back
//! - **Rounding**: Every result is rounded in the pool's favor
//!
//! ## Architecture Role
//!
//! Pure computational core: no I/O, no shared mutable state. Every call is a
//! function of its arguments and [`CurveParams`], so one [`YieldMath`] can
//! serve any number of threads and several pools can run with different
//! parameters side by side.
//!
//! See [`architecture_diagram()`] for visual representation of the data flow.
//!
//! ## Performance Profile
//!
//! - **Arithmetic**: 72-digit fixed-point [`Real`] over `num` big integers;
//!   real powers go through series `ln`/`exp`
//! - **Trades**: four real powers per quote
//! - **Mint sizing**: bounded by the configured iteration cap (100 by
//!   default), typically under 25 quotes

pub mod curve;
pub mod error;
pub mod estimator;
pub mod fees;
pub mod liquidity;
pub mod real;
pub mod reserves;
pub mod solver;
pub mod trade;
pub mod units;

pub use curve::{compute_exponent, time_to_maturity, Curve, CurveParams, Exponent, SharePrice};
pub use error::{Result, YieldSpaceError};
pub use estimator::{PoolEstimator, PoolSnapshot, PoolState};
pub use liquidity::{
    BurnOutcome, LiquidityMath, LiquiditySplit, MintDriver, MintOutcome, MintWithBaseOutcome,
};
pub use real::Real;
pub use reserves::Reserves;
pub use solver::{ExactBaseMintSolver, MintSizing};
pub use trade::{FeeMode, TradeKind, YieldMath};
pub use units::{from_wad, to_wad, Scale};

/// Amounts are unbounded non-negative integers
pub use num::bigint::{BigInt, BigUint};

/// Architecture diagram showing how a quote flows through the engine
#[cfg_attr(doc, aquamarine::aquamarine)]
/// ```mermaid
/// graph LR
///     subgraph Input["📊 Input Layer"]
///         PS[PoolState]
///         CF[PoolConfig]
///         FX[Fixed-point Params]
///     end
///
///     subgraph Curve["🧮 Curve Math"]
///         SC[Scale / Decimals]
///         EX[Exponent a]
///         IV[Invariant Terms]
///     end
///
///     subgraph Ops["📐 Operations"]
///         TR[Trades]
///         LQ[Mint / Burn]
///         SV[Mint Sizing]
///         FE[Fee Delta]
///     end
///
///     subgraph Output["🎯 Quotes"]
///         AM[Native Amounts]
///         ER[YieldSpaceError]
///     end
///
///     PS --> SC
///     CF --> EX
///     FX --> EX
///
///     SC --> IV
///     EX --> IV
///
///     IV --> TR
///     TR --> LQ
///     TR --> SV
///     TR --> FE
///
///     TR --> AM
///     LQ --> AM
///     SV --> AM
///     SV --> ER
///     TR --> ER
///
///     style Input fill:#e1f5fe
///     style Curve fill:#fff3e0
///     style Ops fill:#f3e5f5
///     style Output fill:#e8f5e9
/// ```
pub fn architecture_diagram() {
    // This function exists solely for documentation purposes
    // The diagram is rendered by aquamarine in rustdoc
}
