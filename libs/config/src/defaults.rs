//! Default curve, solver and asset values
//!
//! These mirror the parameters the reference pools are deployed with. They
//! are only defaults: every value is carried in [`crate::PoolConfig`] and
//! threaded through the engine explicitly, so pools with different
//! parameters can be priced side by side.

/// Curve defaults
pub mod curve {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Ten years of 365.25 days, the denominator of `ts`
    pub const SECONDS_IN_TEN_YEARS: u64 = 315_576_000;

    /// Fee multiplier for selling base / buying fyToken
    pub const G1: Decimal = dec!(0.95);

    /// Price per share of the yield-bearing base (18-decimal ratio)
    pub const SHARE_PRICE: Decimal = dec!(1);

    /// Rounding offset applied to every trade, in 18-decimal units
    pub const PRECISION_FEE: u64 = 1_000_000_000_000;
}

/// Bisection defaults for the exact-base mint search
pub mod solver {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Lower edge of the accepted `pz / PZ` band
    pub const MIN_TARGET: Decimal = dec!(1.00001);

    /// Upper edge of the accepted `pz / PZ` band
    pub const MAX_TARGET: Decimal = dec!(1.00002);

    pub const MAX_ITERATIONS: u32 = 100;
}

/// Asset defaults
pub mod asset {
    /// Internal compute precision; assets with fewer decimals are scaled up
    pub const WAD_DECIMALS: u8 = 18;
}
