//! # YieldSpace Pool Configuration
//!
//! This crate provides configuration management and default values for
//! the YieldSpace pricing engine, so curve parameters travel as explicit
//! values instead of process-wide constants.
//!
//! ## Features
//!
//! - **Curve Parameters**: time scale `ts`, fee multipliers `g1`/`g2`,
//!   share price anchor `c`/`mu`, precision fee
//! - **Solver Heuristics**: bisection band and iteration cap
//! - **Asset Settings**: native decimals of the base asset
//!
//! ## Usage
//!
//! ```rust
//! use yieldspace_config::{defaults, PoolConfig};
//!
//! let config = PoolConfig::from_toml_str(
//!     r#"
//! [curve]
//! g1 = "0.95"
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.curve.time_scale_seconds, defaults::curve::SECONDS_IN_TEN_YEARS);
//! ```

pub mod defaults;
pub mod pool_config;

// Re-export commonly used types
pub use pool_config::{load_pool_config, AssetConfig, CurveConfig, PoolConfig, SolverConfig};
