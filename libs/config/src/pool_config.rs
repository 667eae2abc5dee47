//! Pool Configuration Module
//!
//! Provides configuration loading for YieldSpace pools.
//! Supports loading from TOML files with environment-specific overrides
//! and `YIELDSPACE_` environment variables.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main pool configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Curve shape and fee parameters
    pub curve: CurveConfig,

    /// Exact-base mint search heuristics
    pub solver: SolverConfig,

    /// Base asset properties
    pub asset: AssetConfig,
}

/// Curve parameters in human-readable form
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CurveConfig {
    /// `ts = 1 / time_scale_seconds`
    pub time_scale_seconds: u64,
    pub g1: Decimal,
    /// Defaults to `1 / g1` when omitted
    pub g2: Option<Decimal>,
    /// Current price per share of the base asset
    pub c: Decimal,
    /// Price per share when the pool was initialized
    pub mu: Decimal,
    /// In 18-decimal units
    pub precision_fee: u64,
}

/// Bisection band and iteration cap
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    pub min_target: Decimal,
    pub max_target: Decimal,
    pub max_iterations: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub decimals: u8,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            time_scale_seconds: defaults::curve::SECONDS_IN_TEN_YEARS,
            g1: defaults::curve::G1,
            g2: None,
            c: defaults::curve::SHARE_PRICE,
            mu: defaults::curve::SHARE_PRICE,
            precision_fee: defaults::curve::PRECISION_FEE,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_target: defaults::solver::MIN_TARGET,
            max_target: defaults::solver::MAX_TARGET,
            max_iterations: defaults::solver::MAX_ITERATIONS,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            decimals: defaults::asset::WAD_DECIMALS,
        }
    }
}

impl PoolConfig {
    /// Load configuration from files with environment overrides
    ///
    /// Overrides are looked up in `environments/<env>.toml` next to the base
    /// file, then in `YIELDSPACE_<SECTION>__<KEY>` environment variables.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new("config/pool.toml"));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        if let Some(env) = environment {
            let env_file = base
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment pool config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment pool config not found: {:?}", env_file);
            }
        }

        // Keys contain underscores, so nesting uses a double underscore
        builder = builder.add_source(
            Environment::with_prefix("YIELDSPACE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to build pool configuration")?;

        let pool: PoolConfig = config
            .try_deserialize()
            .context("Failed to deserialize pool configuration")?;

        pool.validate()?;
        debug!(?pool, "Loaded pool configuration");
        Ok(pool)
    }

    /// Parse a configuration document without touching the filesystem
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let pool: PoolConfig =
            toml::from_str(content).context("Failed to parse pool configuration")?;
        pool.validate()?;
        Ok(pool)
    }

    /// Reject values the curve math cannot work with
    pub fn validate(&self) -> Result<()> {
        let curve = &self.curve;
        if curve.time_scale_seconds == 0 {
            bail!("curve.time_scale_seconds must be positive");
        }
        if curve.g1 <= Decimal::ZERO || curve.g1 > Decimal::ONE {
            bail!("curve.g1 must be in (0, 1], got {}", curve.g1);
        }
        if let Some(g2) = curve.g2 {
            if g2 < Decimal::ONE {
                bail!("curve.g2 must be at least 1, got {}", g2);
            }
        }
        if curve.c <= Decimal::ZERO || curve.mu <= Decimal::ZERO {
            bail!(
                "curve.c and curve.mu must be positive, got c={} mu={}",
                curve.c,
                curve.mu
            );
        }

        let solver = &self.solver;
        if solver.min_target >= solver.max_target {
            bail!(
                "solver.min_target ({}) must be below solver.max_target ({})",
                solver.min_target,
                solver.max_target
            );
        }
        if solver.max_iterations == 0 {
            bail!("solver.max_iterations must be positive");
        }

        if self.asset.decimals > defaults::asset::WAD_DECIMALS {
            bail!(
                "asset.decimals must be at most {}, got {}",
                defaults::asset::WAD_DECIMALS,
                self.asset.decimals
            );
        }

        Ok(())
    }
}

/// Convenience function to load configuration from the default location
pub fn load_pool_config(environment: Option<&str>) -> Result<PoolConfig> {
    PoolConfig::load(None, environment)
}
