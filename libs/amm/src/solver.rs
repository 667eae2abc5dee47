//! Sizing a single-sided mint that spends an exact amount of base
//!
//! [`YieldMath::mint_with_base`] is driven by the fyToken amount it buys, but
//! a provider usually starts from the base they hold. The solver bisects the
//! fyToken amount until the provider's leftover base share sits just above
//! the pool's base share, so the purchased fyToken is fully used and a small
//! base surplus stays with the provider.

use crate::error::{Result, YieldSpaceError};
use crate::real::Real;
use crate::reserves::Reserves;
use crate::trade::YieldMath;
use num::bigint::{BigInt, BigUint};
use num::traits::Zero;
use serde::Serialize;
use tracing::{debug, trace, warn};
use yieldspace_config::SolverConfig;

/// Result of a converged search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintSizing {
    /// fyToken to buy from the pool before minting
    pub fy_token: BigUint,
    /// Base spent on that purchase
    pub base_cost: BigUint,
    pub iterations: u32,
}

enum Candidate {
    /// Costs more base than available or drains the real fyToken reserve
    Infeasible,
    Priced {
        base_cost: BigUint,
        provider_share: Real,
        pool_share: Real,
    },
}

/// Bisection over the fyToken amount in `[0, 2 * base_in]`
pub struct ExactBaseMintSolver<'a> {
    math: &'a YieldMath,
    min_target: Real,
    max_target: Real,
    max_iterations: u32,
}

impl<'a> ExactBaseMintSolver<'a> {
    pub fn new(math: &'a YieldMath, config: &SolverConfig) -> Result<Self> {
        let min_target = Real::from(config.min_target);
        let max_target = Real::from(config.max_target);
        if !min_target.is_positive() || min_target >= max_target {
            return Err(YieldSpaceError::InvalidParameter {
                name: "target",
                reason: format!(
                    "need 0 < min_target < max_target, got {} and {}",
                    min_target, max_target
                ),
            });
        }
        if config.max_iterations == 0 {
            return Err(YieldSpaceError::InvalidParameter {
                name: "max_iterations",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            math,
            min_target,
            max_target,
            max_iterations: config.max_iterations,
        })
    }

    /// fyToken amount for which `mint_with_base` spends about `base_in`
    ///
    /// Accepts when `pool_share * min_target < provider_share < pool_share * max_target`,
    /// where `provider_share = (base_in - cost) / ((base_in - cost) + y)` and
    /// `pool_share = (Z + cost) / ((Z + cost) + (Y_real - y))`.
    pub fn solve_fy_token_for_exact_base_mint(
        &self,
        reserves: &Reserves,
        base_in: &BigUint,
        time_to_maturity: i64,
        decimals: u8,
    ) -> Result<MintSizing> {
        let mut low = BigUint::zero();
        let mut high = base_in * 2u32;
        let mut fy_token = (&low + &high) / 2u32;

        for iteration in 1..=self.max_iterations {
            let candidate = self.evaluate(reserves, base_in, &fy_token, time_to_maturity, decimals)?;
            let (base_cost, provider_share, pool_share) = match candidate {
                Candidate::Infeasible => {
                    debug!(iteration, fy_token = %fy_token, "candidate infeasible, buying less");
                    high = fy_token.clone();
                    fy_token = (&fy_token + &low) / 2u32;
                    continue;
                }
                Candidate::Priced {
                    base_cost,
                    provider_share,
                    pool_share,
                } => (base_cost, provider_share, pool_share),
            };

            let lower_bound = &pool_share * &self.min_target;
            let upper_bound = &pool_share * &self.max_target;
            trace!(
                iteration,
                fy_token = %fy_token,
                provider_share = %provider_share,
                pool_share = %pool_share,
                "bisection step"
            );

            if provider_share > lower_bound && provider_share < upper_bound {
                debug!(iteration, fy_token = %fy_token, base_cost = %base_cost, "mint sizing converged");
                return Ok(MintSizing {
                    fy_token,
                    base_cost,
                    iterations: iteration,
                });
            }

            if provider_share >= upper_bound {
                // Too much base left over: buy more fyToken
                low = fy_token.clone();
                fy_token = (&fy_token + &high) / 2u32;
            } else {
                high = fy_token.clone();
                fy_token = (&fy_token + &low) / 2u32;
            }
        }

        warn!(
            max_iterations = self.max_iterations,
            base_in = %base_in,
            "mint sizing did not converge"
        );
        Err(YieldSpaceError::Convergence {
            iterations: self.max_iterations,
        })
    }

    fn evaluate(
        &self,
        reserves: &Reserves,
        base_in: &BigUint,
        fy_token: &BigUint,
        time_to_maturity: i64,
        decimals: u8,
    ) -> Result<Candidate> {
        if fy_token >= reserves.fy_token_real() {
            return Ok(Candidate::Infeasible);
        }

        let base_cost = match self.math.buy_fy_token(
            reserves.base(),
            reserves.fy_token_virtual(),
            fy_token,
            time_to_maturity,
            decimals,
        ) {
            Ok(cost) => cost,
            Err(err) if err.is_infeasible_trade() => return Ok(Candidate::Infeasible),
            Err(err) => return Err(err),
        };
        if &base_cost > base_in {
            return Ok(Candidate::Infeasible);
        }

        let leftover = BigInt::from(base_in - &base_cost);
        let fy_token = BigInt::from(fy_token.clone());
        let provider_share = Real::from_ratio(&leftover, &(&leftover + &fy_token)).ok_or(
            YieldSpaceError::DivisionByZero {
                context: "provider holdings",
            },
        )?;

        let pool_base = BigInt::from(reserves.base() + &base_cost);
        let pool_fy_token = BigInt::from(reserves.fy_token_real().clone()) - &fy_token;
        let pool_share = Real::from_ratio(&pool_base, &(&pool_base + &pool_fy_token)).ok_or(
            YieldSpaceError::DivisionByZero {
                context: "pool reserves",
            },
        )?;

        Ok(Candidate::Priced {
            base_cost,
            provider_share,
            pool_share,
        })
    }
}
