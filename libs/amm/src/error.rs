//! Errors raised by the pricing engine
//!
//! Every failure is local to a single call. Domain errors reject inputs the
//! curve is not defined for, `Convergence` reports a search that ran out of
//! iterations, and `InfeasibleTrade` replaces the "return zero" sentinel a
//! price-adjusted trade used to produce when its invariant had no solution.

use crate::real::Real;
use crate::trade::TradeKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum YieldSpaceError {
    /// Pool is past maturity
    #[error("Negative time to maturity: {seconds}s (pool has matured)")]
    PastMaturity { seconds: i64 },

    /// `a = 1 - g * ts * t` left the interval (0, 1]
    #[error("Curve exponent out of range (0, 1]: a = {a}")]
    ExponentOutOfRange { a: Real },

    #[error("Division by zero: {context}")]
    DivisionByZero { context: &'static str },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Bisection search exhausted its iteration budget
    #[error("Search did not converge after {iterations} iterations")]
    Convergence { iterations: u32 },

    /// The invariant has no valid solution for this trade
    #[error("{kind} is infeasible: {reason}")]
    InfeasibleTrade {
        kind: TradeKind,
        reason: &'static str,
    },
}

impl YieldSpaceError {
    /// True for inputs the curve is undefined on
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Self::PastMaturity { .. }
                | Self::ExponentOutOfRange { .. }
                | Self::DivisionByZero { .. }
                | Self::InvalidParameter { .. }
        )
    }

    pub fn is_infeasible_trade(&self) -> bool {
        matches!(self, Self::InfeasibleTrade { .. })
    }
}

pub type Result<T> = std::result::Result<T, YieldSpaceError>;
