//! Pool reserve snapshot

use crate::error::{Result, YieldSpaceError};
use num::bigint::BigUint;
use serde::Serialize;

/// Reserves as seen by the pricing functions
///
/// `fy_token_virtual` is the fyToken balance the invariant uses; it embeds an
/// offset equal to the outstanding LP supply on top of `fy_token_real`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reserves {
    base: BigUint,
    fy_token_virtual: BigUint,
    fy_token_real: BigUint,
}

impl Reserves {
    pub fn new(base: BigUint, fy_token_virtual: BigUint, fy_token_real: BigUint) -> Result<Self> {
        if fy_token_real > fy_token_virtual {
            return Err(YieldSpaceError::InvalidParameter {
                name: "fy_token_real",
                reason: format!(
                    "real fyToken reserves {} exceed virtual reserves {}",
                    fy_token_real, fy_token_virtual
                ),
            });
        }
        Ok(Self {
            base,
            fy_token_virtual,
            fy_token_real,
        })
    }

    pub fn base(&self) -> &BigUint {
        &self.base
    }

    pub fn fy_token_virtual(&self) -> &BigUint {
        &self.fy_token_virtual
    }

    pub fn fy_token_real(&self) -> &BigUint {
        &self.fy_token_real
    }

    /// LP supply embedded in the virtual reserve
    pub fn embedded_supply(&self) -> BigUint {
        &self.fy_token_virtual - &self.fy_token_real
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_reserves_embed_supply() {
        let reserves = Reserves::new(
            BigUint::from(1_100u64),
            BigUint::from(2_100u64),
            BigUint::from(1_000u64),
        )
        .unwrap();
        assert_eq!(reserves.embedded_supply(), BigUint::from(1_100u64));
    }

    #[test]
    fn test_real_above_virtual_is_rejected() {
        let err = Reserves::new(
            BigUint::from(1u64),
            BigUint::from(10u64),
            BigUint::from(11u64),
        )
        .unwrap_err();
        assert!(err.is_domain_error());
    }
}
