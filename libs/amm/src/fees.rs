//! Trading fee carried by a trade

use crate::error::Result;
use crate::trade::{FeeMode, TradeInput, TradeKind, YieldMath};
use crate::units::Scale;
use num::bigint::{BigInt, BigUint, Sign};

impl YieldMath {
    /// Extra cost a trader pays because of `g1`/`g2`
    ///
    /// A non-negative `fy_token` prices buying that much fyToken, a negative
    /// one prices selling its magnitude. Either way the result is the with-fee
    /// quote minus the no-fee quote in the trader's disfavor, so it is
    /// positive whenever the fee multipliers are not 1.
    pub fn fee_delta(
        &self,
        base_reserves: &BigUint,
        fy_token_reserves: &BigUint,
        fy_token: &BigInt,
        time_to_maturity: i64,
        scale: &Scale,
    ) -> Result<BigInt> {
        let amount = fy_token.magnitude();
        let input = TradeInput {
            base_reserves,
            fy_token_reserves,
            amount,
            time_to_maturity,
        };

        if fy_token.sign() == Sign::Minus {
            let with_fee = self.price(TradeKind::SellFyToken, input, scale, FeeMode::WithFee)?;
            let without_fee = self.price(TradeKind::SellFyToken, input, scale, FeeMode::NoFee)?;
            Ok(BigInt::from(without_fee) - BigInt::from(with_fee))
        } else {
            let with_fee = self.price(TradeKind::BuyFyToken, input, scale, FeeMode::WithFee)?;
            let without_fee = self.price(TradeKind::BuyFyToken, input, scale, FeeMode::NoFee)?;
            Ok(BigInt::from(with_fee) - BigInt::from(without_fee))
        }
    }
}
