use rust_decimal::Decimal;

use crate::domain::decimal::percent_to_fraction;
use crate::domain::{GuardId, GuardResult, Payload};

/// Convertible note conversion at the next priced round.
#[derive(Debug, Clone, Default)]
pub struct ValuationGuard;

impl ValuationGuard {
    pub fn new() -> Self {
        ValuationGuard
    }

    /// Conversion price is the lower of the valuation cap (when set) and
    /// the discounted next-round price. When `claimed_shares` is given it
    /// must equal `floor(investment / conversion_price)`.
    pub fn verify_conversion(
        &self,
        investment: Decimal,
        cap_price: Decimal,
        discount_percent: Decimal,
        next_round_price: Decimal,
        claimed_shares: Option<Decimal>,
    ) -> GuardResult {
        if next_round_price <= Decimal::ZERO {
            return GuardResult::malformed(
                GuardId::Valuation,
                format!(
                    "Next round price must be positive to convert the note, got {}.",
                    next_round_price
                ),
            );
        }
        if discount_percent < Decimal::ZERO || discount_percent >= Decimal::ONE_HUNDRED {
            return GuardResult::malformed(
                GuardId::Valuation,
                format!("Discount {}% is outside [0, 100).", discount_percent),
            );
        }

        let discounted = next_round_price * (Decimal::ONE - percent_to_fraction(discount_percent));
        let conversion_price = if cap_price > Decimal::ZERO {
            cap_price.min(discounted)
        } else {
            discounted
        };
        let shares = match investment.checked_div(conversion_price) {
            Some(quotient) => quotient.floor(),
            None => {
                return GuardResult::overflow(
                    GuardId::Valuation,
                    format!("investment {} at conversion price {}", investment, conversion_price),
                )
            }
        };
        let payload = Payload::Conversion {
            conversion_price,
            shares,
        };

        match claimed_shares {
            Some(claimed) if claimed != shares => GuardResult::fail(
                GuardId::Valuation,
                format!(
                    "Share count mismatch: {} at conversion price {} yields {} shares, claimed {}.",
                    investment, conversion_price, shares, claimed
                ),
            )
            .with_payload(payload),
            _ => GuardResult::pass(
                GuardId::Valuation,
                format!(
                    "Note converts at {} per share into {} shares.",
                    conversion_price, shares
                ),
            )
            .with_payload(payload),
        }
    }
}
