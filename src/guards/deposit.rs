use rust_decimal::{Decimal, MathematicalOps};

use crate::domain::decimal::{percent_to_fraction, round_money};
use crate::domain::{GuardId, GuardResult, Payload};

/// Fixed deposit maturity under periodic compounding.
#[derive(Debug, Clone, Default)]
pub struct DepositRateGuard;

impl DepositRateGuard {
    pub fn new() -> Self {
        DepositRateGuard
    }

    /// `principal * (1 + r/n)^(n * years)`, exact until the final rounding.
    /// `None` on overflow.
    pub fn maturity_amount(
        &self,
        principal: Decimal,
        rate_percent: Decimal,
        years: u32,
        compounding_per_year: u32,
    ) -> Option<Decimal> {
        let periods = compounding_per_year.checked_mul(years)?;
        let factor = if compounding_per_year == 0 {
            Decimal::ONE
        } else {
            Decimal::ONE + percent_to_fraction(rate_percent) / Decimal::from(compounding_per_year)
        };

        let growth = factor.checked_powu(u64::from(periods))?;
        Some(round_money(principal.checked_mul(growth)?))
    }

    pub fn verify_fd_rate(
        &self,
        principal: Decimal,
        rate_percent: Decimal,
        years: u32,
        compounding_per_year: u32,
        claimed_maturity: Decimal,
    ) -> GuardResult {
        let computed = self.maturity_amount(principal, rate_percent, years, compounding_per_year);
        let maturity = match computed {
            Some(m) => m,
            None => {
                return GuardResult::malformed(
                    GuardId::DepositRate,
                    format!(
                        "Maturity of {} at {}% over {} years ({}x/yr) is out of range.",
                        principal, rate_percent, years, compounding_per_year
                    ),
                )
            }
        };
        let claimed = round_money(claimed_maturity);
        let payload = Payload::Deposit {
            maturity_amount: maturity,
            interest: maturity - principal,
        };

        if maturity == claimed {
            GuardResult::pass(
                GuardId::DepositRate,
                format!("Maturity amount {} verified.", maturity),
            )
            .with_payload(payload)
        } else {
            GuardResult::fail(
                GuardId::DepositRate,
                format!(
                    "Maturity mismatch: calculated {}, claimed {}.",
                    maturity, claimed
                ),
            )
            .with_payload(payload)
        }
    }
}
