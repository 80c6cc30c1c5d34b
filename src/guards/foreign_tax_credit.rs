use rust_decimal::Decimal;

use crate::domain::decimal::percent_to_fraction;
use crate::domain::{GuardId, GuardResult, Payload};

/// Foreign tax credit under a double taxation avoidance agreement.
///
/// The credit is the lower of the foreign tax actually paid and the home
/// tax payable on the same income. This guard never blocks; it reports
/// whether the credit was capped and how much foreign tax lapses.
#[derive(Debug, Clone, Default)]
pub struct ForeignTaxCreditGuard;

impl ForeignTaxCreditGuard {
    pub fn new() -> Self {
        ForeignTaxCreditGuard
    }

    pub fn verify_foreign_tax_credit(
        &self,
        foreign_income: Decimal,
        foreign_tax_paid: Decimal,
        home_tax_rate_percent: Decimal,
    ) -> GuardResult {
        let computed = foreign_income
            .checked_mul(percent_to_fraction(home_tax_rate_percent))
            .and_then(|home| {
                let credit = foreign_tax_paid.min(home);
                Some((home, credit, foreign_tax_paid.checked_sub(credit)?))
            });
        let (home_tax_payable, allowable_credit, excess_tax_lapsed) = match computed {
            Some(values) => values,
            None => {
                return GuardResult::overflow(
                    GuardId::ForeignTaxCredit,
                    format!(
                        "income {} at {}% against tax paid {}",
                        foreign_income, home_tax_rate_percent, foreign_tax_paid
                    ),
                )
            }
        };
        let capped = allowable_credit < foreign_tax_paid;

        let message = if capped {
            format!(
                "FTC capped. Paid {}, but home tax liability is only {}. Credit limited to {}.",
                foreign_tax_paid, home_tax_payable, allowable_credit
            )
        } else {
            format!("Full foreign tax credit of {} allowed.", allowable_credit)
        };

        GuardResult::pass(GuardId::ForeignTaxCredit, message).with_payload(
            Payload::ForeignTaxCredit {
                home_tax_payable,
                allowable_credit,
                excess_tax_lapsed,
                capped,
            },
        )
    }
}
