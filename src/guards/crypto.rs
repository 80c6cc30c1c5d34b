use rust_decimal::Decimal;

use crate::domain::decimal::percent_to_fraction;
use crate::domain::rulebook::CryptoTable;
use crate::domain::{GuardId, GuardResult, Payload};

/// Virtual digital asset (VDA) gains: taxed at a flat rate, with no
/// set-off of VDA losses.
#[derive(Debug, Clone)]
pub struct CryptoTaxGuard {
    flat_rate_percent: Decimal,
}

impl CryptoTaxGuard {
    pub fn new(table: &CryptoTable) -> Self {
        CryptoTaxGuard {
            flat_rate_percent: table.flat_rate_percent,
        }
    }

    pub fn verify_set_off(&self, losses: Decimal, gains: Decimal) -> GuardResult {
        let taxable_gain = gains.max(Decimal::ZERO);
        let rate = percent_to_fraction(self.flat_rate_percent);
        let tax_payable = match taxable_gain.checked_mul(rate) {
            Some(tax) => tax,
            None => {
                return GuardResult::overflow(
                    GuardId::CryptoSetOff,
                    format!("VDA gains {} at {}%", gains, self.flat_rate_percent),
                )
            }
        };

        if losses > Decimal::ZERO && gains > Decimal::ZERO {
            return GuardResult::fail(
                GuardId::CryptoSetOff,
                format!(
                    "VDA loss of {} cannot be set off against VDA gains of {}. Tax at {}% is due on the full {}: {}.",
                    losses, gains, self.flat_rate_percent, taxable_gain, tax_payable
                ),
            )
            .with_fix("Report VDA gains without reducing them by VDA losses.")
            .with_payload(Payload::CryptoGains {
                taxable_gain,
                tax_payable,
                disallowed_loss: losses,
            });
        }

        GuardResult::pass(
            GuardId::CryptoSetOff,
            format!("No VDA set-off claimed; tax on {} is {}.", taxable_gain, tax_payable),
        )
        .with_payload(Payload::CryptoGains {
            taxable_gain,
            tax_payable,
            disallowed_loss: Decimal::ZERO,
        })
    }
}

impl Default for CryptoTaxGuard {
    fn default() -> Self {
        CryptoTaxGuard::new(&CryptoTable::default())
    }
}
