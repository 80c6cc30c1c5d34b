use rust_decimal::Decimal;

use crate::domain::rulebook::SetOffTable;
use crate::domain::{GuardId, GuardResult};

/// Trading loss set-off between income heads.
///
/// A speculative (intraday) loss may only reduce speculative profit. Any
/// other offset is rejected and the loss has to be carried forward.
#[derive(Debug, Clone)]
pub struct SpeculationGuard {
    marker: String,
    carry_forward_years: u32,
}

impl SpeculationGuard {
    pub fn new(table: &SetOffTable) -> Self {
        SpeculationGuard {
            marker: table.speculative_marker.trim().to_lowercase(),
            carry_forward_years: table.carry_forward_years,
        }
    }

    fn is_speculative(&self, head: &str) -> bool {
        head.to_lowercase().contains(&self.marker)
    }

    pub fn verify_setoff(
        &self,
        loss_source: &str,
        loss_amount: Decimal,
        profit_source: &str,
    ) -> GuardResult {
        if self.is_speculative(loss_source) && !self.is_speculative(profit_source) {
            return GuardResult::fail(
                GuardId::SpeculativeSetOff,
                format!(
                    "Illegal set-off: {} (speculative) loss of {} cannot reduce {}.",
                    loss_source.to_lowercase(),
                    loss_amount,
                    profit_source.to_lowercase()
                ),
            )
            .with_fix(format!(
                "Loss of {} must be carried forward ({} years). It cannot be consumed now.",
                loss_amount, self.carry_forward_years
            ));
        }

        GuardResult::pass(GuardId::SpeculativeSetOff, "Set-off allowed.")
    }
}

impl Default for SpeculationGuard {
    fn default() -> Self {
        SpeculationGuard::new(&SetOffTable::default())
    }
}
