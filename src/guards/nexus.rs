use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::rulebook::NexusThreshold;
use crate::domain::{GuardId, GuardResult};

/// Tax decision that leaves an established nexus unaddressed.
pub const NO_TAX: &str = "no_tax";

/// US state economic nexus for sales tax.
#[derive(Debug, Clone)]
pub struct NexusGuard {
    /// Upper-cased state code -> threshold
    thresholds: HashMap<String, NexusThreshold>,
}

impl NexusGuard {
    pub fn new(thresholds: &HashMap<String, NexusThreshold>) -> Self {
        NexusGuard {
            thresholds: thresholds
                .iter()
                .map(|(state, t)| (state.trim().to_uppercase(), t.clone()))
                .collect(),
        }
    }

    /// Whether sales into `state` establish nexus. Unknown states never do.
    pub fn has_nexus(&self, state: &str, sales_amount: Decimal, transactions: u64) -> bool {
        match self.thresholds.get(&state.trim().to_uppercase()) {
            Some(t) => {
                sales_amount >= t.amount
                    || t.transactions.is_some_and(|limit| limit > 0 && transactions >= limit)
            }
            None => false,
        }
    }

    /// Fails when nexus is established and the decision is not to collect tax.
    pub fn check_nexus_liability(
        &self,
        state: &str,
        sales_amount: Decimal,
        transactions: u64,
        tax_decision: &str,
    ) -> GuardResult {
        if !self.has_nexus(state, sales_amount, transactions) {
            return GuardResult::pass(
                GuardId::EconomicNexus,
                format!("No economic nexus in {}.", state),
            );
        }

        if tax_decision.trim().eq_ignore_ascii_case(NO_TAX) {
            return GuardResult::fail(
                GuardId::EconomicNexus,
                format!(
                    "Nexus threshold exceeded in {} (sales {}, {} transactions). Registration required.",
                    state, sales_amount, transactions
                ),
            );
        }

        GuardResult::pass(
            GuardId::EconomicNexus,
            format!("Nexus in {} addressed by tax decision '{}'.", state, tax_decision),
        )
    }
}

impl Default for NexusGuard {
    fn default() -> Self {
        NexusGuard::new(&crate::domain::RuleBook::default().nexus)
    }
}
