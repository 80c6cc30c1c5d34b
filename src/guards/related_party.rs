use rust_decimal::Decimal;

use crate::domain::rulebook::RelatedPartyTable;
use crate::domain::{GuardId, GuardResult, RiskCode};

use super::withholding::normalize_label;

/// Company loans to directors and connected persons.
#[derive(Debug, Clone)]
pub struct RelatedPartyGuard {
    prohibited_roles: Vec<String>,
}

impl RelatedPartyGuard {
    pub fn new(table: &RelatedPartyTable) -> Self {
        RelatedPartyGuard {
            prohibited_roles: table.prohibited_roles.iter().map(|r| normalize_label(r)).collect(),
        }
    }

    /// Loans to a prohibited role always fail. Other loans must carry at
    /// least the market rate of interest.
    pub fn verify_loan_compliance(
        &self,
        lender_type: &str,
        borrower_role: &str,
        interest_rate: Decimal,
        market_rate: Decimal,
    ) -> GuardResult {
        let role = normalize_label(borrower_role);

        if self.prohibited_roles.iter().any(|r| role.contains(r.as_str())) {
            return GuardResult::fail(
                GuardId::RelatedParty,
                format!(
                    "Loans from {} to {} are prohibited under Section 185 unless specific exemptions apply (MD/WTD + Employee Scheme).",
                    lender_type, borrower_role
                ),
            )
            .with_risk(RiskCode::Section185Violation);
        }

        if interest_rate < market_rate {
            return GuardResult::fail(
                GuardId::RelatedParty,
                format!(
                    "Interest rate {}% is below market yield {}%. Must charge commercial rate.",
                    interest_rate, market_rate
                ),
            )
            .with_risk(RiskCode::Section186Violation);
        }

        GuardResult::pass(GuardId::RelatedParty, "Loan compliance verified.")
    }
}

impl Default for RelatedPartyGuard {
    fn default() -> Self {
        RelatedPartyGuard::new(&RelatedPartyTable::default())
    }
}
