use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::Check;
use crate::domain::{GuardResult, Intent, RuleBook};
use crate::guards::nexus::NO_TAX;
use crate::guards::{
    CapitalGainsGuard, ClassificationGuard, NexusGuard, RelatedPartyGuard, RemittanceGuard,
    SpeculationGuard, ValuationGuard, WorkerFacts,
};

/// `worker_type` + `worker_facts`: common-law classification claim.
#[derive(Debug, Default)]
pub struct ClassificationCheck {
    guard: ClassificationGuard,
}

impl ClassificationCheck {
    pub fn new() -> Self {
        ClassificationCheck {
            guard: ClassificationGuard::new(),
        }
    }
}

impl Check for ClassificationCheck {
    fn id(&self) -> &str {
        "CLASSIFICATION"
    }

    fn required_keys(&self) -> &[&'static str] {
        &["worker_type", "worker_facts"]
    }

    fn evaluate(&self, intent: &Intent) -> GuardResult {
        let facts = WorkerFacts {
            provides_tools: intent.nested_flag("worker_facts", "provides_tools"),
            reimburses_expenses: intent.nested_flag("worker_facts", "reimburses_expenses"),
            indefinite_relationship: intent.nested_flag("worker_facts", "indefinite_relationship"),
        };
        self.guard
            .verify_classification_claim(&intent.text("worker_type"), &facts)
    }
}

/// `state` + `sales_data`: economic nexus left untaxed.
#[derive(Debug)]
pub struct NexusCheck {
    guard: NexusGuard,
}

impl NexusCheck {
    pub fn new(book: &RuleBook) -> Self {
        NexusCheck {
            guard: NexusGuard::new(&book.nexus),
        }
    }
}

impl Check for NexusCheck {
    fn id(&self) -> &str {
        "NEXUS"
    }

    fn required_keys(&self) -> &[&'static str] {
        &["state", "sales_data"]
    }

    fn evaluate(&self, intent: &Intent) -> GuardResult {
        let amount = intent.nested_decimal_or_zero("sales_data", "amount");
        let transactions = intent
            .nested_decimal_or_zero("sales_data", "transactions")
            .trunc()
            .to_u64()
            .unwrap_or(0);
        let decision = match intent.text("tax_decision") {
            d if d.is_empty() => NO_TAX.to_string(),
            d => d,
        };
        self.guard
            .check_nexus_liability(&intent.text("state"), amount, transactions, &decision)
    }
}

/// `loss_head` + `offset_head`: speculative loss set-off.
#[derive(Debug)]
pub struct SetOffCheck {
    guard: SpeculationGuard,
}

impl SetOffCheck {
    pub fn new(book: &RuleBook) -> Self {
        SetOffCheck {
            guard: SpeculationGuard::new(&book.set_off),
        }
    }
}

impl Check for SetOffCheck {
    fn id(&self) -> &str {
        "SET_OFF"
    }

    fn required_keys(&self) -> &[&'static str] {
        &["loss_head", "offset_head"]
    }

    fn evaluate(&self, intent: &Intent) -> GuardResult {
        self.guard.verify_setoff(
            &intent.text("loss_head"),
            intent.decimal_or_zero("loss_amount"),
            &intent.text("offset_head"),
        )
    }
}

/// `asset_type` + `dates`: holding term and, if claimed, the rate.
#[derive(Debug)]
pub struct CapitalGainsCheck {
    guard: CapitalGainsGuard,
}

impl CapitalGainsCheck {
    pub fn new(book: &RuleBook) -> Self {
        CapitalGainsCheck {
            guard: CapitalGainsGuard::new(&book.capital_gains),
        }
    }
}

impl Check for CapitalGainsCheck {
    fn id(&self) -> &str {
        "CAPITAL_GAINS"
    }

    fn required_keys(&self) -> &[&'static str] {
        &["asset_type", "dates"]
    }

    fn evaluate(&self, intent: &Intent) -> GuardResult {
        let claimed = intent.contains("claimed_rate").then(|| intent.text("claimed_rate"));
        self.guard.verify_claim(
            &intent.text("asset_type"),
            &intent.nested_text("dates", "buy"),
            &intent.nested_text("dates", "sell"),
            claimed.as_deref(),
        )
    }
}

/// `lender_type` + `borrower_role`: loans to connected persons.
#[derive(Debug)]
pub struct RelatedPartyLoanCheck {
    guard: RelatedPartyGuard,
}

impl RelatedPartyLoanCheck {
    pub fn new(book: &RuleBook) -> Self {
        RelatedPartyLoanCheck {
            guard: RelatedPartyGuard::new(&book.related_party),
        }
    }
}

impl Check for RelatedPartyLoanCheck {
    fn id(&self) -> &str {
        "RELATED_PARTY_LOAN"
    }

    fn required_keys(&self) -> &[&'static str] {
        &["lender_type", "borrower_role"]
    }

    fn evaluate(&self, intent: &Intent) -> GuardResult {
        self.guard.verify_loan_compliance(
            &intent.text("lender_type"),
            &intent.text("borrower_role"),
            intent.decimal_or_zero("interest_rate"),
            intent.decimal_or_zero("market_rate"),
        )
    }
}

/// Round tag that activates [`ConvertibleNoteCheck`].
pub const CONVERTIBLE_NOTE: &str = "convertible_note";

/// `investment_round == "convertible_note"`: conversion terms.
#[derive(Debug, Default)]
pub struct ConvertibleNoteCheck {
    guard: ValuationGuard,
}

impl ConvertibleNoteCheck {
    pub fn new() -> Self {
        ConvertibleNoteCheck {
            guard: ValuationGuard::new(),
        }
    }
}

impl Check for ConvertibleNoteCheck {
    fn id(&self) -> &str {
        "CONVERTIBLE_NOTE"
    }

    fn required_keys(&self) -> &[&'static str] {
        &["investment_round"]
    }

    fn triggers(&self, intent: &Intent) -> bool {
        intent.text("investment_round") == CONVERTIBLE_NOTE
    }

    fn evaluate(&self, intent: &Intent) -> GuardResult {
        self.guard.verify_conversion(
            intent.decimal_or_zero("investment_amount"),
            intent.decimal_or_zero("cap_price"),
            intent.decimal_or_zero("discount"),
            intent.decimal_or_zero("next_round_price"),
            intent.decimal("claimed_shares"),
        )
    }
}

/// `remittance_amount_usd` + `purpose`: LRS limit and purpose.
#[derive(Debug)]
pub struct RemittanceCheck {
    guard: RemittanceGuard,
}

impl RemittanceCheck {
    pub fn new(book: &RuleBook) -> Self {
        RemittanceCheck {
            guard: RemittanceGuard::new(&book.remittance),
        }
    }
}

impl Check for RemittanceCheck {
    fn id(&self) -> &str {
        "REMITTANCE"
    }

    fn required_keys(&self) -> &[&'static str] {
        &["remittance_amount_usd", "purpose"]
    }

    fn evaluate(&self, intent: &Intent) -> GuardResult {
        let usage = match intent.decimal_or_zero("fy_usage") {
            u if u < Decimal::ZERO => Decimal::ZERO,
            u => u,
        };
        self.guard.verify_lrs_limit(
            intent.decimal_or_zero("remittance_amount_usd"),
            &intent.text("purpose"),
            usage,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification_reads_nested_facts() {
        let intent = Intent::new()
            .with("worker_type", "1099")
            .with(
                "worker_facts",
                json!({"provides_tools": true, "reimburses_expenses": "true"}),
            );
        let result = ClassificationCheck::new().evaluate(&intent);
        assert!(!result.verified);
        assert!(result.message.contains("logic says W2"));
    }

    #[test]
    fn test_nexus_defaults_to_no_tax() {
        let check = NexusCheck::new(&RuleBook::default());
        let intent = Intent::new()
            .with("state", "NY")
            .with("sales_data", json!({"transactions": 150}));
        assert!(!check.evaluate(&intent).verified);

        let collected = intent.clone().with("tax_decision", "collect");
        assert!(check.evaluate(&collected).verified);
    }

    #[test]
    fn test_nexus_missing_sales_fields_default_to_zero() {
        let check = NexusCheck::new(&RuleBook::default());
        let intent = Intent::new().with("state", "CA").with("sales_data", json!({}));
        assert!(check.evaluate(&intent).verified);
    }

    #[test]
    fn test_capital_gains_without_claim_passes() {
        let check = CapitalGainsCheck::new(&RuleBook::default());
        let intent = Intent::new()
            .with("asset_type", "equity")
            .with("dates", json!({"buy": "2022-01-01", "sell": "2023-06-01"}));
        assert!(check.evaluate(&intent).verified);
    }

    #[test]
    fn test_capital_gains_numeric_claim() {
        let check = CapitalGainsCheck::new(&RuleBook::default());
        let intent = Intent::new()
            .with("asset_type", "equity")
            .with("dates", json!({"buy": "2022-01-01", "sell": "2023-06-01"}))
            .with("claimed_rate", 12.5);
        assert!(check.evaluate(&intent).verified);

        let wrong = intent.with("claimed_rate", "20%");
        assert!(!check.evaluate(&wrong).verified);
    }

    #[test]
    fn test_convertible_note_trigger_needs_exact_round() {
        let check = ConvertibleNoteCheck::new();
        assert!(!check.triggers(&Intent::new().with("investment_round", "seed")));
        assert!(check.triggers(&Intent::new().with("investment_round", CONVERTIBLE_NOTE)));
    }

    #[test]
    fn test_remittance_reads_usage() {
        let check = RemittanceCheck::new(&RuleBook::default());
        let intent = Intent::new()
            .with("remittance_amount_usd", 10000)
            .with("purpose", "travel")
            .with("fy_usage", 245000);
        let result = check.evaluate(&intent);
        assert!(!result.verified);
        assert!(result.message.contains("Remaining: $5000"));
    }
}
