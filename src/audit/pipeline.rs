use std::sync::Arc;
use tracing::{debug, debug_span, warn};

use super::checks::{
    CapitalGainsCheck, ClassificationCheck, ConvertibleNoteCheck, NexusCheck, RelatedPartyLoanCheck,
    RemittanceCheck, SetOffCheck,
};
use super::Check;
use crate::domain::{AuditReport, Intent, RuleBook};

/// Ordered table of checks run against an intent.
///
/// Every check whose trigger fires is evaluated, in table order, and all
/// failures are collected. The order is fixed at construction so that the
/// same intent always yields the same report.
#[derive(Debug, Clone)]
pub struct AuditPipeline {
    checks: Vec<Arc<dyn Check>>,
    rulebook_version: String,
}

impl AuditPipeline {
    /// Build the standard pipeline from a rule book.
    pub fn new(book: &RuleBook) -> Self {
        let checks: Vec<Arc<dyn Check>> = vec![
            Arc::new(ClassificationCheck::new()),
            Arc::new(NexusCheck::new(book)),
            Arc::new(SetOffCheck::new(book)),
            Arc::new(CapitalGainsCheck::new(book)),
            Arc::new(RelatedPartyLoanCheck::new(book)),
            Arc::new(ConvertibleNoteCheck::new()),
            Arc::new(RemittanceCheck::new(book)),
        ];

        AuditPipeline {
            checks,
            rulebook_version: book.version.clone(),
        }
    }

    /// Build a pipeline from an explicit check table.
    pub fn from_checks(checks: Vec<Arc<dyn Check>>, rulebook_version: impl Into<String>) -> Self {
        AuditPipeline {
            checks,
            rulebook_version: rulebook_version.into(),
        }
    }

    pub fn rulebook_version(&self) -> &str {
        &self.rulebook_version
    }

    /// Check identifiers in evaluation order.
    pub fn check_ids(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.id()).collect()
    }

    /// Run every applicable check and fold the results into one report.
    pub fn audit(&self, intent: &Intent) -> AuditReport {
        let span = debug_span!("audit", keys = intent.len(), rulebook = %self.rulebook_version);
        let _enter = span.enter();

        let mut report = AuditReport::new();
        for check in &self.checks {
            if !check.triggers(intent) {
                continue;
            }

            let result = check.evaluate(intent);
            debug!(
                check = check.id(),
                verified = result.verified,
                malformed = result.malformed_input,
                "Check evaluated"
            );
            if !result.verified {
                warn!(
                    check = check.id(),
                    guard = %result.guard,
                    malformed = result.malformed_input,
                    message = %result.message,
                    "Intent blocked"
                );
            }
            report.record(check.id(), &result);
        }

        report
    }
}

impl Default for AuditPipeline {
    fn default() -> Self {
        AuditPipeline::new(&RuleBook::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GuardId, GuardResult};
    use serde_json::json;

    fn set_off_intent() -> Intent {
        Intent::new()
            .with("loss_head", "intraday")
            .with("offset_head", "fno")
            .with("loss_amount", 50000)
    }

    #[test]
    fn test_illegal_set_off_blocks() {
        let report = AuditPipeline::default().audit(&set_off_intent());

        assert!(!report.allowed());
        assert_eq!(report.blocks().len(), 1);
        assert_eq!(
            report.blocks()[0],
            "Illegal set-off: intraday (speculative) loss of 50000 cannot reduce fno. \
             Loss of 50000 must be carried forward (4 years). It cannot be consumed now."
        );
    }

    #[test]
    fn test_empty_intent_is_vacuous_pass() {
        let report = AuditPipeline::default().audit(&Intent::new());
        assert!(report.allowed());
        assert!(report.blocks().is_empty());
        assert!(report.evaluated().is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let intent = Intent::new().with("action", "pay_invoice").with("memo", json!({"x": 1}));
        let report = AuditPipeline::default().audit(&intent);
        assert!(report.allowed());
        assert!(report.evaluated().is_empty());
    }

    #[test]
    fn test_failures_accumulate_in_table_order() {
        let intent = Intent::new()
            .with("remittance_amount_usd", 300000)
            .with("purpose", "travel")
            .with("lender_type", "PRIVATE_COMPANY")
            .with("borrower_role", "director")
            .with("worker_type", "1099")
            .with(
                "worker_facts",
                json!({"provides_tools": true, "indefinite_relationship": true}),
            )
            .with("state", "CA")
            .with("sales_data", json!({"amount": 10}));

        let report = AuditPipeline::default().audit(&intent);

        assert!(!report.allowed());
        assert_eq!(
            report.evaluated(),
            &["CLASSIFICATION", "NEXUS", "RELATED_PARTY_LOAN", "REMITTANCE"]
        );
        assert_eq!(report.blocks().len(), 3);
        assert!(report.blocks()[0].starts_with("Misclassification risk"));
        assert!(report.blocks()[1].contains("Section 185"));
        assert!(report.blocks()[2].starts_with("BLOCKED"));
    }

    #[test]
    fn test_same_intent_same_report() {
        let pipeline = AuditPipeline::default();
        let intent = set_off_intent().with("purpose", "gambling").with("remittance_amount_usd", 1);
        assert_eq!(pipeline.audit(&intent), pipeline.audit(&intent));
    }

    #[test]
    fn test_malformed_dates_never_block() {
        let pipeline = AuditPipeline::default();
        let intent = Intent::new()
            .with("asset_type", "equity")
            .with("dates", json!({"buy": "01/01/2022", "sell": "2023-06-01"}));
        assert!(pipeline.audit(&intent).allowed());

        let claimed = intent.with("claimed_rate", "12.5%");
        let report = pipeline.audit(&claimed);
        assert!(report.allowed());
        assert_eq!(report.evaluated(), ["CAPITAL_GAINS"]);
    }

    #[test]
    fn test_overflowing_facts_block_without_aborting() {
        let pipeline = AuditPipeline::default();
        let intent = Intent::new()
            .with("remittance_amount_usd", "70000000000000000000000000000")
            .with("fy_usage", "70000000000000000000000000000")
            .with("purpose", "education")
            .with("investment_round", "convertible_note")
            .with("investment_amount", "100000000000000000000")
            .with("next_round_price", "0.0000000001")
            .with("loss_head", "intraday")
            .with("offset_head", "fno");

        let report = pipeline.audit(&intent);

        assert!(!report.allowed());
        assert_eq!(report.evaluated(), ["SET_OFF", "CONVERTIBLE_NOTE", "REMITTANCE"]);
        assert_eq!(report.blocks().len(), 3);
        assert!(report.blocks()[1].starts_with("Arithmetic overflow"));
        assert!(report.blocks()[2].starts_with("Arithmetic overflow"));
    }

    #[test]
    fn test_custom_check_table() {
        #[derive(Debug)]
        struct Reject;

        impl Check for Reject {
            fn id(&self) -> &str {
                "REJECT"
            }
            fn required_keys(&self) -> &[&'static str] {
                &[]
            }
            fn evaluate(&self, _intent: &Intent) -> GuardResult {
                GuardResult::fail(GuardId::Payroll, "rejected").with_fix("Fix it.")
            }
        }

        let pipeline = AuditPipeline::from_checks(vec![Arc::new(Reject), Arc::new(Reject)], "test");
        let report = pipeline.audit(&Intent::new());
        assert_eq!(pipeline.check_ids(), vec!["REJECT", "REJECT"]);
        assert_eq!(report.blocks(), &["rejected Fix it.", "rejected Fix it."]);
    }

    #[test]
    fn test_concurrent_audits() {
        let pipeline = AuditPipeline::default();
        let intent = set_off_intent();
        let expected = pipeline.audit(&intent);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(pipeline.audit(&intent), expected));
            }
        });
    }
}
