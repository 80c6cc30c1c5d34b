pub mod checks;
pub mod pipeline;

pub use checks::{
    CapitalGainsCheck, ClassificationCheck, ConvertibleNoteCheck, NexusCheck, RelatedPartyLoanCheck,
    RemittanceCheck, SetOffCheck,
};
pub use pipeline::AuditPipeline;

use crate::domain::{GuardResult, Intent};
use std::fmt::Debug;

/// One entry of the audit table: a trigger on intent shape bound to a
/// guard invocation.
///
/// Checks are stateless and shared across threads. They read whatever
/// optional facts they need from the intent, defaulting absent ones, and
/// always return a result rather than failing.
pub trait Check: Send + Sync + Debug {
    /// Unique identifier for this check.
    fn id(&self) -> &str;

    /// Keys that must all be present for the check to fire.
    fn required_keys(&self) -> &[&'static str];

    /// Whether the check applies to this intent.
    fn triggers(&self, intent: &Intent) -> bool {
        intent.has_all(self.required_keys())
    }

    /// Run the bound guard against the intent's facts.
    fn evaluate(&self, intent: &Intent) -> GuardResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GuardId;

    #[derive(Debug)]
    struct AlwaysFails;

    impl Check for AlwaysFails {
        fn id(&self) -> &str {
            "ALWAYS_FAILS"
        }

        fn required_keys(&self) -> &[&'static str] {
            &["a", "b"]
        }

        fn evaluate(&self, _intent: &Intent) -> GuardResult {
            GuardResult::fail(GuardId::Payroll, "nope")
        }
    }

    #[test]
    fn test_default_trigger_needs_all_keys() {
        let check = AlwaysFails;
        assert!(!check.triggers(&Intent::new().with("a", 1)));
        assert!(check.triggers(&Intent::new().with("a", 1).with("b", 2)));
    }
}
