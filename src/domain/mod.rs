pub mod decimal;
pub mod intent;
pub mod payroll;
pub mod report;
pub mod result;
pub mod rulebook;

pub use decimal::DecimalError;
pub use intent::Intent;
pub use payroll::{Currency, DeductionEntry, DeductionType, PayrollEntry, TaxEntry};
pub use report::AuditReport;
pub use result::{GuardId, GuardResult, Payload, Residency, RiskCode};
pub use rulebook::{RuleBook, StatutoryRate};
