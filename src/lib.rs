pub mod audit;
pub mod config;
pub mod domain;
pub mod guards;
pub mod observability;
pub mod policy;
pub mod verifier;

pub use audit::{AuditPipeline, Check};
pub use config::Config;
pub use domain::{AuditReport, GuardResult, Intent, RuleBook};
pub use verifier::{Jurisdiction, TaxVerifier, VerifierError};
