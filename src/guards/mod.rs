//! Deterministic rule checks.
//!
//! Each guard owns one statutory rule, is built from its section of the
//! [`RuleBook`](crate::domain::RuleBook), and returns a [`GuardResult`](crate::domain::GuardResult)
//! from every operation. Guards hold no mutable state and are `Send + Sync`.

pub mod capital_gains;
pub mod classification;
pub mod crypto;
pub mod deposit;
pub mod foreign_tax_credit;
pub mod input_credit;
pub mod nexus;
pub mod payroll;
pub mod related_party;
pub mod remittance;
pub mod residency;
pub mod speculation;
pub mod transfer_pricing;
pub mod valuation;
pub mod withholding;

pub use capital_gains::{CapitalGainsGuard, HoldingTerm};
pub use classification::{ClassificationGuard, WorkerFacts, WorkerType};
pub use crypto::CryptoTaxGuard;
pub use deposit::DepositRateGuard;
pub use foreign_tax_credit::ForeignTaxCreditGuard;
pub use input_credit::InputCreditGuard;
pub use nexus::NexusGuard;
pub use payroll::PayrollGuard;
pub use related_party::RelatedPartyGuard;
pub use remittance::RemittanceGuard;
pub use residency::{CompanyFacts, ResidencyGuard};
pub use speculation::SpeculationGuard;
pub use transfer_pricing::{PricingMethod, TransferPricingGuard};
pub use valuation::ValuationGuard;
pub use withholding::WithholdingGuard;
