//! Jurisdiction-scoped entry point.
//!
//! A [`TaxVerifier`] is bound to one [`Jurisdiction`] at construction and
//! only exposes the guards that apply there. Calling an operation for the
//! other jurisdiction is a usage error, reported as
//! [`VerifierError::WrongJurisdiction`]. Numeric arguments arrive as `f64`
//! and are converted to exact decimals before any guard sees them.

mod jurisdiction;

pub use jurisdiction::{Jurisdiction, VerifierError};

use rust_decimal::Decimal;
use tracing::info;

use crate::audit::AuditPipeline;
use crate::domain::decimal::from_f64;
use crate::domain::{AuditReport, GuardResult, Intent, PayrollEntry, RuleBook};
use crate::guards::{
    CapitalGainsGuard, ClassificationGuard, CompanyFacts, CryptoTaxGuard, DepositRateGuard,
    ForeignTaxCreditGuard, HoldingTerm, InputCreditGuard, NexusGuard, PayrollGuard, PricingMethod,
    RelatedPartyGuard, RemittanceGuard, ResidencyGuard, SpeculationGuard, TransferPricingGuard,
    WithholdingGuard, WorkerFacts,
};

#[derive(Debug)]
struct UsGuards {
    payroll: PayrollGuard,
    classification: ClassificationGuard,
    nexus: NexusGuard,
}

#[derive(Debug)]
struct IndiaGuards {
    crypto: CryptoTaxGuard,
    capital_gains: CapitalGainsGuard,
    withholding: WithholdingGuard,
    input_credit: InputCreditGuard,
    deposit: DepositRateGuard,
    set_off: SpeculationGuard,
    remittance: RemittanceGuard,
    transfer_pricing: TransferPricingGuard,
    foreign_tax_credit: ForeignTaxCreditGuard,
    residency: ResidencyGuard,
    related_party: RelatedPartyGuard,
}

#[derive(Debug)]
enum Bindings {
    Us(UsGuards),
    India(Box<IndiaGuards>),
}

/// Facade binding guards and the audit pipeline to a jurisdiction.
#[derive(Debug)]
pub struct TaxVerifier {
    jurisdiction: Jurisdiction,
    pipeline: AuditPipeline,
    bindings: Bindings,
}

impl TaxVerifier {
    /// Bind a verifier with the built-in rule book.
    ///
    /// Fails for any jurisdiction other than `US` or `INDIA`
    /// (case-insensitive).
    pub fn new(jurisdiction: &str) -> Result<Self, VerifierError> {
        let jurisdiction: Jurisdiction = jurisdiction.parse()?;
        Ok(TaxVerifier::with_rulebook(jurisdiction, &RuleBook::default()))
    }

    pub fn with_rulebook(jurisdiction: Jurisdiction, book: &RuleBook) -> Self {
        let bindings = match jurisdiction {
            Jurisdiction::Us => Bindings::Us(UsGuards {
                payroll: PayrollGuard::new(),
                classification: ClassificationGuard::new(),
                nexus: NexusGuard::new(&book.nexus),
            }),
            Jurisdiction::India => Bindings::India(Box::new(IndiaGuards {
                crypto: CryptoTaxGuard::new(&book.crypto),
                capital_gains: CapitalGainsGuard::new(&book.capital_gains),
                withholding: WithholdingGuard::new(&book.withholding),
                input_credit: InputCreditGuard::new(&book.input_credit),
                deposit: DepositRateGuard::new(),
                set_off: SpeculationGuard::new(&book.set_off),
                remittance: RemittanceGuard::new(&book.remittance),
                transfer_pricing: TransferPricingGuard::new(&book.transfer_pricing),
                foreign_tax_credit: ForeignTaxCreditGuard::new(),
                residency: ResidencyGuard::new(&book.residency),
                related_party: RelatedPartyGuard::new(&book.related_party),
            })),
        };

        info!(jurisdiction = %jurisdiction, rulebook = %book.version, "Tax verifier bound");

        TaxVerifier {
            jurisdiction,
            pipeline: AuditPipeline::new(book),
            bindings,
        }
    }

    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
    }

    /// Audit an intent against every applicable check.
    pub fn audit(&self, intent: &Intent) -> AuditReport {
        self.pipeline.audit(intent)
    }

    fn us(&self, operation: &'static str) -> Result<&UsGuards, VerifierError> {
        match &self.bindings {
            Bindings::Us(guards) => Ok(guards),
            Bindings::India(_) => Err(self.wrong(operation, Jurisdiction::Us)),
        }
    }

    fn india(&self, operation: &'static str) -> Result<&IndiaGuards, VerifierError> {
        match &self.bindings {
            Bindings::India(guards) => Ok(&**guards),
            Bindings::Us(_) => Err(self.wrong(operation, Jurisdiction::India)),
        }
    }

    fn wrong(&self, operation: &'static str, required: Jurisdiction) -> VerifierError {
        VerifierError::WrongJurisdiction {
            operation,
            required,
            bound: self.jurisdiction,
        }
    }

    // US

    pub fn verify_payroll(&self, entry: &PayrollEntry) -> Result<GuardResult, VerifierError> {
        Ok(self.us("verify_payroll")?.payroll.verify_gross_to_net(entry))
    }

    pub fn verify_worker_classification(
        &self,
        claimed_type: &str,
        facts: &WorkerFacts,
    ) -> Result<GuardResult, VerifierError> {
        Ok(self
            .us("verify_worker_classification")?
            .classification
            .verify_classification_claim(claimed_type, facts))
    }

    pub fn check_nexus(
        &self,
        state: &str,
        sales_amount: f64,
        transactions: u64,
        tax_decision: &str,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.us("check_nexus")?;
        Ok(guards
            .nexus
            .check_nexus_liability(state, from_f64(sales_amount)?, transactions, tax_decision))
    }

    // INDIA

    pub fn verify_crypto_set_off(
        &self,
        losses: f64,
        gains: f64,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_crypto_set_off")?;
        Ok(guards.crypto.verify_set_off(from_f64(losses)?, from_f64(gains)?))
    }

    pub fn determine_holding_term(
        &self,
        purchase_date: &str,
        sale_date: &str,
        asset_type: &str,
    ) -> Result<HoldingTerm, VerifierError> {
        Ok(self
            .india("determine_holding_term")?
            .capital_gains
            .determine_term(purchase_date, sale_date, asset_type))
    }

    pub fn verify_capital_gains(
        &self,
        asset_type: &str,
        purchase_date: &str,
        sale_date: &str,
        claimed_rate: Option<&str>,
    ) -> Result<GuardResult, VerifierError> {
        Ok(self
            .india("verify_capital_gains")?
            .capital_gains
            .verify_claim(asset_type, purchase_date, sale_date, claimed_rate))
    }

    /// Withholding on a vendor payment; with a claim, verify it.
    pub fn verify_tds(
        &self,
        service_type: &str,
        invoice_amount: f64,
        ytd_payment: f64,
        claimed_deduction: Option<f64>,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_tds")?;
        let invoice = from_f64(invoice_amount)?;
        let ytd = from_f64(ytd_payment)?;
        Ok(match claimed_deduction {
            Some(claimed) => guards
                .withholding
                .verify_deduction(service_type, invoice, ytd, from_f64(claimed)?),
            None => guards.withholding.calculate_deduction(service_type, invoice, ytd),
        })
    }

    pub fn verify_itc(
        &self,
        expense_category: &str,
        amount: f64,
        tax_paid: f64,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_itc")?;
        Ok(guards
            .input_credit
            .verify_itc_eligibility(expense_category, from_f64(amount)?, from_f64(tax_paid)?))
    }

    /// GSTIN format and check character.
    pub fn verify_gstin(&self, gstin: &str) -> Result<GuardResult, VerifierError> {
        Ok(self.india("verify_gstin")?.input_credit.verify_gstin_checksum(gstin))
    }

    pub fn verify_deposit(
        &self,
        principal: f64,
        rate_percent: f64,
        years: u32,
        compounding_per_year: u32,
        claimed_maturity: f64,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_deposit")?;
        Ok(guards.deposit.verify_fd_rate(
            from_f64(principal)?,
            from_f64(rate_percent)?,
            years,
            compounding_per_year,
            from_f64(claimed_maturity)?,
        ))
    }

    pub fn verify_trader_set_off(
        &self,
        loss_source: &str,
        loss_amount: f64,
        profit_source: &str,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_trader_set_off")?;
        Ok(guards
            .set_off
            .verify_setoff(loss_source, from_f64(loss_amount)?, profit_source))
    }

    pub fn verify_remittance(
        &self,
        amount_usd: f64,
        purpose: &str,
        fy_usage: f64,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_remittance")?;
        Ok(guards
            .remittance
            .verify_lrs_limit(from_f64(amount_usd)?, purpose, from_f64(fy_usage)?))
    }

    pub fn calculate_tcs(
        &self,
        amount_inr: f64,
        purpose: &str,
        is_loan_funded: bool,
    ) -> Result<Decimal, VerifierError> {
        let guards = self.india("calculate_tcs")?;
        let tcs = guards
            .remittance
            .calculate_tcs(from_f64(amount_inr)?, purpose, is_loan_funded)?;
        Ok(tcs)
    }

    /// Arm's length check; `tolerance_percent` defaults to the rule book's.
    pub fn verify_transfer_pricing(
        &self,
        transaction_price: f64,
        benchmark_price: f64,
        method: PricingMethod,
        tolerance_percent: Option<f64>,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_transfer_pricing")?;
        let tolerance = tolerance_percent.map(from_f64).transpose()?;
        Ok(guards.transfer_pricing.verify_arms_length_price(
            from_f64(transaction_price)?,
            from_f64(benchmark_price)?,
            method,
            tolerance,
        ))
    }

    pub fn verify_foreign_tax_credit(
        &self,
        foreign_income: f64,
        foreign_tax_paid: f64,
        home_tax_rate_percent: f64,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_foreign_tax_credit")?;
        Ok(guards.foreign_tax_credit.verify_foreign_tax_credit(
            from_f64(foreign_income)?,
            from_f64(foreign_tax_paid)?,
            from_f64(home_tax_rate_percent)?,
        ))
    }

    pub fn determine_residency(&self, facts: &CompanyFacts) -> Result<GuardResult, VerifierError> {
        Ok(self.india("determine_residency")?.residency.determine_residency(facts))
    }

    pub fn verify_related_party_loan(
        &self,
        lender_type: &str,
        borrower_role: &str,
        interest_rate: f64,
        market_rate: f64,
    ) -> Result<GuardResult, VerifierError> {
        let guards = self.india("verify_related_party_loan")?;
        Ok(guards.related_party.verify_loan_compliance(
            lender_type,
            borrower_role,
            from_f64(interest_rate)?,
            from_f64(market_rate)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DecimalError;

    #[test]
    fn test_unsupported_jurisdiction_fails_fast() {
        let err = TaxVerifier::new("Atlantis").unwrap_err();
        assert_eq!(err, VerifierError::UnsupportedJurisdiction("Atlantis".to_string()));
    }

    #[test]
    fn test_wrong_jurisdiction_is_error() {
        let us = TaxVerifier::new("us").unwrap();
        let err = us.verify_crypto_set_off(100.0, 200.0).unwrap_err();
        assert_eq!(
            err,
            VerifierError::WrongJurisdiction {
                operation: "verify_crypto_set_off",
                required: Jurisdiction::India,
                bound: Jurisdiction::Us,
            }
        );

        let india = TaxVerifier::new("INDIA").unwrap();
        assert!(matches!(
            india.check_nexus("NY", 1.0, 0, "no_tax"),
            Err(VerifierError::WrongJurisdiction { required: Jurisdiction::Us, .. })
        ));
    }

    #[test]
    fn test_non_finite_argument() {
        let india = TaxVerifier::new("india").unwrap();
        let err = india.verify_remittance(f64::NAN, "travel", 0.0).unwrap_err();
        assert!(matches!(err, VerifierError::InvalidNumber(DecimalError::NonFinite(_))));
    }

    #[test]
    fn test_both_jurisdictions_audit() {
        let intent = Intent::new().with("loss_head", "intraday").with("offset_head", "fno");
        for j in ["US", "INDIA"] {
            let verifier = TaxVerifier::new(j).unwrap();
            assert!(!verifier.audit(&intent).allowed());
        }
    }

    #[test]
    fn test_tds_with_and_without_claim() {
        let india = TaxVerifier::new("INDIA").unwrap();
        let computed = india.verify_tds("professional fees", 10000.0, 25000.0, None).unwrap();
        assert!(computed.verified);

        let claimed = india
            .verify_tds("professional fees", 10000.0, 25000.0, Some(0.0))
            .unwrap();
        assert!(!claimed.verified);
    }

    #[test]
    fn test_tcs_through_facade() {
        let india = TaxVerifier::new("INDIA").unwrap();
        let tcs = india.calculate_tcs(1_700_000.0, "education", true).unwrap();
        assert_eq!(tcs, Decimal::new(5000, 0));
    }

    #[test]
    fn test_long_deposit_at_zero_rate() {
        let india = TaxVerifier::new("INDIA").unwrap();
        let result = india
            .verify_deposit(1000.0, 0.0, 10_000_000, 12, 1000.0)
            .unwrap();
        assert!(result.verified);
    }
}
