use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::audit::AuditPipeline;
use crate::domain::rulebook::{StatutoryRate, TermRates};
use crate::domain::RuleBook;

/// Errors that can occur during rule book loading.
#[derive(Error, Debug)]
pub enum RuleBookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a rule book from a YAML file. Sections the file omits keep their
/// built-in values.
pub fn load_rulebook(path: impl AsRef<Path>) -> Result<RuleBook, RuleBookError> {
    let content = fs::read_to_string(path)?;
    parse_rulebook(&content)
}

/// Parse and validate a rule book from YAML text.
pub fn parse_rulebook(content: &str) -> Result<RuleBook, RuleBookError> {
    let book: RuleBook = serde_yaml::from_str(content)?;

    validate_rulebook(&book)?;

    Ok(book)
}

fn invalid(msg: impl Into<String>) -> RuleBookError {
    RuleBookError::Validation(msg.into())
}

fn check_fraction(name: &str, value: Decimal) -> Result<(), RuleBookError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(invalid(format!("{} must be within [0, 1], got {}", name, value)));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: Decimal) -> Result<(), RuleBookError> {
    if value < Decimal::ZERO {
        return Err(invalid(format!("{} cannot be negative, got {}", name, value)));
    }
    Ok(())
}

fn check_labels(name: &str, labels: &[String]) -> Result<(), RuleBookError> {
    if labels.iter().any(|l| l.trim().is_empty()) {
        return Err(invalid(format!("{} contains an empty label", name)));
    }
    Ok(())
}

fn check_term_rates(asset: &str, rates: &TermRates) -> Result<(), RuleBookError> {
    for rate in [rates.long_term, rates.short_term].into_iter().flatten() {
        if let StatutoryRate::Fixed(value) = rate {
            if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                return Err(invalid(format!(
                    "capital gains rate for {} must be a percentage within [0, 100], got {}",
                    asset, value
                )));
            }
        }
    }
    Ok(())
}

/// Validate rule book contents.
pub fn validate_rulebook(book: &RuleBook) -> Result<(), RuleBookError> {
    if book.version.trim().is_empty() {
        return Err(invalid("Rule book version cannot be empty"));
    }

    for (asset, days) in &book.capital_gains.holding_days {
        if *days < 0 {
            return Err(invalid(format!("holding days for {} cannot be negative", asset)));
        }
    }
    if book.capital_gains.default_holding_days < 0 {
        return Err(invalid("default holding days cannot be negative"));
    }
    for (asset, rates) in &book.capital_gains.rates {
        check_term_rates(asset, rates)?;
    }

    for (category, rule) in &book.withholding {
        check_non_negative(&format!("withholding threshold for {}", category), rule.threshold)?;
        check_fraction(&format!("withholding rate for {}", category), rule.rate)?;
    }

    let tolerance = book.transfer_pricing.default_tolerance_percent;
    if tolerance < Decimal::ZERO || tolerance >= Decimal::ONE_HUNDRED {
        return Err(invalid(format!(
            "transfer pricing tolerance must be within [0, 100), got {}",
            tolerance
        )));
    }

    let aboi = book.residency.aboi_threshold;
    if aboi <= Decimal::ZERO || aboi > Decimal::ONE {
        return Err(invalid(format!("ABOI threshold must be within (0, 1], got {}", aboi)));
    }

    check_labels("input credit blocked categories", &book.input_credit.blocked_categories)?;
    check_labels("prohibited remittance purposes", &book.remittance.prohibited_purposes)?;
    check_labels("prohibited borrower roles", &book.related_party.prohibited_roles)?;

    check_non_negative("LRS annual limit", book.remittance.annual_limit_usd)?;
    let tcs = &book.remittance.tcs;
    check_non_negative("TCS exemption threshold", tcs.exemption_threshold_inr)?;
    check_fraction("TCS education loan rate", tcs.education_loan_rate)?;
    check_fraction("TCS education rate", tcs.education_rate)?;
    check_fraction("TCS medical rate", tcs.medical_rate)?;
    check_fraction("TCS default rate", tcs.default_rate)?;

    if book.set_off.speculative_marker.trim().is_empty() {
        return Err(invalid("speculative marker cannot be empty"));
    }

    for (state, threshold) in &book.nexus {
        check_non_negative(&format!("nexus amount for {}", state), threshold.amount)?;
    }

    let vda = book.crypto.flat_rate_percent;
    if vda < Decimal::ZERO || vda > Decimal::ONE_HUNDRED {
        return Err(invalid(format!("VDA rate must be within [0, 100], got {}", vda)));
    }

    Ok(())
}

/// Loads a rule book from an optional path and builds the audit pipeline.
///
/// Without a path the built-in rule book is used.
#[derive(Debug, Clone, Default)]
pub struct RuleBookLoader {
    path: Option<PathBuf>,
}

impl RuleBookLoader {
    pub fn new(path: Option<PathBuf>) -> Self {
        RuleBookLoader { path }
    }

    /// Load the rule book.
    pub fn load_rulebook(&self) -> Result<RuleBook, RuleBookError> {
        let book = match &self.path {
            Some(path) => load_rulebook(path)?,
            None => RuleBook::default(),
        };
        info!(
            version = %book.version,
            source = %self
                .path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string()),
            "Rule book loaded"
        );
        Ok(book)
    }

    /// Load the rule book and build a pipeline from it.
    pub fn load(&self) -> Result<(RuleBook, AuditPipeline), RuleBookError> {
        let book = self.load_rulebook()?;
        let pipeline = AuditPipeline::new(&book);
        Ok((book, pipeline))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
