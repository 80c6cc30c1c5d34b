use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::decimal;
use crate::domain::rulebook::{CapitalGainsTable, StatutoryRate, TermRates};
use crate::domain::{GuardId, GuardResult};

/// Calendar date format accepted for purchase and sale dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Holding-period classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldingTerm {
    #[serde(rename = "STCG")]
    ShortTerm,
    #[serde(rename = "LTCG")]
    LongTerm,
    /// One of the dates was not `YYYY-MM-DD`
    #[serde(rename = "ERROR_DATE_FORMAT")]
    DateFormatError,
}

impl HoldingTerm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingTerm::ShortTerm => "STCG",
            HoldingTerm::LongTerm => "LTCG",
            HoldingTerm::DateFormatError => "ERROR_DATE_FORMAT",
        }
    }
}

impl fmt::Display for HoldingTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capital gains holding-period and rate verification.
#[derive(Debug, Clone)]
pub struct CapitalGainsGuard {
    default_days: i64,
    /// Lowercased asset type -> days
    holding_days: HashMap<String, i64>,
    /// Lowercased asset type -> rates
    rates: HashMap<String, TermRates>,
}

impl CapitalGainsGuard {
    pub fn new(table: &CapitalGainsTable) -> Self {
        CapitalGainsGuard {
            default_days: table.default_holding_days,
            holding_days: table
                .holding_days
                .iter()
                .map(|(k, v)| (k.to_lowercase(), *v))
                .collect(),
            rates: table
                .rates
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone()))
                .collect(),
        }
    }

    fn threshold_days(&self, asset_type: &str) -> i64 {
        self.holding_days
            .get(&asset_type.to_lowercase())
            .copied()
            .unwrap_or(self.default_days)
    }

    /// Classify a holding as short- or long-term.
    ///
    /// Long-term iff the whole-day gap strictly exceeds the asset's
    /// threshold. Never fails: malformed dates yield
    /// [`HoldingTerm::DateFormatError`].
    pub fn determine_term(
        &self,
        purchase_date: &str,
        sale_date: &str,
        asset_type: &str,
    ) -> HoldingTerm {
        let (bought, sold) = match (
            NaiveDate::parse_from_str(purchase_date.trim(), DATE_FORMAT),
            NaiveDate::parse_from_str(sale_date.trim(), DATE_FORMAT),
        ) {
            (Ok(b), Ok(s)) => (b, s),
            _ => return HoldingTerm::DateFormatError,
        };

        let days = (sold - bought).num_days();
        if days > self.threshold_days(asset_type) {
            HoldingTerm::LongTerm
        } else {
            HoldingTerm::ShortTerm
        }
    }

    /// Verify a claimed rate (e.g. `"12.5%"`) against the statutory table.
    pub fn verify_tax_rate(
        &self,
        asset_type: &str,
        term: HoldingTerm,
        claimed_rate: &str,
    ) -> GuardResult {
        let key = format!("{}_{}", asset_type.to_lowercase(), term);

        // Unclassifiable holdings have no statutory rate to contradict the claim.
        if term == HoldingTerm::DateFormatError {
            return GuardResult::pass(
                GuardId::CapitalGains,
                format!(
                    "No hard constraint for {}: rate {} unverified, dates must be YYYY-MM-DD.",
                    key, claimed_rate
                ),
            )
            .flag_malformed();
        }

        let expected = match self.statutory_rate(asset_type, term) {
            Some(rate) => rate,
            None => {
                return GuardResult::pass(
                    GuardId::CapitalGains,
                    format!("No hard constraint for {}", key),
                )
            }
        };

        let statutory = match expected {
            StatutoryRate::Slab => {
                return GuardResult::pass(GuardId::CapitalGains, "Subject to slab rates")
            }
            StatutoryRate::Fixed(value) => value,
        };

        match decimal::parse_rate(claimed_rate) {
            Ok(claimed) if claimed == statutory => GuardResult::pass(
                GuardId::CapitalGains,
                format!("{} rate {}% verified.", key, statutory),
            ),
            _ => GuardResult::fail(
                GuardId::CapitalGains,
                format!(
                    "Rate mismatch for {}: statutory rate is {}%, claimed {}.",
                    key, statutory, claimed_rate
                ),
            ),
        }
    }

    /// Classify the holding and, when a rate is claimed, verify it.
    pub fn verify_claim(
        &self,
        asset_type: &str,
        purchase_date: &str,
        sale_date: &str,
        claimed_rate: Option<&str>,
    ) -> GuardResult {
        let term = self.determine_term(purchase_date, sale_date, asset_type);
        match claimed_rate {
            Some(rate) => self.verify_tax_rate(asset_type, term, rate),
            None => GuardResult::pass(
                GuardId::CapitalGains,
                format!("Holding classified as {}; no rate claimed.", term),
            ),
        }
    }

    /// Statutory rate for an asset type and term, if the table has one.
    pub fn statutory_rate(&self, asset_type: &str, term: HoldingTerm) -> Option<StatutoryRate> {
        let rates = self.rates.get(&asset_type.to_lowercase())?;
        match term {
            HoldingTerm::LongTerm => rates.long_term,
            HoldingTerm::ShortTerm => rates.short_term,
            HoldingTerm::DateFormatError => None,
        }
    }
}

impl Default for CapitalGainsGuard {
    fn default() -> Self {
        CapitalGainsGuard::new(&CapitalGainsTable::default())
    }
}
