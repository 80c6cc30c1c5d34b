use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::decimal;

/// Immutable snapshot of every statutory table the guards consult.
///
/// `RuleBook::default()` is the built-in snapshot. A YAML rule book may
/// override any subset of sections; missing sections fall back to the
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleBook {
    /// Rule book version identifier
    #[serde(rename = "rulebook_version")]
    pub version: String,
    pub capital_gains: CapitalGainsTable,
    pub withholding: HashMap<String, WithholdingRule>,
    pub transfer_pricing: TransferPricingTable,
    pub residency: ResidencyTable,
    pub input_credit: InputCreditTable,
    pub remittance: RemittanceTable,
    pub related_party: RelatedPartyTable,
    pub set_off: SetOffTable,
    pub nexus: HashMap<String, NexusThreshold>,
    pub crypto: CryptoTable,
}

impl Default for RuleBook {
    fn default() -> Self {
        RuleBook {
            version: "FY2024-25".to_string(),
            capital_gains: CapitalGainsTable::default(),
            withholding: default_withholding(),
            transfer_pricing: TransferPricingTable::default(),
            residency: ResidencyTable::default(),
            input_credit: InputCreditTable::default(),
            remittance: RemittanceTable::default(),
            related_party: RelatedPartyTable::default(),
            set_off: SetOffTable::default(),
            nexus: default_nexus(),
            crypto: CryptoTable::default(),
        }
    }
}

/// Statutory rate: either a fixed percentage or slab-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRate", into = "String")]
pub enum StatutoryRate {
    /// Fixed percentage, e.g. `12.5`
    Fixed(Decimal),
    /// Taxed at the individual's slab rate; no single authoritative value
    Slab,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRate {
    Text(String),
    Number(Decimal),
}

impl TryFrom<RawRate> for StatutoryRate {
    type Error = String;

    fn try_from(raw: RawRate) -> Result<Self, Self::Error> {
        match raw {
            RawRate::Number(value) => Ok(StatutoryRate::Fixed(value)),
            RawRate::Text(text) if text.trim().eq_ignore_ascii_case("SLAB") => {
                Ok(StatutoryRate::Slab)
            }
            RawRate::Text(text) => decimal::parse_rate(&text)
                .map(StatutoryRate::Fixed)
                .map_err(|e| e.to_string()),
        }
    }
}

impl From<StatutoryRate> for String {
    fn from(rate: StatutoryRate) -> Self {
        rate.to_string()
    }
}

impl fmt::Display for StatutoryRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatutoryRate::Fixed(value) => write!(f, "{}", value),
            StatutoryRate::Slab => write!(f, "SLAB"),
        }
    }
}

/// Rates for one asset class, by holding term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermRates {
    #[serde(rename = "LTCG", default, skip_serializing_if = "Option::is_none")]
    pub long_term: Option<StatutoryRate>,
    #[serde(rename = "STCG", default, skip_serializing_if = "Option::is_none")]
    pub short_term: Option<StatutoryRate>,
}

/// Holding-period thresholds and capital gains rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalGainsTable {
    /// Threshold used for asset types absent from `holding_days`
    pub default_holding_days: i64,
    /// Days an asset must be held (strictly more than) to be long-term
    pub holding_days: HashMap<String, i64>,
    pub rates: HashMap<String, TermRates>,
}

impl Default for CapitalGainsTable {
    fn default() -> Self {
        let holding_days = HashMap::from([
            ("equity".to_string(), 365),
            ("real_estate".to_string(), 730),
            ("debt_fund".to_string(), 0),
            ("debt".to_string(), 1095),
        ]);
        let rates = HashMap::from([
            (
                "equity".to_string(),
                TermRates {
                    long_term: Some(StatutoryRate::Fixed(Decimal::new(125, 1))),
                    short_term: Some(StatutoryRate::Fixed(Decimal::new(20, 0))),
                },
            ),
            (
                "debt".to_string(),
                TermRates {
                    long_term: Some(StatutoryRate::Slab),
                    short_term: Some(StatutoryRate::Slab),
                },
            ),
        ]);
        CapitalGainsTable {
            default_holding_days: 1095,
            holding_days,
            rates,
        }
    }
}

/// Withholding (TDS) threshold and rate for one payment category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithholdingRule {
    /// Cumulative exposure above which tax is withheld
    pub threshold: Decimal,
    /// Rate as a fraction, e.g. `0.10`
    pub rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

fn default_withholding() -> HashMap<String, WithholdingRule> {
    let rule = |threshold: i64, rate: Decimal, section: &str| WithholdingRule {
        threshold: Decimal::new(threshold, 0),
        rate,
        section: Some(section.to_string()),
    };
    HashMap::from([
        (
            "PROFESSIONAL_FEES".to_string(),
            rule(30000, Decimal::new(10, 2), "194J"),
        ),
        (
            "CONTRACTOR_INDIVIDUAL".to_string(),
            rule(30000, Decimal::new(1, 2), "194C"),
        ),
        (
            "CONTRACTOR_FIRM".to_string(),
            rule(30000, Decimal::new(2, 2), "194C"),
        ),
        (
            "COMMISSION".to_string(),
            rule(15000, Decimal::new(5, 2), "194H"),
        ),
        (
            "RENT_LAND".to_string(),
            rule(240000, Decimal::new(10, 2), "194I"),
        ),
    ])
}

/// Arm's length safe-harbour settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferPricingTable {
    /// Tolerance applied when the caller does not supply one, in percent
    pub default_tolerance_percent: Decimal,
}

impl Default for TransferPricingTable {
    fn default() -> Self {
        TransferPricingTable {
            default_tolerance_percent: Decimal::new(3, 0),
        }
    }
}

/// Place-of-effective-management settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidencyTable {
    /// Minimum outside-jurisdiction share for each ABOI ratio
    pub aboi_threshold: Decimal,
    /// Location label that establishes PoEM at home
    pub home_country: String,
}

impl Default for ResidencyTable {
    fn default() -> Self {
        ResidencyTable {
            aboi_threshold: Decimal::new(50, 2),
            home_country: "INDIA".to_string(),
        }
    }
}

/// Input tax credit blocklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputCreditTable {
    pub blocked_categories: Vec<String>,
    /// Label marking personal consumption
    pub personal_marker: String,
}

impl Default for InputCreditTable {
    fn default() -> Self {
        InputCreditTable {
            blocked_categories: [
                "FOOD_AND_BEVERAGE",
                "CATERING",
                "RESTAURANT_SERVICE",
                "CLUB_MEMBERSHIP",
                "HEALTH_INSURANCE",
                "MOTOR_VEHICLE",
                "GIFT_TO_EMPLOYEE",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            personal_marker: "PERSONAL".to_string(),
        }
    }
}

/// Liberalised remittance limits and TCS rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemittanceTable {
    pub annual_limit_usd: Decimal,
    pub prohibited_purposes: Vec<String>,
    pub tcs: TcsTable,
}

impl Default for RemittanceTable {
    fn default() -> Self {
        RemittanceTable {
            annual_limit_usd: Decimal::new(250000, 0),
            prohibited_purposes: [
                "GAMBLING",
                "LOTTERY",
                "RACING",
                "BANNED_MAGAZINES",
                "SWEEPSTAKES",
                "MARGIN_TRADING",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            tcs: TcsTable::default(),
        }
    }
}

/// Tax collected at source on outward remittances (rates as fractions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcsTable {
    pub exemption_threshold_inr: Decimal,
    pub education_loan_rate: Decimal,
    pub education_rate: Decimal,
    pub medical_rate: Decimal,
    pub default_rate: Decimal,
}

impl Default for TcsTable {
    fn default() -> Self {
        TcsTable {
            exemption_threshold_inr: Decimal::new(700000, 0),
            education_loan_rate: Decimal::new(5, 3),
            education_rate: Decimal::new(5, 2),
            medical_rate: Decimal::new(5, 2),
            default_rate: Decimal::new(20, 2),
        }
    }
}

/// Borrower roles to whom company loans are prohibited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedPartyTable {
    pub prohibited_roles: Vec<String>,
}

impl Default for RelatedPartyTable {
    fn default() -> Self {
        RelatedPartyTable {
            prohibited_roles: [
                "DIRECTOR",
                "DIRECTOR_RELATIVE",
                "PARTNER",
                "PARTNER_OF_DIRECTOR",
                "HOLDING_COMPANY_DIRECTOR",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Trading set-off settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetOffTable {
    /// Label fragment identifying speculative income heads
    pub speculative_marker: String,
    /// Years a speculative loss may be carried forward
    pub carry_forward_years: u32,
}

impl Default for SetOffTable {
    fn default() -> Self {
        SetOffTable {
            speculative_marker: "intraday".to_string(),
            carry_forward_years: 4,
        }
    }
}

/// Economic nexus thresholds for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NexusThreshold {
    /// Sales amount at or above which nexus is established
    pub amount: Decimal,
    /// Transaction count at or above which nexus is established, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<u64>,
}

fn default_nexus() -> HashMap<String, NexusThreshold> {
    let threshold = |amount: i64, transactions: Option<u64>| NexusThreshold {
        amount: Decimal::new(amount, 0),
        transactions,
    };
    HashMap::from([
        ("NY".to_string(), threshold(500000, Some(100))),
        ("CA".to_string(), threshold(500000, None)),
        ("TX".to_string(), threshold(500000, None)),
        ("FL".to_string(), threshold(100000, None)),
    ])
}

/// Virtual digital asset taxation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoTable {
    /// Flat rate on VDA gains, in percent
    pub flat_rate_percent: Decimal,
}

impl Default for CryptoTable {
    fn default() -> Self {
        CryptoTable {
            flat_rate_percent: Decimal::new(30, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rulebook_partial_override() {
        let yaml = r#"
rulebook_version: "test-1"
capital_gains:
  holding_days:
    equity: 400
  rates:
    equity:
      LTCG: "10%"
      STCG: 15
    debt:
      LTCG: SLAB
withholding:
  COMMISSION:
    threshold: 20000
    rate: "0.05"
"#;

        let book: RuleBook = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(book.version, "test-1");
        assert_eq!(book.capital_gains.holding_days.get("equity"), Some(&400));
        assert_eq!(book.capital_gains.default_holding_days, 1095);
        assert_eq!(
            book.capital_gains.rates["equity"].long_term,
            Some(StatutoryRate::Fixed(Decimal::new(10, 0)))
        );
        assert_eq!(
            book.capital_gains.rates["equity"].short_term,
            Some(StatutoryRate::Fixed(Decimal::new(15, 0)))
        );
        assert_eq!(book.capital_gains.rates["debt"].long_term, Some(StatutoryRate::Slab));
        assert_eq!(book.capital_gains.rates["debt"].short_term, None);
        assert_eq!(book.withholding.len(), 1);
        // Untouched sections keep the built-in snapshot
        assert_eq!(book.remittance.annual_limit_usd, Decimal::new(250000, 0));
        assert_eq!(book.nexus.len(), 4);
    }

    #[test]
    fn test_default_snapshot() {
        let book = RuleBook::default();

        assert_eq!(book.withholding["COMMISSION"].rate, Decimal::new(5, 2));
        assert_eq!(book.nexus["NY"].transactions, Some(100));
        assert_eq!(book.nexus["CA"].transactions, None);
        assert_eq!(book.residency.aboi_threshold, Decimal::new(5, 1));
    }

    #[test]
    fn test_statutory_rate_serialization() {
        let json = serde_json::to_string(&StatutoryRate::Slab).unwrap();
        assert_eq!(json, "\"SLAB\"");

        let parsed: StatutoryRate = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(parsed, StatutoryRate::Fixed(Decimal::new(125, 1)));

        assert!(serde_json::from_str::<StatutoryRate>("\"abc\"").is_err());
    }
}
