use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Eur => write!(f, "EUR"),
            Currency::Gbp => write!(f, "GBP"),
        }
    }
}

/// Whether a deduction is taken before or after tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionType {
    /// 401k, health insurance
    PreTax,
    /// Roth 401k, garnishments
    PostTax,
}

/// One tax line (e.g. "Federal Income Tax", "Social Security").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxEntry {
    pub name: String,
    pub amount: Decimal,
}

impl TaxEntry {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        TaxEntry {
            name: name.into(),
            amount,
        }
    }
}

/// One deduction line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionEntry {
    pub name: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: DeductionType,
}

impl DeductionEntry {
    pub fn new(name: impl Into<String>, amount: Decimal, kind: DeductionType) -> Self {
        DeductionEntry {
            name: name.into(),
            amount,
            kind,
        }
    }
}

/// Payroll record whose claimed net pay is to be verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollEntry {
    pub employee_id: String,
    pub gross_pay: Decimal,
    #[serde(default)]
    pub taxes: Vec<TaxEntry>,
    #[serde(default)]
    pub deductions: Vec<DeductionEntry>,
    /// Net pay computed upstream
    pub net_pay_claimed: Decimal,
    #[serde(default)]
    pub currency: Currency,
}

impl PayrollEntry {
    /// Sum of tax lines, `None` if it overflows.
    pub fn total_taxes(&self) -> Option<Decimal> {
        self.taxes
            .iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.amount))
    }

    /// Sum of deduction lines, `None` if it overflows.
    pub fn total_deductions(&self) -> Option<Decimal> {
        self.deductions
            .iter()
            .try_fold(Decimal::ZERO, |acc, d| acc.checked_add(d.amount))
    }
}
