use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the guard that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardId {
    Payroll,
    WorkerClassification,
    EconomicNexus,
    SpeculativeSetOff,
    CapitalGains,
    Withholding,
    TransferPricing,
    ForeignTaxCredit,
    Residency,
    InputCredit,
    Remittance,
    RelatedParty,
    Valuation,
    CryptoSetOff,
    DepositRate,
}

impl GuardId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardId::Payroll => "PAYROLL",
            GuardId::WorkerClassification => "WORKER_CLASSIFICATION",
            GuardId::EconomicNexus => "ECONOMIC_NEXUS",
            GuardId::SpeculativeSetOff => "SPECULATIVE_SET_OFF",
            GuardId::CapitalGains => "CAPITAL_GAINS",
            GuardId::Withholding => "WITHHOLDING",
            GuardId::TransferPricing => "TRANSFER_PRICING",
            GuardId::ForeignTaxCredit => "FOREIGN_TAX_CREDIT",
            GuardId::Residency => "RESIDENCY",
            GuardId::InputCredit => "INPUT_CREDIT",
            GuardId::Remittance => "REMITTANCE",
            GuardId::RelatedParty => "RELATED_PARTY",
            GuardId::Valuation => "VALUATION",
            GuardId::CryptoSetOff => "CRYPTO_SET_OFF",
            GuardId::DepositRate => "DEPOSIT_RATE",
        }
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tax residency classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Residency {
    Resident,
    NonResident,
}

impl fmt::Display for Residency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Residency::Resident => write!(f, "RESIDENT"),
            Residency::NonResident => write!(f, "NON_RESIDENT"),
        }
    }
}

/// Compliance risk flagged alongside a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCode {
    TransferPricingAdjustment,
    Section185Violation,
    Section186Violation,
}

/// Guard-specific numeric output carried next to the verdict.
///
/// Currency and percentage figures are always exact decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    None,
    Payroll {
        recalculated_net_pay: Decimal,
        discrepancy: Decimal,
        total_taxes: Decimal,
        total_deductions: Decimal,
    },
    Withholding {
        deduction: Decimal,
        net_payable: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        section: Option<String>,
    },
    ArmsLength {
        lower_bound: Decimal,
        upper_bound: Decimal,
        potential_adjustment: Decimal,
    },
    ForeignTaxCredit {
        home_tax_payable: Decimal,
        allowable_credit: Decimal,
        excess_tax_lapsed: Decimal,
        capped: bool,
    },
    Residency {
        residency: Residency,
        is_aboi: bool,
        assets_outside_ratio: Decimal,
        employees_outside_ratio: Decimal,
        payroll_outside_ratio: Decimal,
    },
    InputCredit {
        eligible_itc: Decimal,
    },
    Remittance {
        remaining_limit: Decimal,
    },
    Conversion {
        conversion_price: Decimal,
        shares: Decimal,
    },
    CryptoGains {
        taxable_gain: Decimal,
        tax_payable: Decimal,
        disallowed_loss: Decimal,
    },
    Deposit {
        maturity_amount: Decimal,
        interest: Decimal,
    },
}

impl Default for Payload {
    fn default() -> Self {
        Payload::None
    }
}

/// Uniform verdict returned by every guard operation.
///
/// A failing result always carries a non-empty message that states the
/// authoritative value and, when one was supplied, the claimed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardResult {
    /// Guard that produced the verdict
    pub guard: GuardId,

    /// Whether the claim matches (or is not contradicted by) the recomputation
    pub verified: bool,

    /// Human-readable explanation
    pub message: String,

    /// Remediation hint for failures that have one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,

    /// Compliance risk category, when the guard assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskCode>,

    /// Set when the input could not be interpreted
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub malformed_input: bool,

    #[serde(flatten)]
    pub payload: Payload,
}

impl GuardResult {
    /// Create a passing result.
    pub fn pass(guard: GuardId, message: impl Into<String>) -> Self {
        GuardResult {
            guard,
            verified: true,
            message: message.into(),
            fix: None,
            risk: None,
            malformed_input: false,
            payload: Payload::None,
        }
    }

    /// Create a failing result.
    pub fn fail(guard: GuardId, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            format!("{} verification failed", guard)
        } else {
            message
        };
        GuardResult {
            guard,
            verified: false,
            message,
            fix: None,
            risk: None,
            malformed_input: false,
            payload: Payload::None,
        }
    }

    /// Create a failing result for input the guard cannot interpret.
    pub fn malformed(guard: GuardId, message: impl Into<String>) -> Self {
        GuardResult {
            malformed_input: true,
            ..GuardResult::fail(guard, message)
        }
    }

    /// Create a malformed result for inputs whose arithmetic leaves the
    /// decimal range.
    pub fn overflow(guard: GuardId, inputs: impl fmt::Display) -> Self {
        GuardResult::malformed(
            guard,
            format!("Arithmetic overflow: {} exceed the decimal range.", inputs),
        )
    }

    /// Mark the input as uninterpretable without changing the verdict.
    pub fn flag_malformed(mut self) -> Self {
        self.malformed_input = true;
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    pub fn with_risk(mut self, risk: RiskCode) -> Self {
        self.risk = Some(risk);
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Explanation recorded in an audit report when this result blocks.
    pub fn block_message(&self) -> String {
        match &self.fix {
            Some(fix) if !fix.is_empty() => format!("{} {}", self.message, fix),
            _ => self.message.clone(),
        }
    }
}
