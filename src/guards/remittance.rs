use rust_decimal::Decimal;

use crate::domain::decimal::DecimalError;
use crate::domain::rulebook::{RemittanceTable, TcsTable};
use crate::domain::{GuardId, GuardResult, Payload};

/// Outward remittance checks: the liberalised remittance scheme (LRS)
/// annual limit, prohibited purposes, and tax collected at source (TCS).
#[derive(Debug, Clone)]
pub struct RemittanceGuard {
    annual_limit_usd: Decimal,
    prohibited_purposes: Vec<String>,
    tcs: TcsTable,
}

impl RemittanceGuard {
    pub fn new(table: &RemittanceTable) -> Self {
        RemittanceGuard {
            annual_limit_usd: table.annual_limit_usd,
            prohibited_purposes: table
                .prohibited_purposes
                .iter()
                .map(|p| p.trim().to_uppercase())
                .collect(),
            tcs: table.tcs.clone(),
        }
    }

    /// Check a remittance against prohibited purposes and the annual limit.
    pub fn verify_lrs_limit(
        &self,
        amount_usd: Decimal,
        purpose: &str,
        fy_usage: Decimal,
    ) -> GuardResult {
        let purpose_upper = purpose.to_uppercase();
        if self
            .prohibited_purposes
            .iter()
            .any(|p| purpose_upper.contains(p.as_str()))
        {
            return GuardResult::fail(
                GuardId::Remittance,
                format!(
                    "BLOCKED: Remittance for '{}' is strictly prohibited under FEMA Schedule I.",
                    purpose
                ),
            );
        }

        let overflow = || {
            GuardResult::overflow(
                GuardId::Remittance,
                format!("usage ${} and amount ${}", fy_usage, amount_usd),
            )
        };
        let (remaining, total) = match self
            .annual_limit_usd
            .checked_sub(fy_usage)
            .zip(fy_usage.checked_add(amount_usd))
        {
            Some(totals) => totals,
            None => return overflow(),
        };

        if total > self.annual_limit_usd {
            return GuardResult::fail(
                GuardId::Remittance,
                format!(
                    "BLOCKED: Transaction of ${} exceeds LRS limit (${}). Remaining: ${}",
                    amount_usd, self.annual_limit_usd, remaining
                ),
            )
            .with_payload(Payload::Remittance {
                remaining_limit: remaining,
            });
        }

        let headroom = match remaining.checked_sub(amount_usd) {
            Some(headroom) => headroom,
            None => return overflow(),
        };
        GuardResult::pass(
            GuardId::Remittance,
            format!("Remittance of ${} within LRS limit.", amount_usd),
        )
        .with_payload(Payload::Remittance {
            remaining_limit: headroom,
        })
    }

    /// TCS due on a remittance in INR. Only the excess over the exemption
    /// threshold is taxed.
    pub fn calculate_tcs(
        &self,
        amount_inr: Decimal,
        purpose: &str,
        is_loan_funded: bool,
    ) -> Result<Decimal, DecimalError> {
        if amount_inr <= self.tcs.exemption_threshold_inr {
            return Ok(Decimal::ZERO);
        }

        let overflow =
            || DecimalError::Overflow(format!("TCS on {} for '{}'", amount_inr, purpose));
        let taxable = amount_inr
            .checked_sub(self.tcs.exemption_threshold_inr)
            .ok_or_else(overflow)?;
        let purpose = purpose.to_uppercase();
        let rate = if purpose.contains("EDUCATION") {
            if is_loan_funded {
                self.tcs.education_loan_rate
            } else {
                self.tcs.education_rate
            }
        } else if purpose.contains("MEDICAL") {
            self.tcs.medical_rate
        } else {
            self.tcs.default_rate
        };

        taxable.checked_mul(rate).ok_or_else(overflow)
    }
}

impl Default for RemittanceGuard {
    fn default() -> Self {
        RemittanceGuard::new(&RemittanceTable::default())
    }
}
