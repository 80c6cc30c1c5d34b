use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::rulebook::WithholdingRule;
use crate::domain::{GuardId, GuardResult, Payload};

/// Normalize a payment category label: uppercase, spaces to underscores.
pub(crate) fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase().replace(' ', "_")
}

/// Tax deducted at source on vendor payments.
///
/// Once the year-to-date exposure including the current invoice crosses the
/// category threshold, the category rate applies to the current invoice.
/// Earlier, undeducted payments are not caught up.
#[derive(Debug, Clone)]
pub struct WithholdingGuard {
    /// Normalized category -> rule
    rules: HashMap<String, WithholdingRule>,
}

impl WithholdingGuard {
    pub fn new(rules: &HashMap<String, WithholdingRule>) -> Self {
        WithholdingGuard {
            rules: rules
                .iter()
                .map(|(k, v)| (normalize_label(k), v.clone()))
                .collect(),
        }
    }

    /// Authoritative deduction for a payment.
    ///
    /// Categories without a rule deduct nothing.
    pub fn calculate_deduction(
        &self,
        service_type: &str,
        invoice_amount: Decimal,
        ytd_payment: Decimal,
    ) -> GuardResult {
        let rule = match self.rules.get(&normalize_label(service_type)) {
            Some(rule) => rule,
            None => {
                return GuardResult::pass(
                    GuardId::Withholding,
                    format!("No TDS rule found for category '{}'", service_type),
                )
                .with_payload(Payload::Withholding {
                    deduction: Decimal::ZERO,
                    net_payable: invoice_amount,
                    section: None,
                })
            }
        };

        let overflow = || {
            GuardResult::overflow(
                GuardId::Withholding,
                format!("invoice {} and year-to-date {}", invoice_amount, ytd_payment),
            )
        };
        let total_exposure = match invoice_amount.checked_add(ytd_payment) {
            Some(total) => total,
            None => return overflow(),
        };
        if total_exposure > rule.threshold {
            let (deduction, net_payable) = match invoice_amount
                .checked_mul(rule.rate)
                .and_then(|d| Some((d, invoice_amount.checked_sub(d)?)))
            {
                Some(amounts) => amounts,
                None => return overflow(),
            };
            GuardResult::pass(
                GuardId::Withholding,
                format!(
                    "Cumulative exposure {} exceeds threshold {}; deduct {} at {}.",
                    total_exposure, rule.threshold, deduction, rule.rate
                ),
            )
            .with_payload(Payload::Withholding {
                deduction,
                net_payable,
                section: rule.section.clone(),
            })
        } else {
            GuardResult::pass(
                GuardId::Withholding,
                format!(
                    "Cumulative exposure {} within threshold {}; no deduction.",
                    total_exposure, rule.threshold
                ),
            )
            .with_payload(Payload::Withholding {
                deduction: Decimal::ZERO,
                net_payable: invoice_amount,
                section: rule.section.clone(),
            })
        }
    }

    /// Compare a claimed deduction against the authoritative one.
    pub fn verify_deduction(
        &self,
        service_type: &str,
        invoice_amount: Decimal,
        ytd_payment: Decimal,
        claimed_deduction: Decimal,
    ) -> GuardResult {
        let computed = self.calculate_deduction(service_type, invoice_amount, ytd_payment);
        if computed.malformed_input {
            return computed;
        }
        let deduction = match &computed.payload {
            Payload::Withholding { deduction, .. } => *deduction,
            _ => Decimal::ZERO,
        };

        if deduction == claimed_deduction {
            return computed;
        }

        GuardResult::fail(
            GuardId::Withholding,
            format!(
                "TDS mismatch for {}: required deduction is {}, claimed {}.",
                service_type, deduction, claimed_deduction
            ),
        )
        .with_payload(computed.payload)
    }
}
