use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{GuardId, GuardResult, Payload, PayrollEntry};

/// Gross-to-net payroll reconciliation.
///
/// Net pay must equal gross pay minus every tax line and every deduction,
/// exactly, in decimal arithmetic.
#[derive(Debug, Clone, Default)]
pub struct PayrollGuard;

impl PayrollGuard {
    pub fn new() -> Self {
        PayrollGuard
    }

    /// Verify the claimed net pay of a payroll record.
    pub fn verify_gross_to_net(&self, entry: &PayrollEntry) -> GuardResult {
        let reconciled = entry
            .total_taxes()
            .zip(entry.total_deductions())
            .and_then(|(taxes, deductions)| {
                let net = entry.gross_pay.checked_sub(taxes)?.checked_sub(deductions)?;
                Some((taxes, deductions, net, net.checked_sub(entry.net_pay_claimed)?))
            });
        let (total_taxes, total_deductions, calculated_net, discrepancy) = match reconciled {
            Some(values) => values,
            None => {
                return GuardResult::overflow(
                    GuardId::Payroll,
                    format!("payroll lines for {}", entry.employee_id),
                )
            }
        };

        debug!(
            employee_id = %entry.employee_id,
            calculated = %calculated_net,
            claimed = %entry.net_pay_claimed,
            "Payroll reconciled"
        );

        let payload = Payload::Payroll {
            recalculated_net_pay: calculated_net,
            discrepancy,
            total_taxes,
            total_deductions,
        };

        if discrepancy == Decimal::ZERO {
            GuardResult::pass(
                GuardId::Payroll,
                format!(
                    "Net pay {} {} matches gross - taxes - deductions.",
                    calculated_net, entry.currency
                ),
            )
            .with_payload(payload)
        } else {
            GuardResult::fail(
                GuardId::Payroll,
                format!(
                    "Mathematical discrepancy detected for {}. Claimed net: {} {}, calculated: {} {}. Diff: {}",
                    entry.employee_id,
                    entry.net_pay_claimed,
                    entry.currency,
                    calculated_net,
                    entry.currency,
                    discrepancy
                ),
            )
            .with_payload(payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, DeductionEntry, DeductionType, TaxEntry};

    fn entry(net_claimed: Decimal) -> PayrollEntry {
        PayrollEntry {
            employee_id: "E-1".to_string(),
            gross_pay: Decimal::new(500000, 2),
            taxes: vec![TaxEntry::new("Federal Income Tax", Decimal::new(100000, 2))],
            deductions: vec![DeductionEntry::new(
                "401k",
                Decimal::new(20000, 2),
                DeductionType::PreTax,
            )],
            net_pay_claimed: net_claimed,
            currency: Currency::Usd,
        }
    }

    #[test]
    fn test_matching_net_pay() {
        let result = PayrollGuard::new().verify_gross_to_net(&entry(Decimal::new(380000, 2)));

        assert!(result.verified);
        match result.payload {
            Payload::Payroll {
                recalculated_net_pay,
                discrepancy,
                ..
            } => {
                assert_eq!(recalculated_net_pay, Decimal::new(380000, 2));
                assert_eq!(discrepancy, Decimal::ZERO);
                assert_eq!(discrepancy.to_string(), "0.00");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_discrepancy_reports_both_values() {
        let result = PayrollGuard::new().verify_gross_to_net(&entry(Decimal::new(385000, 2)));

        assert!(!result.verified);
        assert!(result.message.contains("3850.00"));
        assert!(result.message.contains("3800.00"));
        assert!(result.message.contains("-50.00"));
        assert!(matches!(
            result.payload,
            Payload::Payroll { discrepancy, .. } if discrepancy == Decimal::new(-5000, 2)
        ));
    }

    #[test]
    fn test_cent_level_mismatch_is_caught() {
        // One cent off
        let mut e = entry(Decimal::new(379999, 2));
        e.taxes.push(TaxEntry::new("State", Decimal::ZERO));
        let result = PayrollGuard::new().verify_gross_to_net(&e);
        assert!(!result.verified);
    }

    #[test]
    fn test_no_lines() {
        let e = PayrollEntry {
            employee_id: "E-2".to_string(),
            gross_pay: Decimal::new(1000, 0),
            taxes: vec![],
            deductions: vec![],
            net_pay_claimed: Decimal::new(1000, 0),
            currency: Currency::Eur,
        };
        let result = PayrollGuard::new().verify_gross_to_net(&e);
        assert!(result.verified);
        assert!(result.message.contains("EUR"));
    }

    #[test]
    fn test_overflowing_lines_are_malformed() {
        let mut e = entry(Decimal::ZERO);
        e.gross_pay = Decimal::MIN;
        e.taxes = vec![TaxEntry::new("Federal", Decimal::MAX)];

        let result = PayrollGuard::new().verify_gross_to_net(&e);

        assert!(!result.verified);
        assert!(result.malformed_input);
        assert!(result.message.contains("E-1"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Currency, DeductionEntry, DeductionType, TaxEntry};
    use proptest::prelude::*;

    fn cents() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000).prop_map(|c| Decimal::new(c, 2))
    }

    proptest! {
        /// The verdict holds exactly when gross minus every line equals the claim.
        #[test]
        fn net_pay_identity(
            gross in cents(),
            taxes in prop::collection::vec(cents(), 0..6),
            deductions in prop::collection::vec(cents(), 0..6),
            offset in -500i64..500,
        ) {
            let expected = taxes
                .iter()
                .chain(deductions.iter())
                .fold(gross, |acc, line| acc - *line);
            let claimed = expected + Decimal::new(offset, 2);

            let entry = PayrollEntry {
                employee_id: "E-P".to_string(),
                gross_pay: gross,
                taxes: taxes.iter().map(|t| TaxEntry::new("tax", *t)).collect(),
                deductions: deductions
                    .iter()
                    .map(|d| DeductionEntry::new("deduction", *d, DeductionType::PostTax))
                    .collect(),
                net_pay_claimed: claimed,
                currency: Currency::Usd,
            };
            let result = PayrollGuard::new().verify_gross_to_net(&entry);

            match result.payload {
                Payload::Payroll { recalculated_net_pay, discrepancy, .. } => {
                    prop_assert_eq!(recalculated_net_pay, expected);
                    prop_assert_eq!(discrepancy, expected - claimed);
                    prop_assert_eq!(result.verified, recalculated_net_pay == claimed);
                    prop_assert_eq!(result.verified, offset == 0);
                }
                other => prop_assert!(false, "unexpected payload {:?}", other),
            }
        }
    }
}
