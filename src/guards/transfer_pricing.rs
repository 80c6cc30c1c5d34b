use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::decimal::percent_to_fraction;
use crate::domain::rulebook::TransferPricingTable;
use crate::domain::{GuardId, GuardResult, Payload, RiskCode};

/// Transfer pricing method used to derive the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PricingMethod {
    /// Comparable uncontrolled price
    #[default]
    Cup,
    /// Resale price method
    Rpm,
    /// Cost plus method
    Cpm,
    /// Transactional net margin method
    Tnmm,
    /// Profit split method
    Psm,
}

impl fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PricingMethod::Cup => "CUP",
            PricingMethod::Rpm => "RPM",
            PricingMethod::Cpm => "CPM",
            PricingMethod::Tnmm => "TNMM",
            PricingMethod::Psm => "PSM",
        };
        f.write_str(s)
    }
}

/// Arm's length price check against a safe-harbour band.
#[derive(Debug, Clone)]
pub struct TransferPricingGuard {
    default_tolerance_percent: Decimal,
}

impl TransferPricingGuard {
    pub fn new(table: &TransferPricingTable) -> Self {
        TransferPricingGuard {
            default_tolerance_percent: table.default_tolerance_percent,
        }
    }

    pub fn default_tolerance_percent(&self) -> Decimal {
        self.default_tolerance_percent
    }

    /// Verify that a related-party price sits inside the closed interval
    /// `[benchmark * (1 - t), benchmark * (1 + t)]`.
    ///
    /// On failure the adjustment reported is `benchmark - actual`.
    pub fn verify_arms_length_price(
        &self,
        transaction_price: Decimal,
        benchmark_price: Decimal,
        method: PricingMethod,
        tolerance_percent: Option<Decimal>,
    ) -> GuardResult {
        let tolerance_percent = tolerance_percent.unwrap_or(self.default_tolerance_percent);
        let tolerance = percent_to_fraction(tolerance_percent);

        let bounds = Decimal::ONE
            .checked_sub(tolerance)
            .and_then(|low| benchmark_price.checked_mul(low))
            .zip(
                Decimal::ONE
                    .checked_add(tolerance)
                    .and_then(|high| benchmark_price.checked_mul(high)),
            );
        let (lower_bound, upper_bound) = match bounds {
            Some(bounds) => bounds,
            None => {
                return GuardResult::overflow(
                    GuardId::TransferPricing,
                    format!("ALP {} with {}% tolerance", benchmark_price, tolerance_percent),
                )
            }
        };

        if lower_bound <= transaction_price && transaction_price <= upper_bound {
            return GuardResult::pass(
                GuardId::TransferPricing,
                format!(
                    "Transaction price {} is within safe harbour range ({} - {}) of ALP {} ({}).",
                    transaction_price, lower_bound, upper_bound, benchmark_price, method
                ),
            )
            .with_payload(Payload::ArmsLength {
                lower_bound,
                upper_bound,
                potential_adjustment: Decimal::ZERO,
            });
        }

        let adjustment = match benchmark_price.checked_sub(transaction_price) {
            Some(adjustment) => adjustment,
            None => {
                return GuardResult::overflow(
                    GuardId::TransferPricing,
                    format!("ALP {} and price {}", benchmark_price, transaction_price),
                )
            }
        };
        GuardResult::fail(
            GuardId::TransferPricing,
            format!(
                "Price {} deviates from ALP {} ({}) beyond {}% tolerance; range is {} - {}.",
                transaction_price,
                benchmark_price,
                method,
                tolerance_percent,
                lower_bound,
                upper_bound
            ),
        )
        .with_risk(RiskCode::TransferPricingAdjustment)
        .with_payload(Payload::ArmsLength {
            lower_bound,
            upper_bound,
            potential_adjustment: adjustment,
        })
    }
}

impl Default for TransferPricingGuard {
    fn default() -> Self {
        TransferPricingGuard::new(&TransferPricingTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decimal::to_f64;

    fn bounds(result: &GuardResult) -> (Decimal, Decimal, Decimal) {
        match result.payload {
            Payload::ArmsLength {
                lower_bound,
                upper_bound,
                potential_adjustment,
            } => (lower_bound, upper_bound, potential_adjustment),
            ref other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_within_safe_harbour() {
        let guard = TransferPricingGuard::default();
        let result = guard.verify_arms_length_price(
            Decimal::new(102, 0),
            Decimal::new(100, 0),
            PricingMethod::Cup,
            Some(Decimal::new(3, 0)),
        );
        assert!(result.verified);
        assert_eq!(bounds(&result).2, Decimal::ZERO);
    }

    #[test]
    fn test_outside_safe_harbour() {
        let guard = TransferPricingGuard::default();
        let result = guard.verify_arms_length_price(
            Decimal::new(105, 0),
            Decimal::new(100, 0),
            PricingMethod::Cup,
            Some(Decimal::new(3, 0)),
        );

        assert!(!result.verified);
        assert_eq!(result.risk, Some(RiskCode::TransferPricingAdjustment));
        let (lower, upper, adjustment) = bounds(&result);
        assert_eq!(lower, Decimal::new(97, 0));
        assert_eq!(upper, Decimal::new(103, 0));
        assert_eq!(to_f64(adjustment), -5.0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let guard = TransferPricingGuard::default();
        let at = |price: Decimal| {
            guard
                .verify_arms_length_price(price, Decimal::new(100, 0), PricingMethod::Tnmm, None)
                .verified
        };

        assert!(at(Decimal::new(97, 0)));
        assert!(at(Decimal::new(103, 0)));
        assert!(!at(Decimal::new(9699, 2)));
        assert!(!at(Decimal::new(10301, 2)));
    }

    #[test]
    fn test_overflowing_band_is_malformed() {
        let guard = TransferPricingGuard::default();
        let result = guard.verify_arms_length_price(
            Decimal::ONE,
            Decimal::MAX,
            PricingMethod::Cup,
            Some(Decimal::new(50, 0)),
        );
        assert!(!result.verified);
        assert!(result.malformed_input);
        assert_eq!(result.risk, None);

        let adjustment = guard.verify_arms_length_price(
            Decimal::MIN,
            Decimal::MAX,
            PricingMethod::Cup,
            Some(Decimal::ZERO),
        );
        assert!(adjustment.malformed_input);
    }

    #[test]
    fn test_method_serialization() {
        let json = serde_json::to_string(&PricingMethod::Tnmm).unwrap();
        assert_eq!(json, "\"TNMM\"");
    }
}
