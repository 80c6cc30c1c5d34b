use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::rulebook::InputCreditTable;
use crate::domain::{GuardId, GuardResult, Payload};

use super::withholding::normalize_label;

/// GSTIN length: 2 state digits, 10-char PAN, entity code, `Z`, check char.
pub const GSTIN_LEN: usize = 15;

const GSTIN_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// ASCII-only: state code, PAN, entity code, `Z`, check character.
static GSTIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("invalid GSTIN pattern")
});

/// Input tax credit (GST/VAT) eligibility and GSTIN validation.
#[derive(Debug, Clone)]
pub struct InputCreditGuard {
    /// Normalized blocked category labels
    blocked: Vec<String>,
    personal_marker: String,
}

impl InputCreditGuard {
    pub fn new(table: &InputCreditTable) -> Self {
        InputCreditGuard {
            blocked: table.blocked_categories.iter().map(|c| normalize_label(c)).collect(),
            personal_marker: normalize_label(&table.personal_marker),
        }
    }

    /// Whether tax paid on an expense may be claimed as credit.
    pub fn verify_itc_eligibility(
        &self,
        expense_category: &str,
        amount: Decimal,
        tax_paid: Decimal,
    ) -> GuardResult {
        let normalized = normalize_label(expense_category);
        let blocked_payload = Payload::InputCredit {
            eligible_itc: Decimal::ZERO,
        };

        if let Some(term) = self.blocked.iter().find(|b| normalized.contains(b.as_str())) {
            return GuardResult::fail(
                GuardId::InputCredit,
                format!(
                    "ITC of {} on '{}' ({}) is blocked: {} is a blocked credit category.",
                    tax_paid, expense_category, amount, term
                ),
            )
            .with_payload(blocked_payload);
        }

        if !self.personal_marker.is_empty() && normalized.contains(&self.personal_marker) {
            return GuardResult::fail(
                GuardId::InputCredit,
                format!(
                    "ITC of {} on '{}' is blocked for personal consumption.",
                    tax_paid, expense_category
                ),
            )
            .with_payload(blocked_payload);
        }

        GuardResult::pass(
            GuardId::InputCredit,
            format!("Expense '{}' appears eligible for input tax credit.", expense_category),
        )
        .with_payload(Payload::InputCredit {
            eligible_itc: tax_paid,
        })
    }

    /// Structural check of a GSTIN: `^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$`.
    pub fn verify_gstin_format(&self, gstin: &str) -> GuardResult {
        if gstin_format_ok(gstin) {
            GuardResult::pass(GuardId::InputCredit, format!("GSTIN {} is well formed.", gstin))
        } else {
            GuardResult::fail(GuardId::InputCredit, format!("Invalid GSTIN format: '{}'.", gstin))
        }
    }

    /// Format check plus the mod-36 check character.
    pub fn verify_gstin_checksum(&self, gstin: &str) -> GuardResult {
        if !gstin_format_ok(gstin) {
            return self.verify_gstin_format(gstin);
        }

        let bytes = gstin.as_bytes();
        let expected = gstin_check_char(&bytes[..GSTIN_LEN - 1]);
        let actual = bytes[GSTIN_LEN - 1] as char;
        if expected == actual {
            GuardResult::pass(GuardId::InputCredit, format!("GSTIN {} checksum verified.", gstin))
        } else {
            GuardResult::fail(
                GuardId::InputCredit,
                format!(
                    "GSTIN {} fails checksum: expected check character '{}', found '{}'.",
                    gstin, expected, actual
                ),
            )
        }
    }
}

impl Default for InputCreditGuard {
    fn default() -> Self {
        InputCreditGuard::new(&InputCreditTable::default())
    }
}

fn gstin_format_ok(gstin: &str) -> bool {
    GSTIN_PATTERN.is_match(gstin)
}

/// Assumes the 14 bytes are already format-checked (digits or A-Z).
fn gstin_check_char(body: &[u8]) -> char {
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let value = GSTIN_ALPHABET.iter().position(|a| a == c).unwrap_or(0) as u32;
            let product = value * if i % 2 == 0 { 1 } else { 2 };
            product / 36 + product % 36
        })
        .sum();
    GSTIN_ALPHABET[((36 - sum % 36) % 36) as usize] as char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_category() {
        let result = InputCreditGuard::default().verify_itc_eligibility(
            "Food and Beverage",
            Decimal::new(1000, 0),
            Decimal::new(180, 0),
        );
        assert!(!result.verified);
        assert!(matches!(
            result.payload,
            Payload::InputCredit { eligible_itc } if eligible_itc == Decimal::ZERO
        ));
    }

    #[test]
    fn test_blocked_substring_match() {
        let result = InputCreditGuard::default().verify_itc_eligibility(
            "team catering services",
            Decimal::new(1000, 0),
            Decimal::new(50, 0),
        );
        assert!(!result.verified);
    }

    #[test]
    fn test_personal_consumption() {
        let result = InputCreditGuard::default().verify_itc_eligibility(
            "personal travel",
            Decimal::new(1000, 0),
            Decimal::new(50, 0),
        );
        assert!(!result.verified);
        assert!(result.message.contains("personal"));
    }

    #[test]
    fn test_eligible_expense() {
        let result = InputCreditGuard::default().verify_itc_eligibility(
            "office supplies",
            Decimal::new(1000, 0),
            Decimal::new(18000, 2),
        );
        assert!(result.verified);
        assert!(matches!(
            result.payload,
            Payload::InputCredit { eligible_itc } if eligible_itc == Decimal::new(180, 0)
        ));
    }

    #[test]
    fn test_gstin_format() {
        let guard = InputCreditGuard::default();
        assert!(guard.verify_gstin_format("22AAAAA0000A1Z5").verified);
        assert!(!guard.verify_gstin_format("22AAAAA0000A1X5").verified);
        assert!(!guard.verify_gstin_format("22AAAAA0000A0Z5").verified);
        assert!(!guard.verify_gstin_format("22aaaaa0000a1z5").verified);
        assert!(!guard.verify_gstin_format("22AAAAA0000A1Z").verified);
        assert!(!guard.verify_gstin_format("").verified);
        assert!(!guard.verify_gstin_format("22AAAAA0000A1Z5\n").verified);
        // Non-ASCII digits are not state codes
        assert!(!guard.verify_gstin_format("२२AAAAA0000A1Z5").verified);
    }

    #[test]
    fn test_gstin_checksum() {
        let guard = InputCreditGuard::default();
        assert!(guard.verify_gstin_checksum("27AAPFU0939F1ZV").verified);
        assert!(guard.verify_gstin_checksum("29AAGCB7383J1Z4").verified);

        let bad = guard.verify_gstin_checksum("22AAAAA0000A1Z5");
        assert!(!bad.verified);
        assert!(bad.message.contains("'C'"));
    }

    #[test]
    fn test_gstin_checksum_rejects_bad_format_first() {
        let result = InputCreditGuard::default().verify_gstin_checksum("NOT-A-GSTIN");
        assert!(!result.verified);
        assert!(result.message.contains("format"));
    }
}
