//! Card payment field validators
//!
//! Each validator checks one field of the payment form and returns the first
//! rule it violates. Validators never panic; an `Ok(())` means the field is
//! acceptable.

use super::filters::{digits_only, normalize_expiry_year};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Largest accepted `max_expiry_years_ahead` in configuration
pub const MAX_EXPIRY_YEARS_AHEAD: u32 = 100;

/// Numeric limits applied by the card validators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRules {
    pub min_card_digits: usize,
    pub max_card_digits: usize,
    pub min_name_length: usize,
    /// How many years past the current one an expiry year may be
    pub max_expiry_years_ahead: u32,
    pub min_cvv_digits: usize,
    pub max_cvv_digits: usize,
}

impl Default for CardRules {
    fn default() -> Self {
        Self {
            min_card_digits: 13,
            max_card_digits: 19,
            min_name_length: 3,
            max_expiry_years_ahead: 25,
            min_cvv_digits: 3,
            max_cvv_digits: 4,
        }
    }
}

/// A single field violation; `Display` is the message shown under the field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardFieldError {
    #[error("Card number is required")]
    CardNumberRequired,
    #[error("Card number must be {min}-{max} digits")]
    CardNumberLength { min: usize, max: usize },
    #[error("Card number is invalid")]
    CardNumberInvalid,
    #[error("Cardholder name is required")]
    NameRequired,
    #[error("Name is too short")]
    NameTooShort,
    #[error("Name contains invalid characters")]
    NameInvalidCharacters,
    #[error("Expiry is required")]
    ExpiryRequired,
    #[error("Month must be 01-12")]
    MonthOutOfRange,
    #[error("Invalid expiry year")]
    YearOutOfRange,
    #[error("Card is expired")]
    Expired,
    #[error("CVV is required")]
    CvvRequired,
    #[error("CVV must be {min} or {max} digits")]
    CvvLength { min: usize, max: usize },
}

/// Luhn checksum over a string of ASCII digits
///
/// Starting from the rightmost digit, every second digit is doubled and
/// reduced by 9 when it exceeds 9. Non-digit input is never valid.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Validate a card number as typed (spaces and dashes allowed)
pub fn validate_card_number(input: &str, rules: &CardRules) -> Result<(), CardFieldError> {
    let digits = digits_only(input);
    if digits.is_empty() {
        return Err(CardFieldError::CardNumberRequired);
    }
    if digits.len() < rules.min_card_digits || digits.len() > rules.max_card_digits {
        return Err(CardFieldError::CardNumberLength {
            min: rules.min_card_digits,
            max: rules.max_card_digits,
        });
    }
    if !luhn_valid(&digits) {
        return Err(CardFieldError::CardNumberInvalid);
    }
    Ok(())
}

fn name_pattern() -> &'static Regex {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    // Latin letters including the Latin-1 accented range, plus ' - and space
    NAME_REGEX.get_or_init(|| Regex::new(r"^[A-Za-zÀ-ÿ'\- ]+$").unwrap())
}

/// Validate the cardholder name after trimming
pub fn validate_cardholder_name(input: &str, rules: &CardRules) -> Result<(), CardFieldError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CardFieldError::NameRequired);
    }
    if trimmed.chars().count() < rules.min_name_length {
        return Err(CardFieldError::NameTooShort);
    }
    if !name_pattern().is_match(trimmed) {
        return Err(CardFieldError::NameInvalidCharacters);
    }
    Ok(())
}

/// Validate expiry month/year against `today`
///
/// Two-digit years are read as `20YY`. The card stays valid through the
/// whole expiry month.
pub fn validate_expiry(
    month: &str,
    year: &str,
    today: NaiveDate,
    rules: &CardRules,
) -> Result<(), CardFieldError> {
    let month_digits = digits_only(month);
    let year_digits = digits_only(year);
    if month_digits.is_empty() || year_digits.is_empty() {
        return Err(CardFieldError::ExpiryRequired);
    }

    let month: u32 = month_digits
        .parse()
        .map_err(|_| CardFieldError::MonthOutOfRange)?;
    if !(1..=12).contains(&month) {
        return Err(CardFieldError::MonthOutOfRange);
    }

    let year = normalize_expiry_year(&year_digits).ok_or(CardFieldError::YearOutOfRange)?;
    let current_year = today.year();
    let horizon = i32::try_from(rules.max_expiry_years_ahead).unwrap_or(i32::MAX);
    let last_year = current_year.saturating_add(horizon);
    if year < current_year || year > last_year {
        return Err(CardFieldError::YearOutOfRange);
    }
    if year == current_year && month < today.month() {
        return Err(CardFieldError::Expired);
    }
    Ok(())
}

/// Validate the card security code
pub fn validate_cvv(input: &str, rules: &CardRules) -> Result<(), CardFieldError> {
    let digits = digits_only(input);
    if digits.is_empty() {
        return Err(CardFieldError::CvvRequired);
    }
    if digits.len() < rules.min_cvv_digits || digits.len() > rules.max_cvv_digits {
        return Err(CardFieldError::CvvLength {
            min: rules.min_cvv_digits,
            max: rules.max_cvv_digits,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    // === luhn_valid() ===

    #[test]
    fn test_luhn_reference_vectors() {
        assert!(luhn_valid("4532015112830366"));
        assert!(!luhn_valid("4532015112830367"));
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("5500000000000004"));
    }

    #[test]
    fn test_luhn_rejects_non_digits() {
        assert!(!luhn_valid("4111 1111 1111 1111"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn test_luhn_every_single_digit_mutation_breaks_checksum() {
        let valid = "4532015112830366";
        for pos in 0..valid.len() {
            let original = valid.as_bytes()[pos];
            for replacement in b'0'..=b'9' {
                if replacement == original {
                    continue;
                }
                let mut mutated = valid.as_bytes().to_vec();
                mutated[pos] = replacement;
                let mutated = String::from_utf8(mutated).unwrap();
                assert!(!luhn_valid(&mutated), "{} should fail", mutated);
            }
        }
    }

    // === validate_card_number() ===

    #[test]
    fn test_card_number_required() {
        let rules = CardRules::default();
        assert_eq!(
            validate_card_number("  - ", &rules),
            Err(CardFieldError::CardNumberRequired)
        );
    }

    #[test]
    fn test_card_number_length_bounds() {
        let rules = CardRules::default();
        let err = validate_card_number("411111111111", &rules).unwrap_err();
        assert_eq!(err.to_string(), "Card number must be 13-19 digits");
        assert!(validate_card_number("41111111111111111111", &rules).is_err());
    }

    #[test]
    fn test_card_number_accepts_formatted_input() {
        let rules = CardRules::default();
        assert!(validate_card_number("4532 0151 1283 0366", &rules).is_ok());
        assert!(validate_card_number("4532-0151-1283-0366", &rules).is_ok());
    }

    #[test]
    fn test_card_number_checksum_failure() {
        let rules = CardRules::default();
        assert_eq!(
            validate_card_number("4532015112830367", &rules),
            Err(CardFieldError::CardNumberInvalid)
        );
    }

    #[test]
    fn test_thirteen_and_nineteen_digit_cards() {
        let rules = CardRules::default();
        assert!(validate_card_number("4222222222222", &rules).is_ok());
        assert!(validate_card_number("6011000000000000001", &rules).is_ok());
    }

    /// Append the digit that makes `payload` pass the Luhn check
    fn with_check_digit(payload: &str) -> String {
        (b'0'..=b'9')
            .map(|d| format!("{}{}", payload, d as char))
            .find(|candidate| luhn_valid(candidate))
            .unwrap()
    }

    #[test]
    fn test_every_length_in_range_accepted_and_any_digit_change_rejected() {
        let rules = CardRules::default();
        let seed = "4929387512640518273";

        for len in 13..=19 {
            let card = with_check_digit(&seed[..len - 1]);
            assert_eq!(card.len(), len);
            assert_eq!(validate_card_number(&card, &rules), Ok(()), "{}", card);

            for pos in 0..len {
                let mut changed = card.as_bytes().to_vec();
                changed[pos] = b'0' + (changed[pos] - b'0' + 1) % 10;
                let changed = String::from_utf8(changed).unwrap();
                assert_eq!(
                    validate_card_number(&changed, &rules),
                    Err(CardFieldError::CardNumberInvalid),
                    "{}",
                    changed
                );
            }
        }
    }

    // === validate_cardholder_name() ===

    #[test]
    fn test_name_rules() {
        let rules = CardRules::default();
        assert_eq!(
            validate_cardholder_name("   ", &rules),
            Err(CardFieldError::NameRequired)
        );
        assert_eq!(
            validate_cardholder_name(" Al ", &rules),
            Err(CardFieldError::NameTooShort)
        );
        assert_eq!(
            validate_cardholder_name("J0hn Doe", &rules),
            Err(CardFieldError::NameInvalidCharacters)
        );
        assert!(validate_cardholder_name("  John Doe  ", &rules).is_ok());
    }

    #[test]
    fn test_name_allows_accents_hyphens_apostrophes() {
        let rules = CardRules::default();
        assert!(validate_cardholder_name("Zoë D'Arcy-Müller", &rules).is_ok());
        assert!(validate_cardholder_name("José Álvarez", &rules).is_ok());
    }

    #[test]
    fn test_name_length_counts_characters() {
        let rules = CardRules::default();
        // Two characters, four bytes
        assert_eq!(
            validate_cardholder_name("Éé", &rules),
            Err(CardFieldError::NameTooShort)
        );
    }

    // === validate_expiry() ===

    #[test]
    fn test_expiry_required() {
        let rules = CardRules::default();
        assert_eq!(
            validate_expiry("", "27", today(), &rules),
            Err(CardFieldError::ExpiryRequired)
        );
        assert_eq!(
            validate_expiry("05", "", today(), &rules),
            Err(CardFieldError::ExpiryRequired)
        );
    }

    #[test]
    fn test_expiry_month_range() {
        let rules = CardRules::default();
        assert_eq!(
            validate_expiry("13", "27", today(), &rules),
            Err(CardFieldError::MonthOutOfRange)
        );
        assert_eq!(
            validate_expiry("00", "27", today(), &rules),
            Err(CardFieldError::MonthOutOfRange)
        );
    }

    #[test]
    fn test_expiry_year_range() {
        let rules = CardRules::default();
        assert_eq!(
            validate_expiry("06", "2025", today(), &rules),
            Err(CardFieldError::YearOutOfRange)
        );
        assert_eq!(
            validate_expiry("06", "2052", today(), &rules),
            Err(CardFieldError::YearOutOfRange)
        );
        assert!(validate_expiry("06", "2051", today(), &rules).is_ok());
        assert_eq!(
            validate_expiry("06", "202", today(), &rules),
            Err(CardFieldError::YearOutOfRange)
        );
    }

    #[test]
    fn test_expiry_horizon_beyond_i32_does_not_wrap() {
        for horizon in [u32::MAX, i32::MAX as u32] {
            let rules = CardRules {
                max_expiry_years_ahead: horizon,
                ..CardRules::default()
            };
            assert!(validate_expiry("06", "2027", today(), &rules).is_ok());
            assert!(validate_expiry("06", "9999", today(), &rules).is_ok());
            assert_eq!(
                validate_expiry("06", "2025", today(), &rules),
                Err(CardFieldError::YearOutOfRange)
            );
        }
    }

    #[test]
    fn test_expiry_current_year_month_boundary() {
        let rules = CardRules::default();
        assert_eq!(
            validate_expiry("5", "26", today(), &rules),
            Err(CardFieldError::Expired)
        );
        assert!(validate_expiry("6", "26", today(), &rules).is_ok());
        assert!(validate_expiry("12", "2026", today(), &rules).is_ok());
    }

    // === validate_cvv() ===

    #[test]
    fn test_cvv_rules() {
        let rules = CardRules::default();
        assert_eq!(validate_cvv("", &rules), Err(CardFieldError::CvvRequired));
        assert_eq!(
            validate_cvv("12", &rules),
            Err(CardFieldError::CvvLength { min: 3, max: 4 })
        );
        assert!(validate_cvv("123", &rules).is_ok());
        assert!(validate_cvv("1234", &rules).is_ok());
        assert!(validate_cvv("12345", &rules).is_err());
    }

    #[test]
    fn test_cvv_length_message() {
        let rules = CardRules::default();
        let err = validate_cvv("12", &rules).unwrap_err();
        assert_eq!(err.to_string(), "CVV must be 3 or 4 digits");
    }
}
