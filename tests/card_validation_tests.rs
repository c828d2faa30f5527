//! Tests for the card validators against the system clock
//!
//! These tests verify that:
//! - Expiry checks follow the current year and month
//! - A form is only valid with all four fields valid and an invoice selected
//! - Configured limits change the rules

use chrono::{Datelike, Months};
use dentist_plus::prelude::*;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn month_str(date: NaiveDate) -> String {
    format!("{:02}", date.month())
}

// =============================================================================
// Expiry relative to today
// =============================================================================

mod expiry_tests {
    use super::*;

    #[test]
    fn test_current_month_is_valid() {
        let today = today();
        let year = today.year().to_string();
        assert_eq!(
            validate_expiry(&month_str(today), &year, today, &CardRules::default()),
            Ok(())
        );
    }

    #[test]
    fn test_previous_month_of_current_year_is_expired() {
        let today = today();
        if today.month() == 1 {
            // No earlier month in the current year
            return;
        }
        let previous = format!("{:02}", today.month() - 1);
        assert_eq!(
            validate_expiry(&previous, &today.year().to_string(), today, &CardRules::default()),
            Err(CardFieldError::Expired)
        );
    }

    #[test]
    fn test_last_year_is_out_of_range() {
        let today = today();
        let last_year = (today.year() - 1).to_string();
        assert_eq!(
            validate_expiry("12", &last_year, today, &CardRules::default()),
            Err(CardFieldError::YearOutOfRange)
        );
    }

    #[test]
    fn test_two_digit_year_is_normalized() {
        let today = today();
        let next = today.checked_add_months(Months::new(12)).unwrap();
        let short_year = format!("{:02}", next.year() % 100);
        assert_eq!(
            validate_expiry("01", &short_year, today, &CardRules::default()),
            Ok(())
        );
    }

    #[test]
    fn test_month_thirteen_rejected() {
        let next_year = (today().year() + 1).to_string();
        assert_eq!(
            validate_expiry("13", &next_year, today(), &CardRules::default()),
            Err(CardFieldError::MonthOutOfRange)
        );
    }

    #[test]
    fn test_years_ahead_limit_is_configurable() {
        let rules = CardRules {
            max_expiry_years_ahead: 5,
            ..CardRules::default()
        };
        let far = (today().year() + 6).to_string();
        assert_eq!(
            validate_expiry("01", &far, today(), &rules),
            Err(CardFieldError::YearOutOfRange)
        );
        assert!(validate_expiry("01", &far, today(), &CardRules::default()).is_ok());
    }
}

// =============================================================================
// Form validity
// =============================================================================

mod form_tests {
    use super::*;

    fn filled_form() -> PaymentForm {
        let rules = CardRules::default();
        let mut form = PaymentForm::new();
        form.set_card_number("4532015112830366", &rules);
        form.cardholder_name = "Jan Kowalski".to_string();
        form.expiry_month = "12".to_string();
        form.expiry_year = (today().year() + 1).to_string();
        form.cvv = "321".to_string();
        form
    }

    #[test]
    fn test_valid_fields_without_invoice_are_not_enough() {
        let form = filled_form();
        assert!(form.errors(today(), &CardRules::default()).is_empty());
        assert!(!form.is_valid(today(), &CardRules::default()));
    }

    #[test]
    fn test_each_field_blocks_validity() {
        let rules = CardRules::default();
        let breakers: [fn(&mut PaymentForm); 4] = [
            |f| f.card_number = "4532 0151 1283 0367".to_string(),
            |f| f.cardholder_name = "X".to_string(),
            |f| f.expiry_month = "0".to_string(),
            |f| f.cvv = "12345".to_string(),
        ];

        for breaker in breakers {
            let mut form = filled_form();
            form.toggle_invoice("inv-1");
            assert!(form.is_valid(today(), &rules));

            breaker(&mut form);
            assert!(!form.is_valid(today(), &rules));
            assert_eq!(form.errors(today(), &rules).field_errors().len(), 1);
        }
    }

    #[test]
    fn test_error_messages() {
        let mut form = PaymentForm::new();
        form.toggle_invoice("inv-1");
        let messages: Vec<String> = form
            .errors(today(), &CardRules::default())
            .field_errors()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Card number is required",
                "Cardholder name is required",
                "Expiry is required",
                "CVV is required",
            ]
        );
    }

    #[test]
    fn test_card_number_input_is_capped_at_max_length() {
        let rules = CardRules::default();
        let mut form = PaymentForm::new();
        form.set_card_number("4532015112830366 4532015112830366", &rules);
        assert_eq!(digits_only(&form.card_number).len(), 19);
        assert_eq!(form.card_number, "4532 0151 1283 0366 453");
    }

    #[test]
    fn test_stricter_cvv_rules() {
        let rules = CardRules {
            max_cvv_digits: 3,
            ..CardRules::default()
        };
        let mut form = filled_form();
        form.cvv = "1234".to_string();
        let errors = form.errors(today(), &rules);
        assert_eq!(errors.cvv, Some(CardFieldError::CvvLength { min: 3, max: 3 }));
    }
}
