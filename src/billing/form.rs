//! Payment form state and payment wire types

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::validation::filters::{digits_only, format_card_number, mask_card_number};
use crate::core::validation::validators::{
    CardFieldError, CardRules, validate_card_number, validate_cardholder_name, validate_cvv,
    validate_expiry,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Payment submission body: `{ invoiceIds, paymentMethod }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub invoice_ids: Vec<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub kind: PaymentMethodKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_details: Option<CardDetails>,
}

impl PaymentMethod {
    pub fn card(details: CardDetails) -> Self {
        Self {
            kind: PaymentMethodKind::Card,
            card_details: Some(details),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethodKind {
    Card,
    Cash,
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethodKind::Card => f.write_str("CARD"),
            PaymentMethodKind::Cash => f.write_str("CASH"),
        }
    }
}

/// Card fields as sent to the payment collaborator
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
}

impl CardDetails {
    /// Run all four field validators
    pub fn validate(&self, today: NaiveDate, rules: &CardRules) -> PaymentFormErrors {
        PaymentFormErrors {
            card_number: validate_card_number(&self.card_number, rules).err(),
            cardholder_name: validate_cardholder_name(&self.cardholder_name, rules).err(),
            expiry: validate_expiry(&self.expiry_month, &self.expiry_year, today, rules).err(),
            cvv: validate_cvv(&self.cvv, rules).err(),
        }
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &mask_card_number(&self.card_number))
            .field("cardholder_name", &self.cardholder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .finish()
    }
}

impl PaymentRequest {
    /// Server-side check of a submitted payment
    ///
    /// Collects every problem instead of stopping at the first one.
    pub fn check(&self, today: NaiveDate, rules: &CardRules) -> Result<(), ValidationError> {
        let mut fields = Vec::new();

        if self.invoice_ids.is_empty() {
            fields.push(FieldValidationError::new(
                "invoiceIds",
                "Select at least one invoice",
            ));
        }

        if self.payment_method.kind == PaymentMethodKind::Card {
            match &self.payment_method.card_details {
                Some(details) => fields.extend(details.validate(today, rules).field_errors()),
                None => fields.push(FieldValidationError::new(
                    "cardDetails",
                    "Card details are required",
                )),
            }
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(fields))
        }
    }
}

/// Per-field validation result; `None` means the field is valid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFormErrors {
    pub card_number: Option<CardFieldError>,
    pub cardholder_name: Option<CardFieldError>,
    pub expiry: Option<CardFieldError>,
    pub cvv: Option<CardFieldError>,
}

impl PaymentFormErrors {
    pub fn is_empty(&self) -> bool {
        self.card_number.is_none()
            && self.cardholder_name.is_none()
            && self.expiry.is_none()
            && self.cvv.is_none()
    }

    /// Errors keyed by wire field name, in form order
    pub fn field_errors(&self) -> Vec<FieldValidationError> {
        [
            ("cardNumber", &self.card_number),
            ("cardholderName", &self.cardholder_name),
            ("expiry", &self.expiry),
            ("cvv", &self.cvv),
        ]
        .into_iter()
        .filter_map(|(field, err)| {
            err.as_ref()
                .map(|e| FieldValidationError::new(field, e.to_string()))
        })
        .collect()
    }
}

/// Editable payment form
///
/// Field values are kept as typed; normalization happens when they are
/// validated or turned into a [`PaymentRequest`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PaymentForm {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    selected_invoice_ids: BTreeSet<String>,
}

impl PaymentForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the card number grouped in blocks of four, as the input shows it
    pub fn set_card_number(&mut self, input: &str, rules: &CardRules) {
        self.card_number = format_card_number(input, rules.max_card_digits);
    }

    /// Select or deselect an invoice; returns whether it is now selected
    pub fn toggle_invoice(&mut self, invoice_id: &str) -> bool {
        if self.selected_invoice_ids.remove(invoice_id) {
            false
        } else {
            self.selected_invoice_ids.insert(invoice_id.to_string());
            true
        }
    }

    pub fn selected_invoice_ids(&self) -> &BTreeSet<String> {
        &self.selected_invoice_ids
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_invoice_ids.is_empty()
    }

    /// Card fields normalized for submission
    pub fn card_details(&self) -> CardDetails {
        CardDetails {
            card_number: digits_only(&self.card_number),
            cardholder_name: self.cardholder_name.trim().to_string(),
            expiry_month: self.expiry_month.clone(),
            expiry_year: self.expiry_year.clone(),
            cvv: self.cvv.clone(),
        }
    }

    pub fn errors(&self, today: NaiveDate, rules: &CardRules) -> PaymentFormErrors {
        self.card_details().validate(today, rules)
    }

    /// All four fields valid and at least one invoice selected
    pub fn is_valid(&self, today: NaiveDate, rules: &CardRules) -> bool {
        self.has_selection() && self.errors(today, rules).is_empty()
    }

    pub fn to_request(&self) -> PaymentRequest {
        PaymentRequest {
            invoice_ids: self.selected_invoice_ids.iter().cloned().collect(),
            payment_method: PaymentMethod::card(self.card_details()),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentForm")
            .field("card", &self.card_details())
            .field("selected_invoice_ids", &self.selected_invoice_ids)
            .finish()
    }
}
