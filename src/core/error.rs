//! Typed error handling for the clinic core
//!
//! This module provides an error type hierarchy that lets callers handle
//! failures by category instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`RecordError`]: missing patients, invoices and ownership violations
//! - [`ChartError`]: malformed tooth numbers and dialog misuse
//! - [`PaymentError`]: declined or concurrent payment submissions
//! - [`ConfigError`]: configuration values that cannot be used
//! - [`ValidationError`]: input validation failures, per field
//! - [`RequestError`]: authentication and authorization failures
//!
//! # Example
//!
//! ```rust,ignore
//! use dentist_plus::prelude::*;
//!
//! match api.submit_payment(&session, request).await {
//!     Ok(paid) => println!("{} invoices paid", paid.len()),
//!     Err(ClinicError::Record(RecordError::InvoiceNotFound { id })) => {
//!         println!("Invoice {} does not exist", id);
//!     }
//!     Err(e) => eprintln!("Payment failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Result alias used across the crate
pub type ClinicResult<T> = Result<T, ClinicError>;

/// The main error type for the clinic core
#[derive(Debug)]
pub enum ClinicError {
    /// Record lookups and ownership checks
    Record(RecordError),

    /// Dental chart and tooth dialog errors
    Chart(ChartError),

    /// Payment submission errors
    Payment(PaymentError),

    /// Configuration errors
    Config(ConfigError),

    /// Validation errors
    Validation(ValidationError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (poisoned locks and similar)
    Internal(String),
}

impl fmt::Display for ClinicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClinicError::Record(e) => write!(f, "{}", e),
            ClinicError::Chart(e) => write!(f, "{}", e),
            ClinicError::Payment(e) => write!(f, "{}", e),
            ClinicError::Config(e) => write!(f, "{}", e),
            ClinicError::Validation(e) => write!(f, "{}", e),
            ClinicError::Request(e) => write!(f, "{}", e),
            ClinicError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ClinicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClinicError::Record(e) => Some(e),
            ClinicError::Chart(e) => Some(e),
            ClinicError::Payment(e) => Some(e),
            ClinicError::Config(e) => Some(e),
            ClinicError::Validation(e) => Some(e),
            ClinicError::Request(e) => Some(e),
            ClinicError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ClinicError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClinicError::Record(e) => e.status_code(),
            ClinicError::Chart(e) => e.status_code(),
            ClinicError::Payment(e) => e.status_code(),
            ClinicError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ClinicError::Validation(_) => StatusCode::BAD_REQUEST,
            ClinicError::Request(e) => e.status_code(),
            ClinicError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ClinicError::Record(e) => e.error_code(),
            ClinicError::Chart(e) => e.error_code(),
            ClinicError::Payment(e) => e.error_code(),
            ClinicError::Config(_) => "CONFIG_ERROR",
            ClinicError::Validation(_) => "VALIDATION_ERROR",
            ClinicError::Request(e) => e.error_code(),
            ClinicError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Build an internal error from a poisoned lock or similar failure
    pub fn internal(message: impl fmt::Display) -> Self {
        ClinicError::Internal(message.to_string())
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ClinicError::Record(RecordError::PatientNotFound { id }) => {
                Some(serde_json::json!({ "patient_id": id }))
            }
            ClinicError::Record(RecordError::InvoiceNotFound { id }) => {
                Some(serde_json::json!({ "invoice_id": id }))
            }
            ClinicError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ClinicError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors related to patient records and invoices
#[derive(Debug)]
pub enum RecordError {
    /// No patient with this id
    PatientNotFound { id: String },

    /// The session's user has no patient profile
    ProfileNotFound { user_id: String },

    /// No invoice with this id
    InvoiceNotFound { id: String },

    /// Invoice exists but belongs to another patient
    InvoiceNotOwned { invoice_id: String },

    /// Invoice was already settled
    InvoiceAlreadyPaid { invoice_id: String },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::PatientNotFound { id } => {
                write!(f, "Patient not found with id: {}", id)
            }
            RecordError::ProfileNotFound { user_id } => {
                write!(f, "Patient profile not found for user: {}", user_id)
            }
            RecordError::InvoiceNotFound { id } => {
                write!(f, "Invoice not found with id: {}", id)
            }
            RecordError::InvoiceNotOwned { invoice_id } => {
                write!(f, "Invoice {} does not belong to this patient", invoice_id)
            }
            RecordError::InvoiceAlreadyPaid { invoice_id } => {
                write!(f, "Invoice {} is already paid", invoice_id)
            }
        }
    }
}

impl std::error::Error for RecordError {}

impl RecordError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecordError::PatientNotFound { .. } => StatusCode::NOT_FOUND,
            RecordError::ProfileNotFound { .. } => StatusCode::NOT_FOUND,
            RecordError::InvoiceNotFound { .. } => StatusCode::NOT_FOUND,
            RecordError::InvoiceNotOwned { .. } => StatusCode::FORBIDDEN,
            RecordError::InvoiceAlreadyPaid { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RecordError::PatientNotFound { .. } => "PATIENT_NOT_FOUND",
            RecordError::ProfileNotFound { .. } => "PROFILE_NOT_FOUND",
            RecordError::InvoiceNotFound { .. } => "INVOICE_NOT_FOUND",
            RecordError::InvoiceNotOwned { .. } => "INVOICE_NOT_OWNED",
            RecordError::InvoiceAlreadyPaid { .. } => "INVOICE_ALREADY_PAID",
        }
    }
}

impl From<RecordError> for ClinicError {
    fn from(err: RecordError) -> Self {
        ClinicError::Record(err)
    }
}

// =============================================================================
// Chart Errors
// =============================================================================

/// Errors related to tooth numbers and the tooth dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// Not one of the 32 adult FDI tooth numbers
    InvalidToothNumber { value: String },

    /// Status string outside the known enumeration
    UnknownStatus { value: String },

    /// A tooth dialog is already open
    DialogAlreadyOpen { tooth: u8 },

    /// Operation needs an open dialog
    DialogNotOpen,

    /// The chart view does not accept edits
    ReadOnly,
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::InvalidToothNumber { value } => {
                write!(f, "Invalid FDI tooth number: {}", value)
            }
            ChartError::UnknownStatus { value } => {
                write!(f, "Unknown tooth status: {}", value)
            }
            ChartError::DialogAlreadyOpen { tooth } => {
                write!(f, "Dialog for tooth {} is already open", tooth)
            }
            ChartError::DialogNotOpen => write!(f, "No tooth dialog is open"),
            ChartError::ReadOnly => write!(f, "Dental chart is read-only"),
        }
    }
}

impl std::error::Error for ChartError {}

impl ChartError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChartError::InvalidToothNumber { .. } => StatusCode::BAD_REQUEST,
            ChartError::UnknownStatus { .. } => StatusCode::BAD_REQUEST,
            ChartError::DialogAlreadyOpen { .. } => StatusCode::CONFLICT,
            ChartError::DialogNotOpen => StatusCode::CONFLICT,
            ChartError::ReadOnly => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ChartError::InvalidToothNumber { .. } => "INVALID_TOOTH_NUMBER",
            ChartError::UnknownStatus { .. } => "UNKNOWN_TOOTH_STATUS",
            ChartError::DialogAlreadyOpen { .. } => "DIALOG_ALREADY_OPEN",
            ChartError::DialogNotOpen => "DIALOG_NOT_OPEN",
            ChartError::ReadOnly => "CHART_READ_ONLY",
        }
    }
}

impl From<ChartError> for ClinicError {
    fn from(err: ChartError) -> Self {
        ClinicError::Chart(err)
    }
}

// =============================================================================
// Payment Errors
// =============================================================================

/// Errors related to payment submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The payment collaborator rejected the payment
    ///
    /// The message is shown to the user verbatim; an empty message falls
    /// back to a generic failure text in the payment modal.
    Declined { message: String },

    /// A submission for this form is still in flight
    AlreadyProcessing,

    /// The payment modal is not open
    ModalClosed,

    /// Only card payments are accepted
    UnsupportedMethod { method: String },
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::Declined { message } => write!(f, "{}", message),
            PaymentError::AlreadyProcessing => {
                write!(f, "A payment is already being processed")
            }
            PaymentError::ModalClosed => write!(f, "Payment form is closed"),
            PaymentError::UnsupportedMethod { method } => {
                write!(f, "Unsupported payment method: {}", method)
            }
        }
    }
}

impl std::error::Error for PaymentError {}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Declined { .. } => StatusCode::PAYMENT_REQUIRED,
            PaymentError::AlreadyProcessing => StatusCode::CONFLICT,
            PaymentError::ModalClosed => StatusCode::CONFLICT,
            PaymentError::UnsupportedMethod { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentError::Declined { .. } => "PAYMENT_DECLINED",
            PaymentError::AlreadyProcessing => "PAYMENT_IN_PROGRESS",
            PaymentError::ModalClosed => "PAYMENT_FORM_CLOSED",
            PaymentError::UnsupportedMethod { .. } => "UNSUPPORTED_PAYMENT_METHOD",
        }
    }
}

impl From<PaymentError> for ClinicError {
    fn from(err: PaymentError) -> Self {
        ClinicError::Payment(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration values
#[derive(Debug)]
pub enum ConfigError {
    /// A range whose lower bound exceeds its upper bound
    InvalidRange { field: String, min: usize, max: usize },

    /// A value that must be strictly positive
    MustBePositive { field: String },

    /// A value above its allowed maximum
    TooLarge { field: String, max: u64 },

    /// The bind address could not be parsed
    InvalidBindAddress { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRange { field, min, max } => {
                write!(f, "Invalid range for '{}': {} > {}", field, min, max)
            }
            ConfigError::MustBePositive { field } => {
                write!(f, "Configuration value '{}' must be positive", field)
            }
            ConfigError::TooLarge { field, max } => {
                write!(f, "Configuration value '{}' must be at most {}", field, max)
            }
            ConfigError::InvalidBindAddress { value } => {
                write!(f, "Invalid bind address: {}", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ClinicError {
    fn from(err: ConfigError) -> Self {
        ClinicError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ClinicError {
    fn from(err: ValidationError) -> Self {
        ClinicError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldValidationError::new(field.clone(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests and sessions
#[derive(Debug)]
pub enum RequestError {
    /// Missing or unknown session token
    Unauthorized { message: String },

    /// Session lacks the required role
    Forbidden { message: String },

    /// Malformed request
    BadRequest { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            RequestError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            RequestError::BadRequest { message } => write!(f, "Bad request: {}", message),
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
            RequestError::BadRequest { .. } => "BAD_REQUEST",
        }
    }
}

impl From<RequestError> for ClinicError {
    fn from(err: RequestError) -> Self {
        ClinicError::Request(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declined_payment_displays_message_verbatim() {
        let err = ClinicError::from(PaymentError::Declined {
            message: "Insufficient funds".to_string(),
        });
        assert_eq!(err.to_string(), "Insufficient funds");
        assert_eq!(err.status_code(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_field_errors_details_list_every_field() {
        let err = ClinicError::from(ValidationError::FieldErrors(vec![
            FieldValidationError::new("cvv", "CVV is required"),
            FieldValidationError::new("cardNumber", "Card number is invalid"),
        ]));
        let response = err.to_response();
        assert_eq!(response.code, "VALIDATION_ERROR");
        let fields = response.details.unwrap();
        assert_eq!(fields["fields"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_internal_error_has_no_source() {
        use std::error::Error;
        let err = ClinicError::internal("lock poisoned");
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Internal error: lock poisoned");
    }
}
