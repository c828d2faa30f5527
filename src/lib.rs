//! # Dentist Plus
//!
//! Clinic core for a dental practice: card payment validation, the FDI dental
//! chart codec, and a REST surface over dental records and invoices.
//!
//! ## Features
//!
//! - **Card Validator**: Luhn checksum, cardholder name, expiry and CVV rules
//!   with per-field messages, enforced in the payment form and on the server
//! - **Dental Chart Codec**: sparse `tooth_<N>` → surface → status charts
//!   decoded into 32 tooth summaries with a single severity order
//! - **Tooth Editing**: one dialog at a time, whole-tooth overwrites written as
//!   a full chart
//! - **Payments**: all-or-nothing invoice payment, one submission in flight
//! - **Configuration-Based**: server and card limits loaded from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dentist_plus::prelude::*;
//!
//! let chart = DentalChart::from_value(&serde_json::json!({
//!     "tooth_36": { "occlusal": "CARIES", "buccal": "CROWN" }
//! }));
//! let tooth = ToothNumber::new(36)?;
//! assert_eq!(chart.tooth_status(tooth), ToothStatus::Crown);
//!
//! let edit = ToothEdit::new(ToothNumber::new(11)?, ToothStatus::Extraction);
//! let updated = edit.apply_to(&chart);
//!
//! assert!(luhn_valid("4532015112830366"));
//! ```

pub mod billing;
pub mod chart;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{Role, SessionContext, SessionRegistry},
        error::{
            ChartError, ClinicError, ClinicResult, ConfigError, PaymentError, RecordError,
            RequestError, ValidationError,
        },
        model::{
            Attachment, ClinicalNote, DentalRecord, Invoice, InvoiceStatus, LineItem,
            NewAttachment, PatientProfile,
        },
        normalize::normalize_patient,
        service::ClinicApi,
    };

    // === Validation ===
    pub use crate::core::validation::{
        Validated, ValidatedBody,
        filters::{digits_only, format_card_number, mask_card_number, normalize_expiry_year},
        validators::{
            CardFieldError, CardRules, MAX_EXPIRY_YEARS_AHEAD, luhn_valid, validate_card_number,
            validate_cardholder_name, validate_cvv, validate_expiry,
        },
    };

    // === Dental Chart ===
    pub use crate::chart::{
        ChartView, DentalChart, Surface, ToothDialog, ToothDraft, ToothEdit, ToothNumber,
        ToothStatus, ToothSummary, resolve_status, save_tooth_edit,
    };

    // === Billing ===
    pub use crate::billing::{
        CardDetails, DEFAULT_FAILURE_MESSAGE, ModalPhase, PaymentForm, PaymentFormErrors,
        PaymentMethod, PaymentMethodKind, PaymentModal, PaymentRequest, SubmitOutcome,
        display_number, total_selected, unpaid,
    };

    // === Configuration ===
    pub use crate::config::{ClinicConfig, ServerConfig};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder, build_clinic_routes};

    // === Storage ===
    pub use crate::storage::InMemoryClinicStore;

    // === Re-exports from dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
