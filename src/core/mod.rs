//! Core module containing the clinic's types, errors and service contract

pub mod auth;
pub mod error;
pub mod model;
pub mod normalize;
pub mod service;
pub mod validation;

pub use auth::{Role, SessionContext, SessionRegistry};
pub use error::{ClinicError, ClinicResult};
pub use model::{
    Attachment, ClinicalNote, DentalRecord, Invoice, InvoiceStatus, LineItem, NewAttachment,
    PatientProfile,
};
pub use normalize::normalize_patient;
pub use service::ClinicApi;
