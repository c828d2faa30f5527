//! Billing: payment form, invoice helpers and the payment modal

pub mod form;
pub mod invoices;
pub mod modal;

pub use form::{
    CardDetails, PaymentForm, PaymentFormErrors, PaymentMethod, PaymentMethodKind, PaymentRequest,
};
pub use invoices::{display_number, total_selected, unpaid};
pub use modal::{DEFAULT_FAILURE_MESSAGE, ModalPhase, PaymentModal, SubmitOutcome};
