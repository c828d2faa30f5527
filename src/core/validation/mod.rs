//! Validation and filtering system
//!
//! Filters normalize raw form input, validators check one card field each,
//! and the extractor runs the same checks on request bodies before they reach
//! the handlers.

pub mod extractor;
pub mod filters;
pub mod validators;

pub use extractor::{Validated, ValidatedBody};
pub use validators::{CardFieldError, CardRules, luhn_valid};
