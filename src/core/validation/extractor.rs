//! Axum extractor for validated request bodies
//!
//! This module provides the `Validated<T>` extractor that deserializes a
//! JSON body and validates it before it reaches handlers.

use super::validators::CardRules;
use crate::billing::form::PaymentRequest;
use crate::core::error::{ClinicError, ValidationError};
use crate::core::model::NewAttachment;
use axum::{
    Json,
    extract::{FromRef, FromRequest, Request},
};
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Request bodies that can check themselves
pub trait ValidatedBody: DeserializeOwned {
    /// Validate against the configured card rules as of `today`
    fn check(&self, today: NaiveDate, rules: &CardRules) -> Result<(), ValidationError>;
}

impl ValidatedBody for PaymentRequest {
    fn check(&self, today: NaiveDate, rules: &CardRules) -> Result<(), ValidationError> {
        PaymentRequest::check(self, today, rules)
    }
}

impl ValidatedBody for NewAttachment {
    fn check(&self, _today: NaiveDate, _rules: &CardRules) -> Result<(), ValidationError> {
        self.validate().map_err(ValidationError::from)
    }
}

/// Axum extractor that deserializes and validates a JSON body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn pay(
///     Validated(request): Validated<PaymentRequest>,
/// ) -> Result<Json<Vec<Invoice>>, ClinicError> {
///     // request has passed the card validators
/// }
/// ```
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: ValidatedBody + Send,
    CardRules: FromRef<S>,
{
    type Rejection = ClinicError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<T> = Json::from_request(req, state).await.map_err(|e| {
            ValidationError::InvalidJson {
                message: e.body_text(),
            }
        })?;

        let rules = CardRules::from_ref(state);
        let today = Utc::now().date_naive();
        if let Err(errors) = payload.check(today, &rules) {
            tracing::debug!(error = %errors, "request body rejected");
            return Err(errors.into());
        }

        Ok(Validated(payload))
    }
}
