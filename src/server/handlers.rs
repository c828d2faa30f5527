//! HTTP handlers for dental records and invoices
//!
//! Handlers are thin: they resolve the session, parse path values and
//! delegate to the [`ClinicApi`] held in [`AppState`].

use crate::billing::form::PaymentRequest;
use crate::chart::codec::{DentalChart, ToothEdit, ToothSummary};
use crate::chart::editor::save_tooth_edit;
use crate::chart::tooth::{ToothNumber, ToothStatus};
use crate::core::auth::{SessionContext, SessionRegistry};
use crate::core::error::{ClinicResult, RequestError};
use crate::core::model::{DentalRecord, Invoice, NewAttachment};
use crate::core::service::ClinicApi;
use crate::core::validation::Validated;
use crate::core::validation::validators::CardRules;
use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ClinicApi>,
    pub sessions: SessionRegistry,
    pub rules: CardRules,
}

impl FromRef<AppState> for SessionRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for CardRules {
    fn from_ref(state: &AppState) -> Self {
        state.rules.clone()
    }
}

/// Request body for a tooth-level update
#[derive(Debug, Deserialize)]
pub struct ToothUpdateRequest {
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for a clinical note
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub note: String,
}

/// Response for a successful payment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub paid: Vec<Invoice>,
    pub total_paid: f64,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/patients/{id}/record
pub async fn get_record(
    State(state): State<AppState>,
    session: SessionContext,
    Path(patient_id): Path<String>,
) -> ClinicResult<Json<DentalRecord>> {
    let record = state.api.get_dental_record(&session, &patient_id).await?;
    Ok(Json(record))
}

/// PUT /api/patients/{id}/record/chart
///
/// The body replaces the whole chart and must be a JSON object.
pub async fn update_chart(
    State(state): State<AppState>,
    session: SessionContext,
    Path(patient_id): Path<String>,
    Json(body): Json<Value>,
) -> ClinicResult<Json<DentalRecord>> {
    if !body.is_object() {
        return Err(RequestError::BadRequest {
            message: "dental chart must be a JSON object".to_string(),
        }
        .into());
    }

    let chart = DentalChart::from_value(&body);
    let record = state
        .api
        .update_dental_chart(&session, &patient_id, chart)
        .await?;
    Ok(Json(record))
}

/// GET /api/patients/{id}/record/teeth
pub async fn get_teeth(
    State(state): State<AppState>,
    session: SessionContext,
    Path(patient_id): Path<String>,
) -> ClinicResult<Json<Vec<ToothSummary>>> {
    let record = state.api.get_dental_record(&session, &patient_id).await?;
    Ok(Json(record.tooth_summaries()))
}

/// PUT /api/patients/{id}/record/teeth/{tooth}
///
/// Sets every surface of the tooth to the given status.
pub async fn update_tooth(
    State(state): State<AppState>,
    session: SessionContext,
    Path((patient_id, tooth)): Path<(String, String)>,
    Json(body): Json<ToothUpdateRequest>,
) -> ClinicResult<Json<DentalRecord>> {
    let tooth: ToothNumber = tooth.parse()?;
    let status: ToothStatus = body.status.parse()?;

    let mut edit = ToothEdit::new(tooth, status);
    if let Some(notes) = body.notes {
        edit = edit.with_notes(notes);
    }

    let record = save_tooth_edit(state.api.as_ref(), &session, &patient_id, &edit).await?;
    Ok(Json(record))
}

/// POST /api/patients/{id}/record/attachments
pub async fn add_attachment(
    State(state): State<AppState>,
    session: SessionContext,
    Path(patient_id): Path<String>,
    Validated(attachment): Validated<NewAttachment>,
) -> ClinicResult<(StatusCode, Json<DentalRecord>)> {
    let record = state
        .api
        .add_attachment(&session, &patient_id, attachment)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/patients/{id}/record/notes
pub async fn add_note(
    State(state): State<AppState>,
    session: SessionContext,
    Path(patient_id): Path<String>,
    Json(body): Json<NoteRequest>,
) -> ClinicResult<(StatusCode, Json<DentalRecord>)> {
    let record = state
        .api
        .add_clinical_note(&session, &patient_id, &body.note)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/patients/{id}/invoices
pub async fn patient_invoices(
    State(state): State<AppState>,
    session: SessionContext,
    Path(patient_id): Path<String>,
) -> ClinicResult<Json<Vec<Invoice>>> {
    let invoices = state.api.patient_invoices(&session, &patient_id).await?;
    Ok(Json(invoices))
}

/// GET /api/my/record
pub async fn my_record(
    State(state): State<AppState>,
    session: SessionContext,
) -> ClinicResult<Json<DentalRecord>> {
    Ok(Json(state.api.my_dental_record(&session).await?))
}

/// GET /api/my/teeth
pub async fn my_teeth(
    State(state): State<AppState>,
    session: SessionContext,
) -> ClinicResult<Json<Vec<ToothSummary>>> {
    let record = state.api.my_dental_record(&session).await?;
    Ok(Json(record.tooth_summaries()))
}

/// GET /api/my/invoices
pub async fn my_invoices(
    State(state): State<AppState>,
    session: SessionContext,
) -> ClinicResult<Json<Vec<Invoice>>> {
    Ok(Json(state.api.my_invoices(&session).await?))
}

/// POST /api/my/invoices/pay
pub async fn pay_invoices(
    State(state): State<AppState>,
    session: SessionContext,
    Validated(request): Validated<PaymentRequest>,
) -> ClinicResult<Json<PaymentResponse>> {
    let paid = state.api.submit_payment(&session, request).await?;
    let total_paid = paid.iter().map(|inv| inv.total_amount).sum();
    Ok(Json(PaymentResponse { paid, total_paid }))
}
