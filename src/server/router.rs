//! Router for the clinic REST surface

use super::handlers::{
    AppState, add_attachment, add_note, get_record, get_teeth, health, my_invoices, my_record,
    my_teeth, patient_invoices, pay_invoices, update_chart, update_tooth,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build the clinic routes
///
/// - GET /health
/// - GET /api/patients/{id}/record - Dental record (dentist)
/// - PUT /api/patients/{id}/record/chart - Replace the chart (dentist)
/// - GET /api/patients/{id}/record/teeth - 32 tooth summaries (dentist)
/// - PUT /api/patients/{id}/record/teeth/{tooth} - Set one tooth (dentist)
/// - POST /api/patients/{id}/record/attachments - Add an attachment (dentist)
/// - POST /api/patients/{id}/record/notes - Add a clinical note (dentist)
/// - GET /api/patients/{id}/invoices - Patient invoices (dentist)
/// - GET /api/my/record, /api/my/teeth, /api/my/invoices (patient)
/// - POST /api/my/invoices/pay - Pay invoices by card (patient)
pub fn build_clinic_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/patients/{id}/record", get(get_record))
        .route("/api/patients/{id}/record/chart", put(update_chart))
        .route("/api/patients/{id}/record/teeth", get(get_teeth))
        .route("/api/patients/{id}/record/teeth/{tooth}", put(update_tooth))
        .route(
            "/api/patients/{id}/record/attachments",
            post(add_attachment),
        )
        .route("/api/patients/{id}/record/notes", post(add_note))
        .route("/api/patients/{id}/invoices", get(patient_invoices))
        .route("/api/my/record", get(my_record))
        .route("/api/my/teeth", get(my_teeth))
        .route("/api/my/invoices", get(my_invoices))
        .route("/api/my/invoices/pay", post(pay_invoices))
        .with_state(state)
}
