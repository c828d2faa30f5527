//! Persisting tooth edits through the clinic API

use super::codec::ToothEdit;
use crate::core::auth::SessionContext;
use crate::core::error::ClinicResult;
use crate::core::model::DentalRecord;
use crate::core::service::ClinicApi;

/// Save one tooth edit
///
/// The edit is expanded against the chart as stored, not a copy held by
/// the caller, and a non-blank note is recorded in the same write. Either
/// both land or neither does. Saving the same edit again leaves the chart
/// as it is but appends the note a second time.
pub async fn save_tooth_edit(
    api: &dyn ClinicApi,
    session: &SessionContext,
    patient_id: &str,
    edit: &ToothEdit,
) -> ClinicResult<DentalRecord> {
    let record = api.update_tooth(session, patient_id, edit).await?;

    tracing::debug!(
        patient_id = %patient_id,
        tooth = %edit.tooth,
        notes = record.general_notes.len(),
        "tooth edit saved"
    );
    Ok(record)
}
