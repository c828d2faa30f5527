//! Service trait for the clinic backend
//!
//! [`ClinicApi`] is the network-collaborator contract: every call carries
//! an explicit [`SessionContext`]. The in-memory store implements it for the
//! server and tests; an HTTP client against the real backend would too.

use crate::billing::form::PaymentRequest;
use crate::chart::codec::{DentalChart, ToothEdit};
use crate::core::auth::SessionContext;
use crate::core::error::ClinicResult;
use crate::core::model::{DentalRecord, Invoice, NewAttachment};
use async_trait::async_trait;

/// Dental record and invoice operations
#[async_trait]
pub trait ClinicApi: Send + Sync {
    /// Record of a patient, created empty on first read (dentist)
    async fn get_dental_record(
        &self,
        session: &SessionContext,
        patient_id: &str,
    ) -> ClinicResult<DentalRecord>;

    /// Record of the session's own patient profile (patient)
    async fn my_dental_record(&self, session: &SessionContext) -> ClinicResult<DentalRecord>;

    /// Replace the whole chart of a patient (dentist)
    async fn update_dental_chart(
        &self,
        session: &SessionContext,
        patient_id: &str,
        chart: DentalChart,
    ) -> ClinicResult<DentalRecord>;

    /// Apply a tooth edit to the stored chart (dentist)
    ///
    /// The edit and its note, if any, land in one write against the chart
    /// as currently stored, so edits to other teeth are never overwritten.
    async fn update_tooth(
        &self,
        session: &SessionContext,
        patient_id: &str,
        edit: &ToothEdit,
    ) -> ClinicResult<DentalRecord>;

    /// Append an attachment (dentist)
    async fn add_attachment(
        &self,
        session: &SessionContext,
        patient_id: &str,
        attachment: NewAttachment,
    ) -> ClinicResult<DentalRecord>;

    /// Append a clinical note signed with the session's display name (dentist)
    async fn add_clinical_note(
        &self,
        session: &SessionContext,
        patient_id: &str,
        note: &str,
    ) -> ClinicResult<DentalRecord>;

    /// Invoices of a patient (dentist)
    async fn patient_invoices(
        &self,
        session: &SessionContext,
        patient_id: &str,
    ) -> ClinicResult<Vec<Invoice>>;

    /// Invoices of the session's own patient profile (patient)
    async fn my_invoices(&self, session: &SessionContext) -> ClinicResult<Vec<Invoice>>;

    /// Pay the referenced invoices together; returns them as paid (patient)
    async fn submit_payment(
        &self,
        session: &SessionContext,
        request: PaymentRequest,
    ) -> ClinicResult<Vec<Invoice>>;
}
