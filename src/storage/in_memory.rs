//! In-memory implementation of ClinicApi for development and tests

use crate::billing::form::{PaymentMethodKind, PaymentRequest};
use crate::chart::codec::{DentalChart, ToothEdit};
use crate::core::auth::{Role, SessionContext};
use crate::core::error::{ClinicError, ClinicResult, PaymentError, RecordError, ValidationError};
use crate::core::model::{
    ClinicalNote, DentalRecord, Invoice, InvoiceStatus, LineItem, NewAttachment, PatientProfile,
};
use crate::core::normalize::normalize_patient;
use crate::core::service::ClinicApi;
use crate::core::validation::validators::CardRules;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use validator::Validate;

#[derive(Debug, Default)]
struct ClinicData {
    patients: HashMap<String, PatientProfile>,
    /// Keyed by patient id
    records: HashMap<String, DentalRecord>,
    invoices: HashMap<String, Invoice>,
}

impl ClinicData {
    fn patient(&self, patient_id: &str) -> ClinicResult<&PatientProfile> {
        self.patients.get(patient_id).ok_or_else(|| {
            RecordError::PatientNotFound {
                id: patient_id.to_string(),
            }
            .into()
        })
    }

    /// Patient profile owned by the session's user
    fn profile_of(&self, session: &SessionContext) -> ClinicResult<&PatientProfile> {
        self.patients
            .values()
            .find(|p| p.user_id.as_deref() == Some(session.user_id.as_str()))
            .ok_or_else(|| {
                RecordError::ProfileNotFound {
                    user_id: session.user_id.clone(),
                }
                .into()
            })
    }

    /// Record of a patient, created empty when missing
    fn record_mut(&mut self, patient_id: &str) -> ClinicResult<&mut DentalRecord> {
        self.patient(patient_id)?;
        Ok(self
            .records
            .entry(patient_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(patient_id = %patient_id, "creating empty dental record");
                DentalRecord::empty(patient_id)
            }))
    }

    fn invoices_of(&self, patient_id: &str) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .values()
            .filter(|inv| inv.patient_id == patient_id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| {
            b.issue_date
                .cmp(&a.issue_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        invoices
    }
}

/// In-memory clinic backend
///
/// Reproduces the record and invoice services of the real backend,
/// including role checks. Uses one RwLock so a payment over several
/// invoices is applied atomically.
#[derive(Clone, Default)]
pub struct InMemoryClinicStore {
    data: Arc<RwLock<ClinicData>>,
    rules: CardRules,
}

impl InMemoryClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that checks payments against `rules`
    pub fn with_rules(rules: CardRules) -> Self {
        Self {
            data: Arc::default(),
            rules,
        }
    }

    fn read(&self) -> ClinicResult<RwLockReadGuard<'_, ClinicData>> {
        self.data
            .read()
            .map_err(|e| ClinicError::internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> ClinicResult<RwLockWriteGuard<'_, ClinicData>> {
        self.data
            .write()
            .map_err(|e| ClinicError::internal(format!("Failed to acquire write lock: {}", e)))
    }

    pub fn register_patient(&self, profile: PatientProfile) -> ClinicResult<PatientProfile> {
        let mut data = self.write()?;
        data.patients.insert(profile.id.clone(), profile.clone());
        tracing::debug!(patient_id = %profile.id, "patient registered");
        Ok(profile)
    }

    /// Register a patient from a raw backend payload
    pub fn register_patient_json(&self, payload: &Value) -> ClinicResult<PatientProfile> {
        let profile = normalize_patient(payload)?;
        self.register_patient(profile)
    }

    pub fn patient(&self, patient_id: &str) -> ClinicResult<Option<PatientProfile>> {
        Ok(self.read()?.patients.get(patient_id).cloned())
    }

    /// Issue an unpaid invoice for a patient
    pub fn issue_invoice(
        &self,
        patient_id: &str,
        issue_date: NaiveDate,
        line_items: Vec<LineItem>,
    ) -> ClinicResult<Invoice> {
        let mut data = self.write()?;
        data.patient(patient_id)?;
        let invoice = Invoice::issue(patient_id, issue_date, line_items);
        data.invoices.insert(invoice.id.clone(), invoice.clone());
        tracing::info!(
            patient_id = %patient_id,
            invoice_id = %invoice.id,
            total = invoice.total_amount,
            "invoice issued"
        );
        Ok(invoice)
    }

    pub fn invoice(&self, invoice_id: &str) -> ClinicResult<Option<Invoice>> {
        Ok(self.read()?.invoices.get(invoice_id).cloned())
    }
}

#[async_trait]
impl ClinicApi for InMemoryClinicStore {
    async fn get_dental_record(
        &self,
        session: &SessionContext,
        patient_id: &str,
    ) -> ClinicResult<DentalRecord> {
        session.require_role(Role::Dentist)?;
        let mut data = self.write()?;
        Ok(data.record_mut(patient_id)?.clone())
    }

    async fn my_dental_record(&self, session: &SessionContext) -> ClinicResult<DentalRecord> {
        session.require_role(Role::Patient)?;
        let mut data = self.write()?;
        let patient_id = data.profile_of(session)?.id.clone();
        Ok(data.record_mut(&patient_id)?.clone())
    }

    async fn update_dental_chart(
        &self,
        session: &SessionContext,
        patient_id: &str,
        chart: DentalChart,
    ) -> ClinicResult<DentalRecord> {
        session.require_role(Role::Dentist)?;
        let mut data = self.write()?;
        let record = data.record_mut(patient_id)?;
        record.dental_chart = chart;
        record.touch();
        tracing::info!(patient_id = %patient_id, teeth = record.dental_chart.len(), "dental chart updated");
        Ok(record.clone())
    }

    async fn update_tooth(
        &self,
        session: &SessionContext,
        patient_id: &str,
        edit: &ToothEdit,
    ) -> ClinicResult<DentalRecord> {
        session.require_role(Role::Dentist)?;
        let mut data = self.write()?;
        let record = data.record_mut(patient_id)?;
        record.dental_chart = edit.apply_to(&record.dental_chart);
        if let Some(note) = edit.note_text() {
            record.general_notes.push(ClinicalNote {
                note,
                timestamp: Utc::now(),
                dentist_name: session.display_name.clone(),
            });
        }
        record.touch();
        tracing::info!(
            patient_id = %patient_id,
            tooth = %edit.tooth,
            status = %edit.status,
            "tooth updated"
        );
        Ok(record.clone())
    }

    async fn add_attachment(
        &self,
        session: &SessionContext,
        patient_id: &str,
        attachment: NewAttachment,
    ) -> ClinicResult<DentalRecord> {
        session.require_role(Role::Dentist)?;
        attachment.validate().map_err(ValidationError::from)?;

        let mut data = self.write()?;
        let record = data.record_mut(patient_id)?;
        let attachment = attachment.into_attachment(Utc::now());
        tracing::info!(
            patient_id = %patient_id,
            filename = %attachment.filename,
            file_type = %attachment.file_type,
            "attachment added"
        );
        record.attachments.push(attachment);
        record.touch();
        Ok(record.clone())
    }

    async fn add_clinical_note(
        &self,
        session: &SessionContext,
        patient_id: &str,
        note: &str,
    ) -> ClinicResult<DentalRecord> {
        session.require_role(Role::Dentist)?;
        let note = note.trim();
        if note.is_empty() {
            return Err(ValidationError::FieldError {
                field: "note".to_string(),
                message: "Note is required".to_string(),
            }
            .into());
        }

        let mut data = self.write()?;
        let record = data.record_mut(patient_id)?;
        record.general_notes.push(ClinicalNote {
            note: note.to_string(),
            timestamp: Utc::now(),
            dentist_name: session.display_name.clone(),
        });
        record.touch();
        Ok(record.clone())
    }

    async fn patient_invoices(
        &self,
        session: &SessionContext,
        patient_id: &str,
    ) -> ClinicResult<Vec<Invoice>> {
        session.require_role(Role::Dentist)?;
        let data = self.read()?;
        data.patient(patient_id)?;
        Ok(data.invoices_of(patient_id))
    }

    async fn my_invoices(&self, session: &SessionContext) -> ClinicResult<Vec<Invoice>> {
        session.require_role(Role::Patient)?;
        let data = self.read()?;
        let profile = data.profile_of(session)?;
        Ok(data.invoices_of(&profile.id))
    }

    async fn submit_payment(
        &self,
        session: &SessionContext,
        request: PaymentRequest,
    ) -> ClinicResult<Vec<Invoice>> {
        session.require_role(Role::Patient)?;
        if request.payment_method.kind != PaymentMethodKind::Card {
            return Err(PaymentError::UnsupportedMethod {
                method: request.payment_method.kind.to_string(),
            }
            .into());
        }
        request.check(Utc::now().date_naive(), &self.rules)?;

        let mut data = self.write()?;
        let patient_id = data.profile_of(session)?.id.clone();

        // Check every invoice before touching any of them
        let ids: BTreeSet<&str> = request.invoice_ids.iter().map(String::as_str).collect();
        for id in &ids {
            let invoice = data.invoices.get(*id).ok_or_else(|| RecordError::InvoiceNotFound {
                id: id.to_string(),
            })?;
            if invoice.patient_id != patient_id {
                return Err(RecordError::InvoiceNotOwned {
                    invoice_id: id.to_string(),
                }
                .into());
            }
            if invoice.is_paid() {
                return Err(RecordError::InvoiceAlreadyPaid {
                    invoice_id: id.to_string(),
                }
                .into());
            }
        }

        let now = Utc::now();
        let mut paid = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(invoice) = data.invoices.get_mut(id) {
                invoice.status = InvoiceStatus::Paid;
                invoice.updated_at = now;
                paid.push(invoice.clone());
            }
        }

        tracing::info!(patient_id = %patient_id, invoices = paid.len(), "invoices paid");
        Ok(paid)
    }
}
