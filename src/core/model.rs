//! Canonical clinic records exchanged with the backend

use crate::chart::codec::{DentalChart, TOOTH_NOTE_PREFIX, ToothSummary};
use crate::chart::tooth::ToothNumber;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A patient's dental record: chart, attachments and clinical notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DentalRecord {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub dental_chart: DentalChart,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub general_notes: Vec<ClinicalNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DentalRecord {
    /// Fresh record with an empty chart
    pub fn empty(patient_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.into(),
            dental_chart: DentalChart::new(),
            attachments: Vec::new(),
            general_notes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Text of the most recent note written for `tooth`, prefix stripped
    pub fn latest_tooth_note(&self, tooth: ToothNumber) -> Option<&str> {
        let prefix = format!("{}{}: ", TOOTH_NOTE_PREFIX, tooth);
        self.general_notes
            .iter()
            .rev()
            .find_map(|n| n.note.strip_prefix(prefix.as_str()))
    }

    /// 32 tooth summaries with the latest tooth notes attached
    pub fn tooth_summaries(&self) -> Vec<ToothSummary> {
        self.dental_chart
            .summarize()
            .into_iter()
            .map(|mut summary| {
                summary.notes = self
                    .latest_tooth_note(summary.tooth_number)
                    .map(str::to_string);
                summary
            })
            .collect()
    }
}

/// An image or document attached to a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    /// PANTOMOGRAPHIC, INTRAORAL, XRAY, ...
    pub file_type: String,
    pub storage_url: String,
    pub upload_date: DateTime<Utc>,
}

/// Attachment upload request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAttachment {
    #[validate(length(min = 1, max = 255, message = "Filename is required"))]
    pub filename: String,
    #[validate(length(min = 1, max = 64, message = "File type is required"))]
    pub file_type: String,
    /// Defaults to `/storage/images/<filename>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_url: Option<String>,
}

impl NewAttachment {
    pub fn new(filename: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_type: file_type.into(),
            storage_url: None,
        }
    }

    pub fn into_attachment(self, uploaded_at: DateTime<Utc>) -> Attachment {
        let storage_url = self
            .storage_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("/storage/images/{}", self.filename));
        Attachment {
            filename: self.filename,
            file_type: self.file_type,
            storage_url,
            upload_date: uploaded_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalNote {
    pub note: String,
    pub timestamp: DateTime<Utc>,
    pub dentist_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Unpaid,
    Partial,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub cost: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_code: Option<String>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, cost: f64, quantity: u32) -> Self {
        Self {
            description: description.into(),
            cost,
            quantity,
            procedure_code: None,
        }
    }

    pub fn total(&self) -> f64 {
        self.cost * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub total_amount: f64,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Unpaid invoice whose total is the sum of its line items
    pub fn issue(patient_id: impl Into<String>, issue_date: NaiveDate, line_items: Vec<LineItem>) -> Self {
        let now = Utc::now();
        let total_amount = line_items.iter().map(LineItem::total).sum();
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.into(),
            invoice_number: None,
            issue_date,
            line_items,
            total_amount,
            status: InvoiceStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

/// Patient profile in its single canonical shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: String,
    /// Login account owning this profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<String>,
}

impl PatientProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::tooth::ToothStatus;
    use serde_json::json;

    #[test]
    fn test_record_with_null_chart_deserializes() {
        let record: DentalRecord = serde_json::from_value(json!({
            "id": "r1",
            "patientId": "p1",
            "dentalChart": null,
            "createdAt": "2025-01-01T10:00:00Z",
            "updatedAt": "2025-01-01T10:00:00Z"
        }))
        .unwrap();
        assert!(record.dental_chart.is_empty());
        assert!(record.attachments.is_empty());
    }

    #[test]
    fn test_tooth_summaries_carry_latest_note() {
        let mut record = DentalRecord::empty("p1");
        let tooth = ToothNumber::new(11).unwrap();
        record.dental_chart.set_tooth_status(tooth, ToothStatus::Filling);
        for note in ["Tooth 11: first", "Tooth 12: other", "Tooth 11: second"] {
            record.general_notes.push(ClinicalNote {
                note: note.to_string(),
                timestamp: Utc::now(),
                dentist_name: "dr".to_string(),
            });
        }

        let summaries = record.tooth_summaries();
        let eleven = summaries.iter().find(|s| s.tooth_number == tooth).unwrap();
        assert_eq!(eleven.status, ToothStatus::Filling);
        assert_eq!(eleven.notes.as_deref(), Some("second"));
        let eighteen = &summaries[0];
        assert_eq!(eighteen.notes, None);
    }

    #[test]
    fn test_invoice_total_from_line_items() {
        let invoice = Invoice::issue(
            "p1",
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            vec![LineItem::new("Filling", 250.0, 2), LineItem::new("Check-up", 100.0, 1)],
        );
        assert_eq!(invoice.total_amount, 600.0);
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    }

    #[test]
    fn test_new_attachment_default_storage_url() {
        let attachment = NewAttachment::new("pano.png", "PANTOMOGRAPHIC").into_attachment(Utc::now());
        assert_eq!(attachment.storage_url, "/storage/images/pano.png");
    }

    #[test]
    fn test_new_attachment_validation() {
        assert!(NewAttachment::new("", "XRAY").validate().is_err());
        assert!(NewAttachment::new("a.png", "XRAY").validate().is_ok());
    }
}
