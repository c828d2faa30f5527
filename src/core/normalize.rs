//! Normalization of loosely shaped backend payloads
//!
//! Patient payloads arrive with optional fields and several spellings of the
//! same concept (`phone` / `contactPhone` / `contact_phone`, camelCase and
//! snake_case keys, a nested `user` object). They are folded into one
//! [`PatientProfile`] here so nothing downstream sees the variants.

use crate::core::error::ValidationError;
use crate::core::model::PatientProfile;
use chrono::NaiveDate;
use serde_json::Value;

/// Normalize a raw patient payload into its canonical shape
pub fn normalize_patient(value: &Value) -> Result<PatientProfile, ValidationError> {
    let object = value.as_object().ok_or_else(|| ValidationError::InvalidJson {
        message: "patient payload must be an object".to_string(),
    })?;

    let id = first_string(value, &["id", "_id", "patientId", "patient_id"]).ok_or_else(|| {
        ValidationError::FieldError {
            field: "id".to_string(),
            message: "Patient id is required".to_string(),
        }
    })?;

    let user_id = first_string(value, &["userId", "user_id"]).or_else(|| {
        object
            .get("user")
            .and_then(|user| first_string(user, &["id", "userId"]))
    });

    let email = first_string(value, &["email"]).or_else(|| {
        object
            .get("user")
            .and_then(|user| first_string(user, &["email"]))
    });

    let date_of_birth = first_string(value, &["dateOfBirth", "date_of_birth", "dob"])
        .and_then(|raw| parse_date(&raw));

    Ok(PatientProfile {
        id,
        user_id,
        first_name: first_string(value, &["firstName", "first_name"]).unwrap_or_default(),
        last_name: first_string(value, &["lastName", "last_name"]).unwrap_or_default(),
        email,
        phone: first_string(
            value,
            &["contactPhone", "contact_phone", "phone", "phoneNumber", "phone_number"],
        ),
        date_of_birth,
        address: first_string(value, &["address"]),
        insurance: first_string(
            value,
            &["insuranceDetails", "insurance_details", "insuranceNumber", "insurance_number"],
        ),
    })
}

/// First non-blank string (or number) among `keys`, trimmed
fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts `YYYY-MM-DD` or a timestamp starting with it
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
