//! Tests for loading configuration from YAML files
//!
//! These tests verify that:
//! - A config file on disk drives the server and card limits
//! - Invalid files are rejected before the server is built
//! - Configured card limits reach the payment endpoint

use axum_test::TestServer;
use chrono::Datelike;
use dentist_plus::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yaml.as_bytes())
        .expect("Failed to write config");
    file
}

fn path_of(file: &NamedTempFile) -> &str {
    file.path().to_str().expect("Temp path is not UTF-8")
}

#[test]
fn test_load_full_config_from_file() {
    let file = write_config(
        r#"
server:
  bind: "0.0.0.0:9090"
  cors_allowed_origins:
    - "https://clinic.example.com"
payment:
  min_card_digits: 15
  max_card_digits: 16
  min_name_length: 2
  max_expiry_years_ahead: 10
  min_cvv_digits: 3
  max_cvv_digits: 3
"#,
    );

    let config = ClinicConfig::from_yaml_file(path_of(&file)).unwrap();

    assert_eq!(config.server.bind_addr().unwrap().port(), 9090);
    assert_eq!(
        config.server.cors_allowed_origins,
        vec!["https://clinic.example.com".to_string()]
    );
    assert_eq!(
        config.payment,
        CardRules {
            min_card_digits: 15,
            max_card_digits: 16,
            min_name_length: 2,
            max_expiry_years_ahead: 10,
            min_cvv_digits: 3,
            max_cvv_digits: 3,
        }
    );
}

#[test]
fn test_empty_mapping_uses_defaults() {
    let file = write_config("{}\n");
    let config = ClinicConfig::from_yaml_file(path_of(&file)).unwrap();
    assert_eq!(config, ClinicConfig::default_config());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    assert!(ClinicConfig::from_yaml_file(path.to_str().unwrap()).is_err());
}

#[test]
fn test_zero_minimum_is_rejected() {
    let file = write_config("payment:\n  min_cvv_digits: 0\n");
    let err = ClinicConfig::from_yaml_file(path_of(&file)).unwrap_err();
    assert!(err.to_string().contains("payment.min_cvv_digits"));
}

#[test]
fn test_oversized_expiry_horizon_is_rejected() {
    for value in ["101", "2147483647", "4294967295"] {
        let file = write_config(&format!("payment:\n  max_expiry_years_ahead: {}\n", value));
        let err = ClinicConfig::from_yaml_file(path_of(&file)).unwrap_err();
        assert!(
            err.to_string().contains("payment.max_expiry_years_ahead"),
            "{}: {}",
            value,
            err
        );
    }
}

#[test]
fn test_largest_expiry_horizon_still_validates_cards() {
    let file = write_config("payment:\n  max_expiry_years_ahead: 100\n");
    let config = ClinicConfig::from_yaml_file(path_of(&file)).unwrap();

    let today = Utc::now().date_naive();
    let next_year = (today.year() + 1).to_string();
    let last_year = (today.year() + 100).to_string();
    assert_eq!(validate_expiry("01", &next_year, today, &config.payment), Ok(()));
    assert_eq!(validate_expiry("01", &last_year, today, &config.payment), Ok(()));
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let file = write_config("payment: [not, a, map");
    assert!(ClinicConfig::from_yaml_file(path_of(&file)).is_err());
}

#[test]
fn test_builder_rejects_invalid_config() {
    let mut config = ClinicConfig::default_config();
    config.payment.max_card_digits = 10;

    let result = ServerBuilder::new()
        .with_api(InMemoryClinicStore::new())
        .with_config(config)
        .build();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_configured_cvv_limit_applies_to_payments() {
    let file = write_config("payment:\n  max_cvv_digits: 3\n");
    let config = ClinicConfig::from_yaml_file(path_of(&file)).unwrap();

    let store = InMemoryClinicStore::with_rules(config.payment.clone());
    let patient = store
        .register_patient_json(&json!({ "id": "p1", "userId": "u1", "firstName": "Ala" }))
        .unwrap();
    let invoice = store
        .issue_invoice(
            &patient.id,
            Utc::now().date_naive(),
            vec![LineItem::new("Check-up", 100.0, 1)],
        )
        .unwrap();

    let sessions = SessionRegistry::new();
    let token = sessions.issue("u1", "Ala", Role::Patient).unwrap().token;
    let app = ServerBuilder::new()
        .with_api(store)
        .with_sessions(sessions)
        .with_config(config)
        .build()
        .unwrap();
    let server = TestServer::try_new(app).expect("Failed to create test server");

    let response = server
        .post("/api/my/invoices/pay")
        .authorization_bearer(&token)
        .json(&json!({
            "invoiceIds": [invoice.id],
            "paymentMethod": {
                "type": "CARD",
                "cardDetails": {
                    "cardNumber": "4532015112830366",
                    "cardholderName": "Ala Nowak",
                    "expiryMonth": "12",
                    "expiryYear": (Utc::now().year() + 1).to_string(),
                    "cvv": "1234"
                }
            }
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["details"]["fields"][0]["field"], "cvv");
}
