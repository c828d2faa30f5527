//! Dentist Plus server
//!
//! Usage: `dentist-plus [config.yaml]`
//!
//! Starts the REST surface over an in-memory clinic seeded with a demo
//! patient, two invoices and one session per role.

use anyhow::Result;
use chrono::Utc;
use dentist_plus::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "loading configuration");
            ClinicConfig::from_yaml_file(&path)?
        }
        None => ClinicConfig::default_config(),
    };

    let store = InMemoryClinicStore::with_rules(config.payment.clone());
    let sessions = SessionRegistry::new();
    let demo = seed_demo_data(&store, &sessions)?;

    // Printed once for local use; tokens never go through tracing
    println!("Demo patient: {}", demo.patient_id);
    println!("Dentist token: {}", demo.dentist_token);
    println!("Patient token: {}", demo.patient_token);

    let addr = config.server.bind_addr()?.to_string();
    ServerBuilder::new()
        .with_api(store)
        .with_sessions(sessions)
        .with_config(config)
        .serve(&addr)
        .await
}

/// Ids and bearer tokens of the seeded demo data
struct DemoSeed {
    patient_id: String,
    dentist_token: String,
    patient_token: String,
}

fn seed_demo_data(store: &InMemoryClinicStore, sessions: &SessionRegistry) -> Result<DemoSeed> {
    let patient = store.register_patient_json(&json!({
        "id": "patient-1",
        "userId": "user-patient-1",
        "firstName": "Anna",
        "lastName": "Nowak",
        "email": "anna.nowak@example.com",
        "contactPhone": "+48 600 100 200",
        "dateOfBirth": "1990-04-02"
    }))?;

    let today = Utc::now().date_naive();
    store.issue_invoice(
        &patient.id,
        today,
        vec![
            LineItem::new("Check-up", 120.0, 1),
            LineItem::new("Composite filling", 250.0, 2),
        ],
    )?;
    store.issue_invoice(&patient.id, today, vec![LineItem::new("Scaling", 180.0, 1)])?;

    let dentist = sessions.issue("user-dentist-1", "Dr. Jan Kowalski", Role::Dentist)?;
    let patient_session = sessions.issue(
        patient.user_id.clone().unwrap_or_default(),
        patient.full_name(),
        Role::Patient,
    )?;

    tracing::info!(patient_id = %patient.id, "demo patient seeded");
    tracing::debug!(dentist = ?dentist, patient = ?patient_session, "demo sessions issued");
    Ok(DemoSeed {
        patient_id: patient.id,
        dentist_token: dentist.token,
        patient_token: patient_session.token,
    })
}
