//! Server module exposing the clinic over REST
//!
//! This module provides a `ServerBuilder` that wires a [`ClinicApi`]
//! implementation, the session registry and the configured card rules into
//! an axum router with tracing and CORS layers.
//!
//! [`ClinicApi`]: crate::core::service::ClinicApi

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use router::build_clinic_routes;
