//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::build_clinic_routes;
use crate::config::ClinicConfig;
use crate::core::auth::SessionRegistry;
use crate::core::service::ClinicApi;
use anyhow::Result;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the clinic HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_api(InMemoryClinicStore::new())
///     .with_config(ClinicConfig::default_config())
///     .build()?;
/// ```
pub struct ServerBuilder {
    api: Option<Arc<dyn ClinicApi>>,
    sessions: SessionRegistry,
    config: ClinicConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            api: None,
            sessions: SessionRegistry::new(),
            config: ClinicConfig::default_config(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the clinic backend (required)
    pub fn with_api(mut self, api: impl ClinicApi + 'static) -> Self {
        self.api = Some(Arc::new(api));
        self
    }

    /// Set an already shared clinic backend
    pub fn with_shared_api(mut self, api: Arc<dyn ClinicApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Use an existing session registry instead of an empty one
    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_config(mut self, config: ClinicConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server, e.g. a login endpoint
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Registry used to resolve bearer tokens
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Build the final router with tracing and CORS layers
    pub fn build(self) -> Result<Router> {
        self.config.validate()?;

        let api = self
            .api
            .ok_or_else(|| anyhow::anyhow!("ClinicApi is required. Call .with_api()"))?;

        let state = AppState {
            api,
            sessions: self.sessions,
            rules: self.config.payment.clone(),
        };

        let mut app = build_clinic_routes(state);
        for routes in self.custom_routes {
            app = app.merge(routes);
        }

        let cors = cors_layer(&self.config.server.cors_allowed_origins)?;
        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_api(store)
    ///     .serve("127.0.0.1:8080").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on the configured bind address
    pub async fn serve_configured(self) -> Result<()> {
        let addr = self.config.server.bind_addr()?.to_string();
        self.serve(&addr).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Wait for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryClinicStore;

    #[test]
    fn test_build_requires_api() {
        let err = ServerBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("ClinicApi is required"));
    }

    #[test]
    fn test_build_with_in_memory_store() {
        assert!(
            ServerBuilder::new()
                .with_api(InMemoryClinicStore::new())
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ClinicConfig::default_config();
        config.payment.max_cvv_digits = 2;
        let result = ServerBuilder::new()
            .with_api(InMemoryClinicStore::new())
            .with_config(config)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_cors_origin_rejected() {
        assert!(cors_layer(&["http://ok.example".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
