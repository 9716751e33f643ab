//! Admin HTTP server

use crate::admin::{self, LdapAdminState};
use crate::telemetry::{metrics_handler, metrics_middleware, MetricsRecorder};
use axum::{middleware, routing::get, Json, Router};
use ldapfed_auth::IdentityService;
use ldapfed_core::{config::LdapfedConfig, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "healthy".to_string(),
        version: ldapfed_core::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Build the application router.
///
/// `/metrics` is only mounted when a recorder is supplied.
pub fn create_router(ldap: Arc<LdapAdminState>, metrics: Option<Arc<MetricsRecorder>>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/admin/ldap", admin::ldap_routes().with_state(ldap));

    let router = match metrics {
        Some(metrics) => router.route("/metrics", get(metrics_handler).with_state(metrics)),
        None => router,
    };

    router.layer(middleware::from_fn(metrics_middleware)).layer(
        TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(false)),
    )
}

/// Admin server
pub struct AdminServer {
    config: LdapfedConfig,
}

impl AdminServer {
    pub fn new(config: LdapfedConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        self.config.validate()?;

        let metrics = Arc::new(MetricsRecorder::install()?);
        info!("Prometheus metrics initialized");

        let service = IdentityService::from_config(&self.config);
        if service.is_none() {
            info!("LDAP is disabled, admin endpoints will report it as not enabled");
        }

        let request_timeout = Duration::from_secs(self.config.server.request_timeout_secs);
        let ldap = Arc::new(LdapAdminState::new(service, request_timeout));

        let app = create_router(ldap, Some(metrics));
        let addr = format!("{}:{}", self.config.server.bind_address, self.config.server.port);
        let listener = TcpListener::bind(&addr).await?;

        info!("Ldapfed admin server listening on http://{}", addr);
        info!("LDAP admin API available at http://{}/api/admin/ldap", addr);
        info!("Prometheus metrics at http://{}/metrics", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}
