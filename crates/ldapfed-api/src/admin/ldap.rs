//! LDAP Admin API handlers
//!
//! Provides endpoints for:
//! - Identity lookup by login
//! - Federation status
//! - Credential verification

use crate::error::ApiError;
use axum::{
    extract::{Path, State},
    Json,
};
use ldapfed_auth::IdentityService;
use ldapfed_core::types::{Credentials, ExternalUserInfo, LdapUserView, ServerStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// LDAP state for admin API
pub struct LdapAdminState {
    /// `None` when LDAP is disabled
    pub service: Option<IdentityService>,

    /// Overall deadline for one request
    pub request_timeout: Duration,
}

impl LdapAdminState {
    pub fn new(service: Option<IdentityService>, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(30))
    }

    fn service(&self) -> Result<&IdentityService, ApiError> {
        self.service.as_ref().ok_or(ApiError::LdapDisabled)
    }

    async fn within<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: std::future::Future<Output = ldapfed_core::Result<T>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result.map_err(ApiError::from),
            Err(_) => Err(ApiError::DeadlineExceeded(self.request_timeout)),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/admin/ldap/status - Reachability of every configured server
pub async fn get_ldap_status(
    State(state): State<Arc<LdapAdminState>>,
) -> Result<Json<Vec<ServerStatus>>, ApiError> {
    debug!("GET /api/admin/ldap/status");

    let service = state.service()?;
    let statuses = service
        .status_within(state.request_timeout)
        .await
        .ok_or(ApiError::DeadlineExceeded(state.request_timeout))?;

    Ok(Json(statuses))
}

/// GET /api/admin/ldap/{username} - Identity view for a login
pub async fn get_ldap_user(
    State(state): State<Arc<LdapAdminState>>,
    Path(username): Path<String>,
) -> Result<Json<LdapUserView>, ApiError> {
    debug!("GET /api/admin/ldap/{}", username);

    let service = state.service()?;
    let view = state.within(service.resolve(&username)).await?;

    Ok(Json(view))
}

/// POST /api/admin/ldap/authenticate - Verify credentials against the federation
pub async fn authenticate_ldap_user(
    State(state): State<Arc<LdapAdminState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<ExternalUserInfo>, ApiError> {
    debug!("POST /api/admin/ldap/authenticate username={}", credentials.username);

    let service = state.service()?;
    let user = state.within(service.authenticate(&credentials)).await?;
    info!("LDAP credentials verified for {}", user.login);

    Ok(Json(user))
}
