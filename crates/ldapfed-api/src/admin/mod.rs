//! Admin API routes
//!
//! Read-only administrative access to the LDAP federation: user lookups,
//! credential checks and per-server status.

mod ldap;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use ldap::*;

/// LDAP admin routes, mounted under `/api/admin/ldap`
pub fn ldap_routes() -> Router<Arc<LdapAdminState>> {
    Router::new()
        .route("/status", get(get_ldap_status))
        .route("/authenticate", post(authenticate_ldap_user))
        .route("/{username}", get(get_ldap_user))
}
