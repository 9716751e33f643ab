//! HTTP admin layer for Ldapfed
//!
//! Exposes identity resolution and federation status under
//! `/api/admin/ldap`, plus `/health` and Prometheus `/metrics`.

pub mod admin;
pub mod error;
pub mod server;
pub mod telemetry;

pub use error::ApiError;
pub use server::{create_router, AdminServer};
pub use telemetry::MetricsRecorder;
