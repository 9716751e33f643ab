//! Ldapfed Core Library
//!
//! Shared types, errors, and configuration for the federated directory
//! identity-resolution engine.

pub mod config;
pub mod error;
pub mod types;

pub use config::LdapfedConfig;
pub use error::{Error, Result};

/// Ldapfed version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default plain LDAP port
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Default per-server directory timeout (seconds)
pub const DEFAULT_DIRECTORY_TIMEOUT_SECS: u64 = 10;

/// Auth module name stamped on identities resolved from a directory
pub const AUTH_MODULE_LDAP: &str = "ldap";
