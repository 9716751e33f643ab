//! LDAP/Active Directory federation module
//!
//! Provides:
//! - A connector abstraction over one physical directory server
//! - An ldap3-backed connector with TLS/STARTTLS support
//! - Priority-ordered user search and authentication across servers
//! - Concurrent per-server reachability probing

mod client;
pub(crate) mod connector;
mod mapper;
mod multi;
mod status;

pub use client::LdapConnector;
pub use connector::DirectoryConnector;
pub use mapper::build_user_info;
pub use multi::FederationClient;
pub use status::StatusAggregator;
