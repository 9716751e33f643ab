//! Metric names recorded by the federation engine
//!
//! Recording is a no-op until a recorder is installed by the host process.

pub const DIRECTORY_PROBES_TOTAL: &str = "ldapfed_directory_probes_total";
pub const USER_LOOKUPS_TOTAL: &str = "ldapfed_user_lookups_total";
pub const AUTHENTICATIONS_TOTAL: &str = "ldapfed_authentications_total";
pub const ROLE_RESOLUTION_FAILURES_TOTAL: &str = "ldapfed_role_resolution_failures_total";
