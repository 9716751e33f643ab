//! Identity resolution
//!
//! Turns a directory identity into the administrative view: organization
//! roles with display names and originating groups, the attribute diff,
//! and optionally team memberships.

mod attributes;
mod memory;
mod roles;
mod service;
mod teams;

pub use attributes::{build_attribute_diff, split_name, AttributeDiff};
pub use memory::{InMemoryOrgStore, InMemoryTeamStore};
pub use roles::{OrgLookup, RoleResolver};
pub use service::IdentityService;
pub use teams::{TeamLookup, TeamResolver};
