//! Directory federation and identity resolution for Ldapfed
//!
//! - `ldap`: directory connectors, the federation client, status probing
//! - `identity`: role and team resolution, identity view composition

pub mod identity;
pub mod ldap;
pub mod telemetry;

pub use identity::{
    build_attribute_diff, split_name, AttributeDiff, IdentityService, InMemoryOrgStore,
    InMemoryTeamStore, OrgLookup, RoleResolver, TeamLookup, TeamResolver,
};
pub use ldap::{DirectoryConnector, FederationClient, LdapConnector, StatusAggregator};
