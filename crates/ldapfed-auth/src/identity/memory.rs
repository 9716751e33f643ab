//! In-memory organization and team lookups
//!
//! Used by the bundled server when organizations and team bindings are
//! declared in configuration, and by tests.

use crate::identity::roles::OrgLookup;
use crate::identity::teams::TeamLookup;
use async_trait::async_trait;
use ldapfed_core::config::{OrganizationSeed, TeamSeed};
use ldapfed_core::types::{OrgId, TeamOrgGroup};
use ldapfed_core::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryOrgStore {
    orgs: RwLock<HashMap<OrgId, String>>,
}

impl InMemoryOrgStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seeds(seeds: &[OrganizationSeed]) -> Self {
        let store = Self::new();
        for seed in seeds {
            store.insert(seed.id, seed.name.clone());
        }
        store
    }

    pub fn insert(&self, org_id: OrgId, name: impl Into<String>) {
        self.orgs.write().insert(org_id, name.into());
    }

    pub fn len(&self) -> usize {
        self.orgs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.read().is_empty()
    }
}

#[async_trait]
impl OrgLookup for InMemoryOrgStore {
    async fn find_by_id(&self, org_id: OrgId) -> Result<Option<String>> {
        Ok(self.orgs.read().get(&org_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryTeamStore {
    teams: RwLock<Vec<TeamOrgGroup>>,
}

impl InMemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seeds(seeds: &[TeamSeed]) -> Self {
        let store = Self::new();
        for seed in seeds {
            store.insert(seed.clone().into());
        }
        store
    }

    pub fn insert(&self, team: TeamOrgGroup) {
        self.teams.write().push(team);
    }
}

#[async_trait]
impl TeamLookup for InMemoryTeamStore {
    async fn find_by_group(&self, group_dn: &str, org_id: OrgId) -> Result<Vec<TeamOrgGroup>> {
        Ok(self
            .teams
            .read()
            .iter()
            .filter(|t| t.org_id == org_id && t.group_dn.eq_ignore_ascii_case(group_dn))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_org_store_lookup() {
        let store = InMemoryOrgStore::from_seeds(&[OrganizationSeed {
            id: 1,
            name: "Main Org.".to_string(),
        }]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id(1).await.unwrap().as_deref(), Some("Main Org."));
        assert_eq!(store.find_by_id(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_team_store_matches_group_and_org() {
        let store = InMemoryTeamStore::from_seeds(&[
            TeamSeed {
                team_id: 1,
                team_name: "Ops".to_string(),
                org_id: 1,
                group_dn: "cn=ops,dc=grafana,dc=org".to_string(),
            },
            TeamSeed {
                team_id: 2,
                team_name: "Ops West".to_string(),
                org_id: 2,
                group_dn: "cn=ops,dc=grafana,dc=org".to_string(),
            },
        ]);

        let teams = store.find_by_group("CN=ops,dc=grafana,dc=org", 1).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team_name, "Ops");

        assert!(store.find_by_group("", 1).await.unwrap().is_empty());
    }
}
