//! Organization role resolution

use crate::telemetry;
use async_trait::async_trait;
use ldapfed_core::types::{GroupToOrgRole, OrgId, OrgRole, ResolvedRole};
use ldapfed_core::{Error, Result};
use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read access to the organization store
#[async_trait]
pub trait OrgLookup: Send + Sync {
    /// Organization name, `None` when no such organization exists
    async fn find_by_id(&self, org_id: OrgId) -> Result<Option<String>>;
}

/// Resolves effective organization roles into an ordered, enriched list
pub struct RoleResolver {
    orgs: Arc<dyn OrgLookup>,
}

impl RoleResolver {
    pub fn new(orgs: Arc<dyn OrgLookup>) -> Self {
        Self { orgs }
    }

    /// Resolve `org_roles` against the server's group mappings.
    ///
    /// Organizations are processed in ascending id order and the first
    /// missing organization aborts the whole resolution with
    /// `Error::OrgNotFound`. The group DN is taken from the first mapping
    /// whose org and role both equal the effective role, or left empty.
    pub async fn resolve(
        &self,
        org_roles: &HashMap<OrgId, OrgRole>,
        groups: &[GroupToOrgRole],
    ) -> Result<Vec<ResolvedRole>> {
        let mut ordered: Vec<(OrgId, OrgRole)> =
            org_roles.iter().map(|(id, role)| (*id, *role)).collect();
        ordered.sort_unstable_by_key(|(id, _)| *id);

        let mut resolved = Vec::with_capacity(ordered.len());
        for (org_id, org_role) in ordered {
            let org_name = match self.orgs.find_by_id(org_id).await? {
                Some(name) => name,
                None => {
                    warn!("Organization {} referenced by LDAP mapping does not exist", org_id);
                    counter!(telemetry::ROLE_RESOLUTION_FAILURES_TOTAL).increment(1);
                    return Err(Error::OrgNotFound(org_id));
                }
            };

            let group_dn = groups
                .iter()
                .find(|g| g.org_id == org_id && g.org_role == org_role)
                .map(|g| g.group_dn.clone())
                .unwrap_or_default();

            debug!("Resolved org {} ({}) as {} via '{}'", org_id, org_name, org_role, group_dn);

            resolved.push(ResolvedRole {
                org_id,
                org_role,
                org_name,
                group_dn,
            });
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::InMemoryOrgStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ADMINS: &str = "cn=admins,ou=groups,dc=grafana,dc=org";
    const ADMINS2: &str = "cn=admins,ou=groups,dc=grafana2,dc=org";

    fn resolver(orgs: &[(OrgId, &str)]) -> RoleResolver {
        let store = InMemoryOrgStore::new();
        for (id, name) in orgs {
            store.insert(*id, *name);
        }
        RoleResolver::new(Arc::new(store))
    }

    /// Counts lookups so fail-fast behavior can be observed
    struct CountingOrgs {
        known: Vec<OrgId>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrgLookup for CountingOrgs {
        async fn find_by_id(&self, org_id: OrgId) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.known.contains(&org_id).then(|| format!("Org {}", org_id)))
        }
    }

    #[tokio::test]
    async fn test_single_role_resolution() {
        let roles = HashMap::from([(1, OrgRole::Admin)]);
        let groups = vec![GroupToOrgRole::new(ADMINS, 1, OrgRole::Admin)];

        let resolved = resolver(&[(1, "Main Org.")])
            .resolve(&roles, &groups)
            .await
            .unwrap();

        assert_eq!(
            resolved,
            vec![ResolvedRole {
                org_id: 1,
                org_role: OrgRole::Admin,
                org_name: "Main Org.".to_string(),
                group_dn: ADMINS.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_org_aborts_resolution() {
        let roles = HashMap::from([(1, OrgRole::Admin), (2, OrgRole::Viewer)]);
        let groups = vec![
            GroupToOrgRole::new(ADMINS, 1, OrgRole::Admin),
            GroupToOrgRole::new(ADMINS2, 2, OrgRole::Viewer),
        ];

        let err = resolver(&[(1, "Main Org.")])
            .resolve(&roles, &groups)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::OrgNotFound(2)));
    }

    #[tokio::test]
    async fn test_first_missing_org_reported_and_later_orgs_skipped() {
        let orgs = Arc::new(CountingOrgs {
            known: vec![1, 4],
            calls: AtomicUsize::new(0),
        });
        let roles = HashMap::from([
            (4, OrgRole::Viewer),
            (3, OrgRole::Editor),
            (1, OrgRole::Admin),
            (2, OrgRole::Viewer),
        ]);

        let err = RoleResolver::new(orgs.clone())
            .resolve(&roles, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::OrgNotFound(2)));
        assert_eq!(orgs.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_output_is_ascending_and_deterministic() {
        let roles = HashMap::from([
            (30, OrgRole::Viewer),
            (10, OrgRole::Admin),
            (20, OrgRole::Editor),
        ]);
        let resolver = resolver(&[(10, "Ten"), (20, "Twenty"), (30, "Thirty")]);

        let first = resolver.resolve(&roles, &[]).await.unwrap();
        let second = resolver.resolve(&roles, &[]).await.unwrap();

        let ids: Vec<OrgId> = first.iter().map(|r| r.org_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(first, second);
        assert!(first.iter().all(|r| r.group_dn.is_empty()));
    }

    #[tokio::test]
    async fn test_group_dn_requires_exact_org_and_role() {
        let roles = HashMap::from([(1, OrgRole::Editor)]);
        let groups = vec![
            GroupToOrgRole::new("cn=viewers,dc=grafana,dc=org", 1, OrgRole::Viewer),
            GroupToOrgRole::new("cn=editors,dc=grafana,dc=org", 1, OrgRole::Editor),
            GroupToOrgRole::new("cn=editors-too,dc=grafana,dc=org", 1, OrgRole::Editor),
        ];

        let resolved = resolver(&[(1, "Main Org.")])
            .resolve(&roles, &groups)
            .await
            .unwrap();
        assert_eq!(resolved[0].group_dn, "cn=editors,dc=grafana,dc=org");

        let conflicting = HashMap::from([(1, OrgRole::Admin)]);
        let resolved = resolver(&[(1, "Main Org.")])
            .resolve(&conflicting, &groups)
            .await
            .unwrap();
        assert_eq!(resolved[0].group_dn, "");
    }

    #[tokio::test]
    async fn test_no_roles_resolves_to_empty_list() {
        let resolved = resolver(&[]).resolve(&HashMap::new(), &[]).await.unwrap();
        assert!(resolved.is_empty());
    }
}
