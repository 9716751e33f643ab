//! Team membership augmentation

use async_trait::async_trait;
use ldapfed_core::types::{OrgId, ResolvedRole, TeamMembership, TeamOrgGroup};
use ldapfed_core::{Error, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Read access to team to group bindings
#[async_trait]
pub trait TeamLookup: Send + Sync {
    async fn find_by_group(&self, group_dn: &str, org_id: OrgId) -> Result<Vec<TeamOrgGroup>>;
}

/// Attaches team memberships to resolved roles when team sync is enabled.
///
/// Without a lookup the team field stays absent; with one it is always a
/// list, possibly empty.
#[derive(Clone, Default)]
pub struct TeamResolver {
    lookup: Option<Arc<dyn TeamLookup>>,
}

impl TeamResolver {
    pub fn new(lookup: Arc<dyn TeamLookup>) -> Self {
        Self {
            lookup: Some(lookup),
        }
    }

    /// Team sync not enabled
    pub fn disabled() -> Self {
        Self { lookup: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.lookup.is_some()
    }

    /// Team memberships for each resolved role.
    ///
    /// A failed lookup for one role counts as no teams for that role. A
    /// lookup reporting itself unavailable turns the whole field absent.
    pub async fn augment(&self, roles: &[ResolvedRole]) -> Option<Vec<TeamMembership>> {
        let lookup = self.lookup.as_ref()?;

        let mut memberships = Vec::new();
        for role in roles {
            match lookup.find_by_group(&role.group_dn, role.org_id).await {
                Ok(teams) => {
                    debug!(
                        "{} team(s) bound to '{}' in org {}",
                        teams.len(),
                        role.group_dn,
                        role.org_id
                    );
                    memberships.extend(teams.into_iter().map(|team| TeamMembership {
                        team_id: team.team_id,
                        team_name: team.team_name,
                        org_id: role.org_id,
                        org_name: role.org_name.clone(),
                        group_dn: team.group_dn,
                    }));
                }
                Err(Error::TeamLookupUnavailable(cause)) => {
                    warn!("Team sync unavailable, omitting teams: {}", cause);
                    return None;
                }
                Err(e) => {
                    warn!(
                        "Team lookup for '{}' in org {} failed: {}",
                        role.group_dn, role.org_id, e
                    );
                }
            }
        }

        Some(memberships)
    }
}
