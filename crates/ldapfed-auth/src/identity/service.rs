//! Identity view composition

use crate::identity::attributes::build_attribute_diff;
use crate::identity::memory::{InMemoryOrgStore, InMemoryTeamStore};
use crate::identity::roles::RoleResolver;
use crate::identity::teams::TeamResolver;
use crate::ldap::FederationClient;
use ldapfed_core::types::{Credentials, ExternalUserInfo, LdapUserView, ServerStatus};
use ldapfed_core::{LdapfedConfig, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Resolves a login into the administrative identity view.
///
/// Cheap to clone; clones share the federation and collaborators.
#[derive(Clone)]
pub struct IdentityService {
    federation: Arc<FederationClient>,
    roles: Arc<RoleResolver>,
    teams: TeamResolver,
}

impl IdentityService {
    pub fn new(federation: Arc<FederationClient>, roles: RoleResolver, teams: TeamResolver) -> Self {
        Self {
            federation,
            roles: Arc::new(roles),
            teams,
        }
    }

    /// Wire the service from configuration with the bundled in-memory
    /// organization and team lookups.
    ///
    /// `None` when LDAP is disabled.
    pub fn from_config(config: &LdapfedConfig) -> Option<Self> {
        if !config.ldap.enabled {
            return None;
        }

        let federation = FederationClient::new(config.ldap.servers.clone());
        let orgs = InMemoryOrgStore::from_seeds(&config.organizations);
        let teams = if config.team_sync.enabled {
            TeamResolver::new(Arc::new(InMemoryTeamStore::from_seeds(&config.teams)))
        } else {
            TeamResolver::disabled()
        };

        info!(
            "LDAP federation with {} server(s), {} organization(s), team sync {}",
            federation.server_count(),
            orgs.len(),
            if teams.is_enabled() { "enabled" } else { "disabled" }
        );

        Some(Self::new(
            Arc::new(federation),
            RoleResolver::new(Arc::new(orgs)),
            teams,
        ))
    }

    pub fn federation(&self) -> &FederationClient {
        &self.federation
    }

    pub fn team_sync_enabled(&self) -> bool {
        self.teams.is_enabled()
    }

    /// Find `login` on the federation and compose its identity view.
    ///
    /// Fails with `UserNotFound` when no server has the login and with
    /// `OrgNotFound` when a role references an unknown organization.
    pub async fn resolve(&self, login: &str) -> Result<LdapUserView> {
        let (user, server) = self.federation.find_user(login).await?;
        debug!("Resolving identity of {} from {}", login, server.url());

        let roles = self.roles.resolve(&user.org_roles, &server.group_mappings).await?;
        let diff = build_attribute_diff(&user, &server.attributes);
        let teams = self.teams.augment(&roles).await;

        info!(
            "Resolved {} with {} role(s), team sync {}",
            login,
            roles.len(),
            if teams.is_some() { "on" } else { "off" }
        );

        Ok(LdapUserView {
            name: diff.name,
            surname: diff.surname,
            email: diff.email,
            login: diff.login,
            is_grafana_admin: user.is_admin(),
            is_disabled: user.is_disabled,
            roles,
            teams,
        })
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> Result<ExternalUserInfo> {
        self.federation.authenticate(credentials).await
    }

    /// Federation health, one entry per server in configuration order
    pub async fn status(&self) -> Vec<ServerStatus> {
        self.federation.ping().await
    }

    /// Federation health under an overall deadline, `None` when it passes
    pub async fn status_within(&self, deadline: Duration) -> Option<Vec<ServerStatus>> {
        self.federation.status_aggregator().ping_within(deadline).await
    }
}
