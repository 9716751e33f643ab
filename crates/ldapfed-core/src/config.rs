//! Configuration for Ldapfed

use crate::types::{OrgId, ServerConfig, TeamOrgGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LdapfedConfig {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ldap: LdapSection,

    #[serde(default)]
    pub team_sync: TeamSyncConfig,

    /// Organizations known to the bundled organization lookup
    #[serde(default)]
    pub organizations: Vec<OrganizationSeed>,

    /// Team to group bindings known to the bundled team lookup
    #[serde(default)]
    pub teams: Vec<TeamSeed>,
}

impl LdapfedConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        debug!("Loading configuration from {}", path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("LDAPFED_BIND_ADDRESS") {
            config.server.bind_address = addr;
        }
        if let Ok(port) = std::env::var("LDAPFED_PORT") {
            match port.parse() {
                Ok(p) => config.server.port = p,
                Err(_) => warn!("Ignoring invalid LDAPFED_PORT: {}", port),
            }
        }
        if let Ok(level) = std::env::var("LDAPFED_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("LDAPFED_LOG_FORMAT") {
            config.logging.format = format;
        }
        if std::env::var("LDAPFED_TEAM_SYNC_ENABLED").map(|v| v == "true").unwrap_or(false) {
            config.team_sync.enabled = true;
        }

        // A single server can be described entirely from the environment
        if let Ok(host) = std::env::var("LDAPFED_LDAP_HOST") {
            let mut server = ServerConfig {
                host,
                ..Default::default()
            };
            if let Some(port) = std::env::var("LDAPFED_LDAP_PORT").ok().and_then(|p| p.parse().ok()) {
                server.port = port;
            }
            if let Ok(dn) = std::env::var("LDAPFED_LDAP_BIND_DN") {
                server.bind_dn = dn;
            }
            if let Ok(password) = std::env::var("LDAPFED_LDAP_BIND_PASSWORD") {
                server.bind_password = password;
            }
            if let Ok(bases) = std::env::var("LDAPFED_LDAP_SEARCH_BASE_DNS") {
                server.search_base_dns = bases
                    .split(';')
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .map(String::from)
                    .collect();
            }
            if let Ok(filter) = std::env::var("LDAPFED_LDAP_SEARCH_FILTER") {
                server.search_filter = filter;
            }
            config.ldap.enabled = true;
            config.ldap.servers.push(server);
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.request_timeout_secs == 0 {
            return Err(crate::Error::InvalidConfig(
                "server.request_timeout_secs must be non-zero".into(),
            ));
        }

        if self.ldap.enabled {
            if self.ldap.servers.is_empty() {
                return Err(crate::Error::NoServersConfigured);
            }
            for server in &self.ldap.servers {
                server.validate()?;
            }
        }

        let mut seen = HashSet::new();
        for org in &self.organizations {
            if !seen.insert(org.id) {
                return Err(crate::Error::InvalidConfig(format!(
                    "Duplicate organization id: {}",
                    org.id
                )));
            }
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(crate::Error::InvalidConfig(format!(
                "Unknown log format: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Overall deadline for one request, in seconds
    pub request_timeout_secs: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3001,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Directory federation section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LdapSection {
    #[serde(default)]
    pub enabled: bool,

    /// Servers in priority order
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamSyncConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSeed {
    pub id: OrgId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSeed {
    pub team_id: i64,
    pub team_name: String,
    pub org_id: OrgId,
    pub group_dn: String,
}

impl From<TeamSeed> for TeamOrgGroup {
    fn from(seed: TeamSeed) -> Self {
        Self {
            team_id: seed.team_id,
            team_name: seed.team_name,
            org_id: seed.org_id,
            group_dn: seed.group_dn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        bind_address = "127.0.0.1"
        port = 3001
        request_timeout_secs = 15

        [ldap]
        enabled = true

        [[ldap.servers]]
        host = "10.0.0.3"
        port = 361
        bind_dn = "cn=admin,dc=grafana,dc=org"
        bind_password = "grafana"
        search_filter = "(cn=%s)"
        search_base_dns = ["dc=grafana,dc=org"]

        [ldap.servers.attributes]
        name = "givenName"
        surname = "sn"
        username = "cn"
        email = "email"
        member_of = "memberOf"

        [[ldap.servers.group_mappings]]
        group_dn = "cn=admins,ou=groups,dc=grafana,dc=org"
        org_id = 1
        org_role = "Admin"
        grafana_admin = true

        [[ldap.servers]]
        host = "10.0.0.5"
        search_base_dns = ["dc=grafana,dc=org"]

        [team_sync]
        enabled = true

        [[organizations]]
        id = 1
        name = "Main Org."

        [[teams]]
        team_id = 7
        team_name = "Ops"
        org_id = 1
        group_dn = "cn=admins,ou=groups,dc=grafana,dc=org"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = LdapfedConfig::from_toml(SAMPLE).unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.ldap.servers.len(), 2);
        assert_eq!(config.ldap.servers[0].port, 361);
        assert_eq!(config.ldap.servers[1].port, 389);
        assert_eq!(config.ldap.servers[0].group_mappings[0].grafana_admin, Some(true));
        assert!(config.team_sync.enabled);
        assert_eq!(config.organizations[0].name, "Main Org.");
        assert_eq!(config.teams[0].team_name, "Ops");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_org_rejected() {
        let mut config = LdapfedConfig::default();
        config.organizations = vec![
            OrganizationSeed { id: 1, name: "Main Org.".into() },
            OrganizationSeed { id: 1, name: "Other".into() },
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_ldap_skips_server_validation() {
        let mut config = LdapfedConfig::default();
        config.ldap.servers.push(ServerConfig::default());
        assert!(config.validate().is_ok());

        config.ldap.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_ldap_requires_servers() {
        let mut config = LdapfedConfig::default();
        config.ldap.enabled = true;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, crate::Error::NoServersConfigured));
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let mut config = LdapfedConfig::default();
        config.server.request_timeout_secs = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = LdapfedConfig::from_toml("[ldap\nenabled = ").unwrap_err();
        assert!(matches!(err, crate::Error::InvalidConfig(_)));
    }
}
