//! Directory server configuration
//!
//! One entry per physical directory server. The order in which servers
//! are configured is the federation's priority order.

use super::{OrgId, OrgRole};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Server Configuration
// ============================================================================

/// Connection and mapping parameters for one directory server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host name or address
    pub host: String,

    /// Port (389 for LDAP/STARTTLS, 636 for LDAPS)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect with TLS from the start (ldaps://)
    #[serde(default)]
    pub use_ssl: bool,

    /// Upgrade a plain connection with STARTTLS
    #[serde(default)]
    pub start_tls: bool,

    /// Skip TLS certificate verification (not recommended for production)
    #[serde(default)]
    pub ssl_skip_verify: bool,

    /// Service account DN used for searches
    #[serde(default)]
    pub bind_dn: String,

    /// Service account password
    #[serde(default)]
    pub bind_password: String,

    /// Per-operation timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User search filter, `%s` is replaced by the login
    /// Example: "(cn=%s)" or "(sAMAccountName=%s)"
    #[serde(default = "default_search_filter")]
    pub search_filter: String,

    /// Base DNs searched in order
    #[serde(default)]
    pub search_base_dns: Vec<String>,

    /// Group search filter for directories without `memberOf`.
    /// `%s` is replaced by the user DN, or by the value of
    /// `group_search_filter_user_attribute` when set.
    #[serde(default)]
    pub group_search_filter: Option<String>,

    #[serde(default)]
    pub group_search_filter_user_attribute: Option<String>,

    #[serde(default)]
    pub group_search_base_dns: Vec<String>,

    /// Directory attribute names for identity fields
    #[serde(default)]
    pub attributes: AttributeMap,

    /// Group to organization role rules, order is significant
    #[serde(default)]
    pub group_mappings: Vec<GroupToOrgRole>,
}

fn default_port() -> u16 {
    crate::DEFAULT_LDAP_PORT
}

fn default_timeout() -> u64 {
    crate::DEFAULT_DIRECTORY_TIMEOUT_SECS
}

fn default_search_filter() -> String {
    "(cn=%s)".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_port(),
            use_ssl: false,
            start_tls: false,
            ssl_skip_verify: false,
            bind_dn: String::new(),
            bind_password: String::new(),
            timeout_seconds: default_timeout(),
            search_filter: default_search_filter(),
            search_base_dns: Vec::new(),
            group_search_filter: None,
            group_search_filter_user_attribute: None,
            group_search_base_dns: Vec::new(),
            attributes: AttributeMap::default(),
            group_mappings: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Connection URL for this server
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Build user search filter with login substitution
    pub fn build_search_filter(&self, login: &str) -> String {
        self.search_filter.replace("%s", &escape_filter_value(login))
    }

    /// Build a filter matching any of the given logins
    pub fn build_multi_search_filter(&self, logins: &[String]) -> String {
        if logins.len() == 1 {
            return self.build_search_filter(&logins[0]);
        }
        let parts: String = logins.iter().map(|l| self.build_search_filter(l)).collect();
        format!("(|{})", parts)
    }

    /// Build group search filter, `None` when group search is not configured
    pub fn build_group_filter(&self, value: &str) -> Option<String> {
        self.group_search_filter
            .as_ref()
            .map(|f| f.replace("%s", &escape_filter_value(value)))
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: &str| {
            Err(crate::Error::InvalidConfig(format!(
                "server {}:{}: {}",
                self.host, self.port, msg
            )))
        };

        if self.host.is_empty() {
            return Err(crate::Error::InvalidConfig("Server host is required".into()));
        }
        if self.port == 0 {
            return invalid("port must be non-zero");
        }
        if self.use_ssl && self.start_tls {
            return invalid("use_ssl and start_tls are mutually exclusive");
        }
        if !self.search_filter.contains("%s") {
            return invalid("search_filter must contain %s placeholder");
        }
        if self.search_base_dns.is_empty() {
            return invalid("at least one search base DN is required");
        }
        if self.group_search_filter.is_some() && self.group_search_base_dns.is_empty() {
            return invalid("group_search_filter requires group_search_base_dns");
        }
        if self.timeout_seconds == 0 {
            return invalid("timeout_seconds must be non-zero");
        }

        Ok(())
    }
}

/// Escape RFC 4515 special characters in a filter assertion value
fn escape_filter_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => out.push_str("\\2a"),
            '(' => out.push_str("\\28"),
            ')' => out.push_str("\\29"),
            '\\' => out.push_str("\\5c"),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Attribute Map
// ============================================================================

/// Directory attribute names backing each identity field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttributeMap {
    #[serde(default = "default_name_attr")]
    pub name: String,

    #[serde(default = "default_surname_attr")]
    pub surname: String,

    #[serde(default = "default_username_attr")]
    pub username: String,

    #[serde(default = "default_email_attr")]
    pub email: String,

    #[serde(default = "default_member_of_attr")]
    pub member_of: String,
}

fn default_name_attr() -> String {
    "givenName".to_string()
}

fn default_surname_attr() -> String {
    "sn".to_string()
}

fn default_username_attr() -> String {
    "cn".to_string()
}

fn default_email_attr() -> String {
    "email".to_string()
}

fn default_member_of_attr() -> String {
    "memberOf".to_string()
}

impl Default for AttributeMap {
    fn default() -> Self {
        Self {
            name: default_name_attr(),
            surname: default_surname_attr(),
            username: default_username_attr(),
            email: default_email_attr(),
            member_of: default_member_of_attr(),
        }
    }
}

impl AttributeMap {
    /// Attributes requested on user searches
    pub fn search_attributes(&self) -> Vec<&str> {
        vec![
            self.username.as_str(),
            self.surname.as_str(),
            self.email.as_str(),
            self.name.as_str(),
            self.member_of.as_str(),
        ]
    }
}

// ============================================================================
// Group Mapping
// ============================================================================

/// Membership in `group_dn` grants `org_role` in `org_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupToOrgRole {
    /// Group DN, or `*` to match every user
    pub group_dn: String,

    #[serde(default = "default_org_id")]
    pub org_id: OrgId,

    pub org_role: OrgRole,

    /// Server-wide admin flag granted by this group
    #[serde(default)]
    pub grafana_admin: Option<bool>,
}

fn default_org_id() -> OrgId {
    1
}

impl GroupToOrgRole {
    pub fn new(group_dn: impl Into<String>, org_id: OrgId, org_role: OrgRole) -> Self {
        Self {
            group_dn: group_dn.into(),
            org_id,
            org_role,
            grafana_admin: None,
        }
    }

    /// Whether this rule applies to a member of `groups`
    pub fn matches_any(&self, groups: &[String]) -> bool {
        self.group_dn == "*" || groups.iter().any(|g| g.eq_ignore_ascii_case(&self.group_dn))
    }
}
