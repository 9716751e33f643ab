//! Resolved identity view types

use super::{OrgId, OrgRole};
use serde::{Deserialize, Serialize};

/// Organization role enriched with display name and originating group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRole {
    pub org_id: OrgId,
    pub org_role: OrgRole,
    pub org_name: String,

    /// Empty when no group mapping matches the org and role exactly
    #[serde(rename = "groupDN")]
    pub group_dn: String,
}

/// Configured attribute name next to the value it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapAttribute {
    #[serde(rename = "cfgAttrValue")]
    pub cfg_attr_value: String,

    #[serde(rename = "ldapValue")]
    pub ldap_value: String,
}

impl LdapAttribute {
    pub fn new(cfg_attr_value: impl Into<String>, ldap_value: impl Into<String>) -> Self {
        Self {
            cfg_attr_value: cfg_attr_value.into(),
            ldap_value: ldap_value.into(),
        }
    }
}

/// Team bound to a directory group inside an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOrgGroup {
    pub team_id: i64,
    pub team_name: String,
    pub org_id: OrgId,

    #[serde(rename = "groupDN")]
    pub group_dn: String,
}

/// Team membership as rendered in the identity view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembership {
    pub team_id: i64,
    pub team_name: String,
    pub org_id: OrgId,
    pub org_name: String,

    #[serde(rename = "groupDN")]
    pub group_dn: String,
}

/// Composed administrative view of a directory user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapUserView {
    pub name: LdapAttribute,
    pub surname: LdapAttribute,
    pub email: LdapAttribute,
    pub login: LdapAttribute,
    pub is_grafana_admin: bool,
    pub is_disabled: bool,
    pub roles: Vec<ResolvedRole>,

    /// `None` when team sync is not enabled, serialized as `null`
    pub teams: Option<Vec<TeamMembership>>,
}
