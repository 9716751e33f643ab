//! User types

use super::{OrgId, OrgRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity resolved from a directory server.
///
/// Produced fresh per lookup. `org_roles` is keyed by organization id so
/// each organization appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalUserInfo {
    /// Auth module that produced this identity
    pub auth_module: String,

    /// Entry DN on the source server
    pub auth_id: String,

    pub name: String,
    pub email: String,
    pub login: String,

    /// Effective organization roles
    pub org_roles: HashMap<OrgId, OrgRole>,

    /// Unset when no group mapping decided the flag
    pub is_grafana_admin: Option<bool>,

    pub is_disabled: bool,

    /// Raw group memberships reported by the directory
    #[serde(default)]
    pub groups: Vec<String>,
}

impl ExternalUserInfo {
    /// Admin flag with unset treated as `false`
    pub fn is_admin(&self) -> bool {
        self.is_grafana_admin.unwrap_or(false)
    }
}

/// Login credentials presented for directory authentication
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_flag_defaults_to_false() {
        let mut user = ExternalUserInfo::default();
        assert!(!user.is_admin());

        user.is_grafana_admin = Some(true);
        assert!(user.is_admin());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("johndoe", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("johndoe"));
        assert!(!debug.contains("hunter2"));
    }
}
