//! Directory entry to identity mapping

use ldapfed_core::types::{ExternalUserInfo, OrgId, OrgRole, ServerConfig};
use ldapfed_core::AUTH_MODULE_LDAP;
use std::collections::HashMap;

/// Build an identity from a directory entry.
///
/// Group mappings are applied in configured order: the first matching rule
/// for an organization decides its role, and the first matching rule that
/// sets `grafana_admin` decides the admin flag. When mappings exist but none
/// match, the user is disabled and holds no roles.
pub fn build_user_info(
    dn: &str,
    attrs: &HashMap<String, Vec<String>>,
    groups: Vec<String>,
    server: &ServerConfig,
    searched_login: &str,
) -> ExternalUserInfo {
    let mapping = &server.attributes;

    let first_name = first_attr(attrs, &mapping.name).unwrap_or_default();
    let surname = first_attr(attrs, &mapping.surname).unwrap_or_default();
    let name = format!("{} {}", first_name, surname).trim().to_string();

    let mut org_roles: HashMap<OrgId, OrgRole> = HashMap::new();
    let mut is_grafana_admin = None;

    for rule in server.group_mappings.iter().filter(|r| r.matches_any(&groups)) {
        org_roles.entry(rule.org_id).or_insert(rule.org_role);
        if is_grafana_admin.is_none() {
            is_grafana_admin = rule.grafana_admin;
        }
    }

    let is_disabled = !server.group_mappings.is_empty() && org_roles.is_empty();

    ExternalUserInfo {
        auth_module: AUTH_MODULE_LDAP.to_string(),
        auth_id: dn.to_string(),
        name,
        email: first_attr(attrs, &mapping.email).unwrap_or_default(),
        login: first_attr(attrs, &mapping.username).unwrap_or_else(|| searched_login.to_string()),
        org_roles,
        is_grafana_admin,
        is_disabled,
        groups,
    }
}

/// First value of an attribute; attribute names compare case-insensitively
pub(crate) fn first_attr(attrs: &HashMap<String, Vec<String>>, name: &str) -> Option<String> {
    all_attr(attrs, name).and_then(|v| v.first().cloned())
}

pub(crate) fn all_attr<'a>(
    attrs: &'a HashMap<String, Vec<String>>,
    name: &str,
) -> Option<&'a Vec<String>> {
    attrs.get(name).or_else(|| {
        attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldapfed_core::types::GroupToOrgRole;

    const ADMINS: &str = "cn=admins,ou=groups,dc=grafana,dc=org";
    const EDITORS: &str = "cn=editors,ou=groups,dc=grafana,dc=org";

    fn entry() -> HashMap<String, Vec<String>> {
        let mut attrs = HashMap::new();
        attrs.insert("givenName".to_string(), vec!["John".to_string()]);
        attrs.insert("sn".to_string(), vec!["Doe".to_string()]);
        attrs.insert("cn".to_string(), vec!["johndoe".to_string()]);
        attrs.insert("EMAIL".to_string(), vec!["john.doe@example.com".to_string()]);
        attrs
    }

    fn server(mappings: Vec<GroupToOrgRole>) -> ServerConfig {
        ServerConfig {
            group_mappings: mappings,
            ..Default::default()
        }
    }

    #[test]
    fn test_identity_fields() {
        let user = build_user_info(
            "cn=johndoe,dc=grafana,dc=org",
            &entry(),
            vec![],
            &server(vec![]),
            "johndoe",
        );

        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "john.doe@example.com");
        assert_eq!(user.login, "johndoe");
        assert_eq!(user.auth_module, "ldap");
        assert_eq!(user.auth_id, "cn=johndoe,dc=grafana,dc=org");
        assert!(!user.is_disabled);
        assert_eq!(user.is_grafana_admin, None);
    }

    #[test]
    fn test_login_falls_back_to_searched_value() {
        let mut attrs = entry();
        attrs.remove("cn");
        let user = build_user_info("dn", &attrs, vec![], &server(vec![]), "jdoe");
        assert_eq!(user.login, "jdoe");
    }

    #[test]
    fn test_first_rule_per_org_wins() {
        let mut admin = GroupToOrgRole::new(ADMINS, 1, OrgRole::Admin);
        admin.grafana_admin = Some(true);
        let mappings = vec![
            admin,
            GroupToOrgRole::new(EDITORS, 1, OrgRole::Editor),
            GroupToOrgRole::new(EDITORS, 2, OrgRole::Editor),
        ];

        let groups = vec![ADMINS.to_uppercase(), EDITORS.to_string()];
        let user = build_user_info("dn", &entry(), groups, &server(mappings), "johndoe");

        assert_eq!(user.org_roles.len(), 2);
        assert_eq!(user.org_roles[&1], OrgRole::Admin);
        assert_eq!(user.org_roles[&2], OrgRole::Editor);
        assert_eq!(user.is_grafana_admin, Some(true));
    }

    #[test]
    fn test_wildcard_mapping() {
        let mappings = vec![GroupToOrgRole::new("*", 3, OrgRole::Viewer)];
        let user = build_user_info("dn", &entry(), vec![], &server(mappings), "johndoe");
        assert_eq!(user.org_roles[&3], OrgRole::Viewer);
        assert!(!user.is_disabled);
    }

    #[test]
    fn test_unmatched_user_is_disabled() {
        let mappings = vec![GroupToOrgRole::new(ADMINS, 1, OrgRole::Admin)];
        let user = build_user_info(
            "dn",
            &entry(),
            vec![EDITORS.to_string()],
            &server(mappings),
            "johndoe",
        );
        assert!(user.is_disabled);
        assert!(user.org_roles.is_empty());
    }
}
