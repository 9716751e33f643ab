//! Attribute diff for administrative display

use ldapfed_core::types::{AttributeMap, ExternalUserInfo, LdapAttribute};

/// Which configured attribute produced which value, per identity field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDiff {
    pub name: LdapAttribute,
    pub surname: LdapAttribute,
    pub email: LdapAttribute,
    pub login: LdapAttribute,
}

/// Split a display name into first name and surname.
///
/// The first whitespace-separated token is the name, the rest joined by a
/// single space is the surname.
pub fn split_name(full_name: &str) -> (String, String) {
    let mut tokens = full_name.split_whitespace();
    let name = tokens.next().unwrap_or_default().to_string();
    let surname = tokens.collect::<Vec<_>>().join(" ");
    (name, surname)
}

pub fn build_attribute_diff(user: &ExternalUserInfo, attributes: &AttributeMap) -> AttributeDiff {
    let (name, surname) = split_name(&user.name);

    AttributeDiff {
        name: LdapAttribute::new(&attributes.name, name),
        surname: LdapAttribute::new(&attributes.surname, surname),
        email: LdapAttribute::new(&attributes.email, &user.email),
        login: LdapAttribute::new(&attributes.username, &user.login),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("John Doe"), ("John".into(), "Doe".into()));
        assert_eq!(split_name("  Mary  Ann  Smith "), ("Mary".into(), "Ann Smith".into()));
        assert_eq!(split_name("Cher"), ("Cher".into(), String::new()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }

    #[test]
    fn test_diff_pairs_configured_attribute_with_value() {
        let user = ExternalUserInfo {
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            login: "johndoe".to_string(),
            ..Default::default()
        };
        let attributes = AttributeMap {
            name: "ldap-name".to_string(),
            surname: "ldap-surname".to_string(),
            email: "ldap-email".to_string(),
            username: "ldap-username".to_string(),
            ..Default::default()
        };

        let diff = build_attribute_diff(&user, &attributes);

        assert_eq!(diff.name, LdapAttribute::new("ldap-name", "John"));
        assert_eq!(diff.surname, LdapAttribute::new("ldap-surname", "Doe"));
        assert_eq!(diff.email, LdapAttribute::new("ldap-email", "john.doe@example.com"));
        assert_eq!(diff.login, LdapAttribute::new("ldap-username", "johndoe"));
    }
}
