//! LDAP connector implementation
//!
//! Handles LDAP connections, service binds, user binds, and user/group
//! queries against one server. Supports LDAP, LDAPS (SSL), and STARTTLS.

use crate::ldap::connector::DirectoryConnector;
use crate::ldap::mapper::{all_attr, build_user_info, first_attr};
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use ldapfed_core::types::{Credentials, ExternalUserInfo, ServerConfig};
use ldapfed_core::{Error, Result};
use tracing::{debug, warn};

/// Invalid credentials result code
const RC_INVALID_CREDENTIALS: u32 = 49;
/// Unwilling to perform, used for disabled/locked accounts
const RC_UNWILLING_TO_PERFORM: u32 = 53;

/// ldap3-backed connector for one directory server
pub struct LdapConnector {
    config: ServerConfig,
}

impl LdapConnector {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    fn unreachable(&self, cause: impl std::fmt::Display) -> Error {
        Error::unreachable(&self.config.host, self.config.port, cause.to_string())
    }

    /// Create LDAP connection with proper TLS settings
    async fn create_connection(&self) -> Result<Ldap> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.config.timeout())
            .set_starttls(self.config.start_tls)
            .set_no_tls_verify(self.config.ssl_skip_verify);

        let url = self.config.url();
        debug!("Connecting to LDAP server: {}", url);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| self.unreachable(format!("Failed to connect to LDAP server: {}", e)))?;

        ldap3::drive!(conn);
        Ok(ldap)
    }

    /// Bind with the service account, or stay anonymous when none is set
    async fn service_bind(&self, ldap: &mut Ldap) -> Result<()> {
        if self.config.bind_dn.is_empty() {
            return Ok(());
        }

        let result = ldap
            .simple_bind(&self.config.bind_dn, &self.config.bind_password)
            .await
            .map_err(|e| self.unreachable(format!("Service bind failed: {}", e)))?;

        if result.rc != 0 {
            return Err(Error::Directory(format!(
                "Service account bind failed with code: {}",
                result.rc
            )));
        }

        Ok(())
    }

    async fn search_with_connection(
        &self,
        ldap: &mut Ldap,
        logins: &[String],
    ) -> Result<Vec<ExternalUserInfo>> {
        let filter = self.config.build_multi_search_filter(logins);
        let attrs = self.config.attributes.search_attributes();

        debug!("Searching for users with filter: {}", filter);

        let mut entries = Vec::new();
        for base in &self.config.search_base_dns {
            let (rs, _res) = ldap
                .search(base, Scope::Subtree, &filter, attrs.clone())
                .await
                .map_err(|e| self.unreachable(format!("User search failed: {}", e)))?
                .success()
                .map_err(|e| Error::Directory(format!("User search error: {}", e)))?;

            // First base DN with hits wins
            if !rs.is_empty() {
                entries = rs;
                break;
            }
        }

        // Only a single-login search can stand in for a missing username attribute
        let fallback_login = match logins {
            [only] => only.as_str(),
            _ => "",
        };

        let mut users = Vec::with_capacity(entries.len());
        for result in entries {
            let entry = SearchEntry::construct(result);
            let groups = self.user_groups(ldap, &entry).await?;
            users.push(build_user_info(
                &entry.dn,
                &entry.attrs,
                groups,
                &self.config,
                fallback_login,
            ));
        }

        Ok(users)
    }

    /// Group memberships from `memberOf`, or from a group search when one
    /// is configured
    async fn user_groups(&self, ldap: &mut Ldap, entry: &SearchEntry) -> Result<Vec<String>> {
        let value = match &self.config.group_search_filter_user_attribute {
            Some(attr) => first_attr(&entry.attrs, attr),
            None => Some(entry.dn.clone()),
        };

        let filter = match value.and_then(|v| self.config.build_group_filter(&v)) {
            Some(f) => f,
            None => {
                return Ok(all_attr(&entry.attrs, &self.config.attributes.member_of)
                    .cloned()
                    .unwrap_or_default())
            }
        };

        debug!("Searching groups with filter: {}", filter);

        let mut groups = Vec::new();
        for base in &self.config.group_search_base_dns {
            let (rs, _res) = ldap
                .search(base, Scope::Subtree, &filter, vec!["dn"])
                .await
                .map_err(|e| self.unreachable(format!("Group search failed: {}", e)))?
                .success()
                .map_err(|e| Error::Directory(format!("Group search error: {}", e)))?;

            groups.extend(rs.into_iter().map(|r| SearchEntry::construct(r).dn));
        }

        debug!("Found {} groups for {}", groups.len(), entry.dn);
        Ok(groups)
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    fn config(&self) -> &ServerConfig {
        &self.config
    }

    async fn probe(&self) -> Result<()> {
        let mut ldap = self.create_connection().await?;
        self.service_bind(&mut ldap).await?;
        let _ = ldap.unbind().await;
        Ok(())
    }

    async fn search_users(&self, logins: &[String]) -> Result<Vec<ExternalUserInfo>> {
        if logins.is_empty() {
            return Ok(Vec::new());
        }

        let mut ldap = self.create_connection().await?;
        self.service_bind(&mut ldap).await?;
        let users = self.search_with_connection(&mut ldap, logins).await;
        let _ = ldap.unbind().await;
        users
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<ExternalUserInfo> {
        // An empty password would turn the user bind into an anonymous bind
        if credentials.password.is_empty() {
            return Err(Error::InvalidCredentials);
        }

        let mut ldap = self.create_connection().await?;
        self.service_bind(&mut ldap).await?;

        let found = self
            .search_with_connection(&mut ldap, &[credentials.username.clone()])
            .await;
        let _ = ldap.unbind().await;

        let user = found?.into_iter().next().ok_or(Error::UserNotFound)?;

        // Verify the password by binding as the user
        let mut user_conn = self.create_connection().await?;
        let user_bind = user_conn
            .simple_bind(&user.auth_id, &credentials.password)
            .await
            .map_err(|e| self.unreachable(format!("User bind failed: {}", e)))?;
        let _ = user_conn.unbind().await;

        match user_bind.rc {
            0 => Ok(user),
            RC_INVALID_CREDENTIALS => Err(Error::InvalidCredentials),
            RC_UNWILLING_TO_PERFORM => Err(Error::AccountDisabled),
            rc => {
                warn!(
                    "Unexpected bind result {} for {} on {}",
                    rc, credentials.username, self.config.host
                );
                Err(Error::InvalidCredentials)
            }
        }
    }
}
