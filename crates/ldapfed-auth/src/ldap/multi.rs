//! Federation client over an ordered set of directory servers
//!
//! Servers are tried in configuration order and the first server that
//! answers wins; results are never merged across servers. Per-server faults
//! are logged and skipped whenever a later server can still answer.

use crate::ldap::client::LdapConnector;
use crate::ldap::connector::{bounded, DirectoryConnector};
use crate::ldap::status::StatusAggregator;
use crate::telemetry;
use ldapfed_core::types::{Credentials, ExternalUserInfo, ServerConfig, ServerStatus};
use ldapfed_core::{Error, Result};
use metrics::counter;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Priority-ordered federation of directory servers
pub struct FederationClient {
    connectors: Vec<Arc<dyn DirectoryConnector>>,
}

impl FederationClient {
    /// Create a client with one ldap3 connector per server
    pub fn new(servers: Vec<ServerConfig>) -> Self {
        let connectors = servers
            .into_iter()
            .map(|config| Arc::new(LdapConnector::new(config)) as Arc<dyn DirectoryConnector>)
            .collect();

        Self { connectors }
    }

    /// Create a client over pre-built connectors, kept in the given order
    pub fn with_connectors(connectors: Vec<Arc<dyn DirectoryConnector>>) -> Self {
        Self { connectors }
    }

    pub fn server_count(&self) -> usize {
        self.connectors.len()
    }

    /// Server configurations in priority order
    pub fn servers(&self) -> impl Iterator<Item = &ServerConfig> {
        self.connectors.iter().map(|c| c.config())
    }

    pub fn status_aggregator(&self) -> StatusAggregator {
        StatusAggregator::new(self.connectors.clone())
    }

    /// Probe every server; one status per server in configuration order
    pub async fn ping(&self) -> Vec<ServerStatus> {
        self.status_aggregator().ping().await
    }

    /// Find a user on the highest-priority server that has it.
    ///
    /// Returns the identity with the configuration of the server that
    /// produced it, since role mapping rules are per server.
    pub async fn find_user(&self, login: &str) -> Result<(ExternalUserInfo, &ServerConfig)> {
        for connector in &self.connectors {
            let config = connector.config();
            debug!("Searching {}:{} for user {}", config.host, config.port, login);

            match bounded(config, connector.search_user(login)).await {
                Ok(Some(user)) => {
                    info!("Found user {} on {}:{}", login, config.host, config.port);
                    counter!(telemetry::USER_LOOKUPS_TOTAL, "result" => "found").increment(1);
                    return Ok((user, config));
                }
                Ok(None) => {
                    debug!("User {} not present on {}:{}", login, config.host, config.port);
                }
                Err(e) => {
                    warn!(
                        "Skipping {}:{} during search for {}: {}",
                        config.host, config.port, login, e
                    );
                }
            }
        }

        counter!(telemetry::USER_LOOKUPS_TOTAL, "result" => "not_found").increment(1);
        Err(Error::UserNotFound)
    }

    /// Search several logins across the federation.
    ///
    /// A login present on several servers is reported once, from the
    /// highest-priority server. Unreachable servers are skipped.
    pub async fn users(&self, logins: &[String]) -> Result<Vec<ExternalUserInfo>> {
        let mut found = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for connector in &self.connectors {
            let pending: Vec<String> = logins
                .iter()
                .filter(|l| !seen.contains(l.as_str()))
                .cloned()
                .collect();
            if pending.is_empty() {
                break;
            }

            let config = connector.config();
            match bounded(config, connector.search_users(&pending)).await {
                Ok(users) => {
                    for user in users {
                        if seen.insert(user.login.clone()) {
                            found.push(user);
                        }
                    }
                }
                Err(e) => {
                    warn!("Skipping {}:{} during batch search: {}", config.host, config.port, e);
                }
            }
        }

        Ok(found)
    }

    /// Authenticate against the first server that accepts the credentials.
    ///
    /// Servers with a per-server fault, and servers that do not know the
    /// user or reject the password, are skipped. A disabled account or any
    /// other failure ends the traversal.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<ExternalUserInfo> {
        for connector in &self.connectors {
            let config = connector.config();

            match bounded(config, connector.authenticate(credentials)).await {
                Ok(user) => {
                    info!(
                        "Authenticated {} on {}:{}",
                        credentials.username, config.host, config.port
                    );
                    counter!(telemetry::AUTHENTICATIONS_TOTAL, "result" => "success").increment(1);
                    return Ok(user);
                }
                Err(e) if e.is_per_server() => {
                    warn!(
                        "Skipping {}:{} during authentication of {}: {}",
                        config.host, config.port, credentials.username, e
                    );
                }
                Err(e @ (Error::UserNotFound | Error::InvalidCredentials)) => {
                    debug!(
                        "Authentication of {} on {}:{} did not succeed: {}",
                        credentials.username, config.host, config.port, e
                    );
                }
                Err(e) => {
                    counter!(telemetry::AUTHENTICATIONS_TOTAL, "result" => "error").increment(1);
                    return Err(e);
                }
            }
        }

        counter!(telemetry::AUTHENTICATIONS_TOTAL, "result" => "rejected").increment(1);
        Err(Error::InvalidCredentials)
    }
}
