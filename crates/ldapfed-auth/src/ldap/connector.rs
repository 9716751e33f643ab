//! Directory connector abstraction

use async_trait::async_trait;
use ldapfed_core::types::{Credentials, ExternalUserInfo, ServerConfig};
use ldapfed_core::{Error, Result};

/// Bind, search and probe against one physical directory server.
///
/// Connectivity failures are reported as `Error::DirectoryUnreachable`;
/// a reachable server that rejects an operation reports `Error::Directory`.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Configuration of the server behind this connector
    fn config(&self) -> &ServerConfig;

    /// Check that the server accepts connections
    async fn probe(&self) -> Result<()>;

    /// Search for the given logins; missing logins are simply absent
    async fn search_users(&self, logins: &[String]) -> Result<Vec<ExternalUserInfo>>;

    /// Search for a single login
    async fn search_user(&self, login: &str) -> Result<Option<ExternalUserInfo>> {
        let users = self.search_users(&[login.to_string()]).await?;
        Ok(users.into_iter().next())
    }

    /// Verify credentials by binding as the user.
    ///
    /// Fails with `UserNotFound`, `InvalidCredentials` or `AccountDisabled`
    /// when the server is reachable but refuses the user.
    async fn authenticate(&self, credentials: &Credentials) -> Result<ExternalUserInfo>;
}

/// Run one connector call under the server's own timeout.
///
/// An elapsed call is reported as the server being unreachable.
pub(crate) async fn bounded<T, F>(config: &ServerConfig, call: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio::time::timeout(config.timeout(), call).await {
        Ok(result) => result,
        Err(_) => Err(Error::unreachable(
            &config.host,
            config.port,
            format!("timed out after {}s", config.timeout_seconds),
        )),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// In-memory connector with scripted behavior
    pub(crate) struct FakeConnector {
        pub config: ServerConfig,
        pub users: Vec<ExternalUserInfo>,
        pub password: String,
        pub unreachable: Option<String>,
        pub directory_fault: Option<String>,
        pub probe_delay: Duration,
        pub search_delay: Duration,
        pub account_disabled: bool,
        pub searches: Arc<AtomicUsize>,
    }

    impl FakeConnector {
        pub fn new(host: &str, port: u16) -> Self {
            Self {
                config: ServerConfig {
                    host: host.to_string(),
                    port,
                    search_base_dns: vec!["dc=grafana,dc=org".to_string()],
                    ..Default::default()
                },
                users: Vec::new(),
                password: "secret".to_string(),
                unreachable: None,
                directory_fault: None,
                probe_delay: Duration::ZERO,
                search_delay: Duration::ZERO,
                account_disabled: false,
                searches: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn unreachable(mut self, cause: &str) -> Self {
            self.unreachable = Some(cause.to_string());
            self
        }

        /// Fail searches and binds with a directory error, as a rejected
        /// service bind does
        pub fn with_directory_fault(mut self, message: &str) -> Self {
            self.directory_fault = Some(message.to_string());
            self
        }

        pub fn with_probe_delay(mut self, delay: Duration) -> Self {
            self.probe_delay = delay;
            self
        }

        /// Delay applied to searches and binds
        pub fn with_search_delay(mut self, delay: Duration) -> Self {
            self.search_delay = delay;
            self
        }

        pub fn with_disabled_account(mut self) -> Self {
            self.account_disabled = true;
            self
        }

        pub fn with_user(mut self, user: ExternalUserInfo) -> Self {
            self.users.push(user);
            self
        }

        fn check_reachable(&self) -> Result<()> {
            match &self.unreachable {
                Some(cause) => Err(Error::unreachable(&self.config.host, self.config.port, cause)),
                None => Ok(()),
            }
        }

        fn check_directory(&self) -> Result<()> {
            self.check_reachable()?;
            match &self.directory_fault {
                Some(message) => Err(Error::Directory(message.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl DirectoryConnector for FakeConnector {
        fn config(&self) -> &ServerConfig {
            &self.config
        }

        async fn probe(&self) -> Result<()> {
            tokio::time::sleep(self.probe_delay).await;
            self.check_reachable()
        }

        async fn search_users(&self, logins: &[String]) -> Result<Vec<ExternalUserInfo>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.search_delay).await;
            self.check_directory()?;
            Ok(self
                .users
                .iter()
                .filter(|u| logins.contains(&u.login))
                .cloned()
                .collect())
        }

        async fn authenticate(&self, credentials: &Credentials) -> Result<ExternalUserInfo> {
            tokio::time::sleep(self.search_delay).await;
            self.check_directory()?;
            let user = self
                .users
                .iter()
                .find(|u| u.login == credentials.username)
                .ok_or(Error::UserNotFound)?;
            if credentials.password != self.password {
                return Err(Error::InvalidCredentials);
            }
            if self.account_disabled {
                return Err(Error::AccountDisabled);
            }
            Ok(user.clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_reports_timeout_as_unreachable() {
        let config = ServerConfig {
            host: "10.0.0.9".to_string(),
            timeout_seconds: 3,
            ..Default::default()
        };

        let err = bounded(&config, async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(err.is_per_server());
        assert_eq!(
            err.to_string(),
            "LDAP server 10.0.0.9:389 is unreachable: timed out after 3s"
        );
    }

    #[tokio::test]
    async fn test_default_search_user_takes_first_match() {
        let user = ExternalUserInfo {
            login: "johndoe".to_string(),
            ..Default::default()
        };
        let fake = FakeConnector::new("10.0.0.3", 389).with_user(user.clone());

        assert_eq!(fake.search_user("johndoe").await.unwrap(), Some(user));
        assert_eq!(fake.search_user("ghost").await.unwrap(), None);
    }
}
