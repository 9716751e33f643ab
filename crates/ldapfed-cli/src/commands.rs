//! Subcommand implementations

use anyhow::{bail, Context};
use ldapfed_api::{AdminServer, ApiError};
use ldapfed_auth::IdentityService;
use ldapfed_core::config::LdapfedConfig;
use std::time::Duration;
use tracing::info;

pub fn print_version() {
    println!("ldapfed {}", ldapfed_core::VERSION);
}

pub async fn run_server(config: LdapfedConfig) -> anyhow::Result<()> {
    info!("Starting Ldapfed server...");
    info!(
        "LDAP {} with {} server(s)",
        if config.ldap.enabled { "enabled" } else { "disabled" },
        config.ldap.servers.len()
    );

    AdminServer::new(config).run().await?;
    Ok(())
}

/// Print the federation status report as JSON
pub async fn status(config: &LdapfedConfig, timeout: Option<u64>) -> anyhow::Result<()> {
    let service = require_service(config)?;
    let deadline = Duration::from_secs(timeout.unwrap_or(config.server.request_timeout_secs));

    let statuses = service
        .status_within(deadline)
        .await
        .with_context(|| format!("status probe did not complete within {}s", deadline.as_secs()))?;

    println!("{}", serde_json::to_string_pretty(&statuses)?);

    if statuses.iter().any(|s| !s.available) {
        bail!("one or more LDAP servers are unavailable");
    }
    Ok(())
}

/// Print the identity view for `login`, or the error body it would be
/// served with
pub async fn lookup(config: &LdapfedConfig, login: &str) -> anyhow::Result<()> {
    let service = require_service(config)?;

    match service.resolve(login).await {
        Ok(view) => {
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
        Err(e) => {
            let (status, body) = ApiError::from(e).parts();
            println!("{}", serde_json::to_string_pretty(&body)?);
            bail!("lookup of '{}' failed with status {}", login, status.as_u16())
        }
    }
}

fn require_service(config: &LdapfedConfig) -> anyhow::Result<IdentityService> {
    match IdentityService::from_config(config) {
        Some(service) => Ok(service),
        None => bail!("LDAP is not enabled"),
    }
}
