//! Federation status probing

use crate::ldap::connector::{bounded, DirectoryConnector};
use crate::telemetry;
use ldapfed_core::types::ServerStatus;
use ldapfed_core::Error;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Probes every configured server concurrently.
///
/// Each probe runs as its own task and writes into the slot matching its
/// configuration position, so the report keeps configuration order even
/// when several servers share a host.
pub struct StatusAggregator {
    connectors: Vec<Arc<dyn DirectoryConnector>>,
}

impl StatusAggregator {
    pub fn new(connectors: Vec<Arc<dyn DirectoryConnector>>) -> Self {
        Self { connectors }
    }

    /// One status per configured server, in configuration order
    pub async fn ping(&self) -> Vec<ServerStatus> {
        let mut probes = JoinSet::new();
        for (slot, connector) in self.connectors.iter().enumerate() {
            let connector = Arc::clone(connector);
            probes.spawn(async move { (slot, probe(connector.as_ref()).await) });
        }

        let mut slots: Vec<Option<ServerStatus>> = vec![None; self.connectors.len()];
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((slot, status)) => slots[slot] = Some(status),
                Err(e) => warn!("Probe task failed: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(&self.connectors)
            .map(|(status, connector)| {
                status.unwrap_or_else(|| {
                    let config = connector.config();
                    ServerStatus::unavailable(&config.host, config.port, "probe task failed")
                })
            })
            .collect()
    }

    /// Like [`ping`](Self::ping) under an overall deadline.
    ///
    /// Returns `None` when the deadline passes; in-flight probes are
    /// aborted and no partial report is produced.
    pub async fn ping_within(&self, deadline: Duration) -> Option<Vec<ServerStatus>> {
        match tokio::time::timeout(deadline, self.ping()).await {
            Ok(statuses) => Some(statuses),
            Err(_) => {
                warn!("Status probe abandoned after {:?}", deadline);
                None
            }
        }
    }
}

async fn probe(connector: &dyn DirectoryConnector) -> ServerStatus {
    let config = connector.config();

    match bounded(config, connector.probe()).await {
        Ok(()) => {
            debug!("LDAP server {}:{} is available", config.host, config.port);
            counter!(telemetry::DIRECTORY_PROBES_TOTAL, "host" => config.host.clone(), "status" => "up")
                .increment(1);
            ServerStatus::available(&config.host, config.port)
        }
        Err(e) => {
            warn!("LDAP server {}:{} is unavailable: {}", config.host, config.port, e);
            counter!(telemetry::DIRECTORY_PROBES_TOTAL, "host" => config.host.clone(), "status" => "down")
                .increment(1);
            ServerStatus::unavailable(&config.host, config.port, failure_cause(e))
        }
    }
}

/// Human-readable cause without the host prefix the status already carries
fn failure_cause(err: Error) -> String {
    match err {
        Error::DirectoryUnreachable { cause, .. } => cause,
        Error::Directory(cause) => cause,
        other => other.to_string(),
    }
}
