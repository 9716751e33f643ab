//! Directory server status

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reachability of one configured directory server, produced per ping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub host: String,
    pub port: u16,
    pub available: bool,

    /// Failure cause; serialized as `""` when the server is available
    #[serde(
        serialize_with = "serialize_error",
        deserialize_with = "deserialize_error",
        default
    )]
    pub error: Option<String>,
}

impl ServerStatus {
    pub fn available(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            available: true,
            error: None,
        }
    }

    pub fn unavailable(host: impl Into<String>, port: u16, cause: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            available: false,
            error: Some(cause.into()),
        }
    }
}

fn serialize_error<S: Serializer>(error: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(error.as_deref().unwrap_or(""))
}

fn deserialize_error<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.filter(|e| !e.is_empty()))
}
