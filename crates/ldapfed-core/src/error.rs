//! Error types for Ldapfed

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Identity Errors
    #[error("No user was found on the LDAP server(s)")]
    UserNotFound,

    #[error("Unable to find organization with ID '{0}'")]
    OrgNotFound(i64),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User account is disabled")]
    AccountDisabled,

    // Directory Errors
    #[error("LDAP server {host}:{port} is unreachable: {cause}")]
    DirectoryUnreachable {
        host: String,
        port: u16,
        cause: String,
    },

    #[error("Directory operation failed: {0}")]
    Directory(String),

    #[error("No LDAP servers configured")]
    NoServersConfigured,

    // Team Sync Errors
    #[error("Team lookup unavailable: {0}")]
    TeamLookupUnavailable(String),

    // Configuration Errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal Errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn unreachable(host: impl Into<String>, port: u16, cause: impl Into<String>) -> Self {
        Error::DirectoryUnreachable {
            host: host.into(),
            port,
            cause: cause.into(),
        }
    }

    /// Per-server faults that another server in the federation may still
    /// satisfy.
    pub fn is_per_server(&self) -> bool {
        matches!(
            self,
            Error::DirectoryUnreachable { .. } | Error::Directory(_)
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::UserNotFound => "UserNotFound",
            Error::OrgNotFound(_) => "OrgNotFound",
            Error::InvalidCredentials => "InvalidCredentials",
            Error::AccountDisabled => "AccountDisabled",
            Error::DirectoryUnreachable { .. } => "DirectoryUnreachable",
            Error::Directory(_) => "DirectoryError",
            Error::NoServersConfigured => "LdapNotEnabled",
            Error::TeamLookupUnavailable(_) => "TeamLookupUnavailable",
            Error::InvalidConfig(_) => "InvalidConfig",
            Error::Internal(_) | Error::Io(_) | Error::Other(_) => "InternalError",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Error::OrgNotFound(_) | Error::NoServersConfigured | Error::InvalidConfig(_) => 400,

            Error::InvalidCredentials | Error::AccountDisabled => 401,

            Error::UserNotFound => 404,

            Error::DirectoryUnreachable { .. } | Error::Directory(_) => 502,

            Error::TeamLookupUnavailable(_) => 503,

            _ => 500,
        }
    }
}
