//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ldapfed_core::Error;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

const ORG_NOT_FOUND_MESSAGE: &str =
    "An oganization was not found - Please verify your LDAP configuration";
const LDAP_DISABLED_MESSAGE: &str = "LDAP is not enabled";

/// Error returned by admin handlers
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    LdapDisabled,
    DeadlineExceeded(Duration),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self {
            error: None,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    /// Status code and body this error is reported with
    pub fn parts(self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Core(Error::OrgNotFound(id)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: Some(Error::OrgNotFound(id).to_string()),
                    message: ORG_NOT_FOUND_MESSAGE.to_string(),
                },
            ),
            ApiError::Core(Error::NoServersConfigured) | ApiError::LdapDisabled => (
                StatusCode::BAD_REQUEST,
                ErrorBody::message(LDAP_DISABLED_MESSAGE),
            ),
            ApiError::DeadlineExceeded(deadline) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorBody::message(format!(
                    "LDAP request did not complete within {}s",
                    deadline.as_secs()
                )),
            ),
            ApiError::Core(err) => {
                let status = StatusCode::from_u16(err.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    error!("LDAP admin request failed [{}]: {}", err.code(), err);
                }
                (status, ErrorBody::message(err.to_string()))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}
