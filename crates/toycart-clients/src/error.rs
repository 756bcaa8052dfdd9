//! Errors raised while talking to downstream services.

use thiserror::Error;

use crate::retry::IsTransient;

/// Errors that can occur when calling the entitlement or catalog service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be built.
    #[error("client build failed: {0}")]
    Build(#[source] reqwest::Error),

    /// The request failed before a response arrived, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("unexpected status {status} from {service}")]
    Status {
        /// Which service answered.
        service: &'static str,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON.
    #[error("invalid response from {service}: {message}")]
    Decode {
        /// Which service answered.
        service: &'static str,
        /// Parser detail.
        message: String,
    },

    /// The caller carried no credential to forward.
    #[error("missing authorization credential")]
    MissingCredential,

    /// The configured base URL cannot be used to build request URLs.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// Returns the HTTP status if the service answered with one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl IsTransient for ClientError {
    /// Not-found, conflict and timeout classes are retried. Everything else
    /// fails immediately.
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout(),
            Self::Status { status, .. } => matches!(status, 404 | 408 | 409 | 504),
            Self::Build(_)
            | Self::Decode { .. }
            | Self::MissingCredential
            | Self::InvalidBaseUrl(_) => false,
        }
    }
}
