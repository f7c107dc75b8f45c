//! iControl client errors

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the iControl REST API
#[derive(Debug, Error)]
pub enum IControlError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with something other than 200 OK
    #[error("iControl {method} {url} failed, HTTP RESPONSE code {status}; error {body}")]
    Status {
        method: String,
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Login was rejected by the device
    #[error("Authentication failed, HTTP RESPONSE code {status}; error {body}")]
    Authentication { status: StatusCode, body: String },

    /// Login succeeded but the response carried no `token.token` field
    #[error("Login response did not contain a token")]
    MissingToken,

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IControlError {
    /// HTTP status carried by the error, if the device answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } | Self::Authentication { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            _ => None,
        }
    }
}
