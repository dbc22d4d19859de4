//! Error types for the Signifyd case client.
//!
//! # Design
//! Only faults that prevent a normalized response from existing become an
//! `ApiError`. An HTTP error status (401, 404, 5xx, ...) or an undecodable
//! body is an ordinary outcome and is reported through `CaseResponse`
//! instead.

use thiserror::Error;

/// Errors returned by `SignifydClient` operations and transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The exchange never produced an HTTP response (DNS, refused
    /// connection, TLS handshake, broken body stream).
    #[error("transport failed: {0}")]
    Transport(String),
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
