//! Error types for unsubscribe confirmation.

use thiserror::Error;

/// Why an unsubscribe attempt could not produce a verdict.
///
/// Only `InvalidScheme` reaches callers of `confirm_unsubscribe`; every other
/// variant is logged and reported as an unconfirmed attempt.
#[derive(Debug, Error)]
pub enum UnsubscribeError {
    /// The URL does not use http or https.
    #[error("invalid unsubscribe URL '{0}': it must start with http:// or https://")]
    InvalidScheme(String),
    /// The HTTP client could not be built.
    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// Connection, TLS, redirect or timeout failure.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The response body could not be read or decoded.
    #[error("unable to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl UnsubscribeError {
    pub fn is_timeout(&self) -> bool {
        match self {
            UnsubscribeError::Transport(e) | UnsubscribeError::Body(e) => e.is_timeout(),
            _ => false,
        }
    }
}
