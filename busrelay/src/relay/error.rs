//! Relay error types.

use thiserror::Error;

/// Errors that stop the relay server from starting.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A listening endpoint could not be bound.
    #[error("Failed to bind {endpoint} endpoint on {addr}: {source}")]
    Bind {
        endpoint: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
