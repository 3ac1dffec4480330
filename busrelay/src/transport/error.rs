//! Transport error type.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised while moving messages over a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer is gone.
    #[error("Connection closed")]
    Closed,

    /// WebSocket protocol or I/O failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[source] Box<tungstenite::Error>),

    /// An outbound message could not be serialized.
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether this error only means the other side went away.
    pub fn is_closed(&self) -> bool {
        match self {
            TransportError::Closed => true,
            TransportError::WebSocket(e) => matches!(
                **e,
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed
            ),
            TransportError::Encode(_) => false,
        }
    }
}

impl From<tungstenite::Error> for TransportError {
    fn from(e: tungstenite::Error) -> Self {
        match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::Closed
            }
            tungstenite::Error::Protocol(
                tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
            ) => TransportError::Closed,
            other => TransportError::WebSocket(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_closed_maps_to_closed() {
        let error = TransportError::from(tungstenite::Error::ConnectionClosed);
        assert!(matches!(error, TransportError::Closed));
        assert!(error.is_closed());
    }

    #[test]
    fn test_reset_without_close_handshake_is_closed() {
        let error = TransportError::from(tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
        ));
        assert!(error.is_closed());
    }

    #[test]
    fn test_other_errors_are_not_closed() {
        let error = TransportError::from(tungstenite::Error::Utf8);
        assert!(!error.is_closed());
        assert!(error.to_string().starts_with("WebSocket error"));
    }
}
