//! WebSocket connector for pool slots.

use tokio::net::TcpStream;
use tokio_tungstenite::MaybeTlsStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use super::pool::{ConnectionError, Connector};
use crate::transport::{split_websocket, MessageSink, MessageSource, TransportError, WsSink};

/// Opens a WebSocket connection to the relay's vehicle endpoint.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Connector for WsConnector {
    type Sink = RelayLink;

    async fn connect(&self) -> Result<Self::Sink, ConnectionError> {
        let (ws, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ConnectionError::Handshake {
                target: self.url.clone(),
                reason: e.to_string(),
            })?;
        debug!(url = %self.url, "Connected to relay");

        let (sink, source) = split_websocket(ws);
        let closed = CancellationToken::new();
        tokio::spawn(watch_replies(source, closed.clone(), self.url.clone()));

        Ok(RelayLink {
            sink,
            closed: closed.clone(),
            _reader: closed.drop_guard(),
        })
    }
}

/// Outbound connection to the relay.
///
/// A background reader drains the inbound half: it logs `Errors` replies and
/// marks the link closed once the relay hangs up. From then on `send` fails
/// with [`TransportError::Closed`] and the slot keeps the message for the next
/// connection. Dropping the link stops the reader.
pub struct RelayLink {
    sink: WsSink<MaybeTlsStream<TcpStream>>,
    closed: CancellationToken,
    _reader: DropGuard,
}

impl RelayLink {
    /// Whether the relay has closed this connection.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl MessageSink for RelayLink {
    async fn send(&mut self, message: String) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.sink.send(message).await
    }
}

async fn watch_replies<S: MessageSource>(mut source: S, closed: CancellationToken, url: String) {
    loop {
        let received = tokio::select! {
            _ = closed.cancelled() => return,
            received = source.recv() => received,
        };
        match received {
            Ok(Some(reply)) => {
                warn!(url = %url, reply = %String::from_utf8_lossy(&reply), "Relay rejected a message");
            }
            Ok(None) => {
                debug!(url = %url, "Relay closed the connection");
                break;
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Relay connection failed");
                break;
            }
        }
    }
    closed.cancel();
}
