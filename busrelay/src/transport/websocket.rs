//! WebSocket transport over `tokio-tungstenite`.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use super::{MessageSink, MessageSource, TransportError};

/// Receiving half of a WebSocket connection.
pub struct WsSource<S> {
    inner: SplitStream<WebSocketStream<S>>,
}

/// Sending half of a WebSocket connection.
pub struct WsSink<S> {
    inner: SplitSink<WebSocketStream<S>, Message>,
}

/// Split an established WebSocket into transport halves.
pub fn split_websocket<S>(ws: WebSocketStream<S>) -> (WsSink<S>, WsSource<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (sink, stream) = ws.split();
    (WsSink { inner: sink }, WsSource { inner: stream })
}

impl<S> MessageSource for WsSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        while let Some(frame) = self.inner.next().await {
            match frame {
                Ok(Message::Text(text)) => return Ok(Some(text.into_bytes())),
                Ok(Message::Binary(data)) => return Ok(Some(data)),
                Ok(Message::Close(_)) => return Ok(None),
                // Ping/pong are answered by tungstenite itself
                Ok(_) => continue,
                Err(e) => {
                    let error = TransportError::from(e);
                    if error.is_closed() {
                        return Ok(None);
                    }
                    return Err(error);
                }
            }
        }
        Ok(None)
    }
}

impl<S> MessageSink for WsSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, message: String) -> Result<(), TransportError> {
        self.inner.send(Message::Text(message)).await?;
        Ok(())
    }
}
