//! In-process transport backed by tokio channels.
//!
//! Lets a session run against plain channels: the test (or embedding code)
//! keeps the other ends and plays the remote peer.
//!
//! ```ignore
//! let (inbound, source) = memory::source();
//! let (sink, mut outbound) = memory::sink();
//! tokio::spawn(run_ingestion_session(source, sink, store, cancel));
//!
//! inbound.send(br#"{"busId":"1","route":"A","lat":1,"lng":2}"#.to_vec())?;
//! drop(inbound); // peer closes the connection
//! ```

use tokio::sync::mpsc;

use super::{MessageSink, MessageSource, TransportError};

/// Source fed through an unbounded channel. Closed once every sender is dropped.
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

/// Sink writing into an unbounded channel. Fails with
/// [`TransportError::Closed`] once the receiver is dropped.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

/// Create a source and the sender that feeds it.
pub fn source() -> (mpsc::UnboundedSender<Vec<u8>>, ChannelSource) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, ChannelSource { rx })
}

/// Create a sink and the receiver that observes what was sent.
pub fn sink() -> (ChannelSink, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink { tx }, rx)
}

impl MessageSource for ChannelSource {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.rx.recv().await)
    }
}

impl MessageSink for ChannelSink {
    async fn send(&mut self, message: String) -> Result<(), TransportError> {
        self.tx.send(message).map_err(|_| TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_source_yields_then_closes() {
        let (tx, mut source) = source();
        tx.send(b"hello".to_vec()).unwrap();
        drop(tx);

        assert_eq!(source.recv().await.unwrap(), Some(b"hello".to_vec()));
        assert_eq!(source.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sink_fails_after_receiver_dropped() {
        let (mut sink, rx) = sink();
        sink.send("one".to_string()).await.unwrap();
        drop(rx);

        let result = sink.send("two".to_string()).await;
        assert!(matches!(result, Err(TransportError::Closed)));
    }
}
