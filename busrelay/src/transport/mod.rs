//! Message transport abstraction.
//!
//! Sessions and delivery slots are written against two small traits rather
//! than a concrete socket type:
//!
//! - [`MessageSource`] - receive the next inbound payload, `None` once the peer
//!   has closed the connection
//! - [`MessageSink`] - send one outbound text message
//!
//! [`websocket`] adapts a split `tokio-tungstenite` stream; [`memory`] is an
//! in-process channel transport used to drive sessions without a network.

mod error;
pub mod memory;
pub mod websocket;

use std::future::Future;

pub use error::TransportError;
pub use websocket::{split_websocket, WsSink, WsSource};

/// Inbound half of a connection.
pub trait MessageSource: Send {
    /// Wait for the next message payload.
    ///
    /// Returns `Ok(None)` when the connection is closed. A clean close is not
    /// an error.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;
}

/// Outbound half of a connection.
pub trait MessageSink: Send {
    /// Send one text message.
    fn send(&mut self, message: String) -> impl Future<Output = Result<(), TransportError>> + Send;
}
