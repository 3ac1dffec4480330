//! BusRelay - real-time bus position relay and fleet emulator
//!
//! Vehicles stream GPS positions over WebSocket to a relay; viewers (e.g. a
//! browser map) connect to a second endpoint, send the map window they show
//! and receive the vehicles inside it once per second.
//!
//! # Components
//!
//! - [`relay`] - the relay server and its per-connection sessions
//! - [`emulator`] - simulated buses driving routes, delivered over a small
//!   pool of connections
//! - [`codec`] - JSON validation of inbound messages and encoding of outbound
//!   ones
//! - [`store`] - latest position per vehicle
//!
//! # Example
//!
//! ```ignore
//! use busrelay::relay::{RelayConfig, RelayServer};
//! use tokio_util::sync::CancellationToken;
//!
//! let server = RelayServer::bind(RelayConfig::default()).await?;
//! server.run(CancellationToken::new()).await;
//! ```

pub mod codec;
pub mod config;
pub mod emulator;
pub mod logging;
pub mod model;
pub mod relay;
pub mod store;
pub mod transport;

/// Version of the BusRelay library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
