//! Relay - ingests vehicle positions and serves filtered views to viewers.
//!
//! # Architecture
//!
//! ```text
//!   vehicles ──ws──► IngestionSession ──upsert──► PositionStore
//!                                                     │ snapshot (1 Hz)
//!   viewer ◄──ws── Broadcaster ◄── watch<WindowBounds> ─┘
//!      │                               ▲
//!      └──ws──► BoundsListener ────────┘
//! ```
//!
//! [`RelayServer`] owns two listening endpoints and spawns one session per
//! accepted connection. Each session is tracked and cancelled with the
//! server, so no loop outlives the relay.
//!
//! The sessions themselves ([`run_ingestion_session`], [`run_viewer_session`])
//! are generic over the [`transport`](crate::transport) traits and can be
//! driven without a network.

mod config;
mod error;
mod ingest;
mod server;
mod viewer;

pub use config::{
    RelayConfig, DEFAULT_BROADCAST_INTERVAL, DEFAULT_HOST, DEFAULT_VEHICLE_PORT,
    DEFAULT_VIEWER_PORT,
};
pub use error::RelayError;
pub use ingest::run_ingestion_session;
pub use server::RelayServer;
pub use viewer::run_viewer_session;
