//! Vehicle emulator - load routes, simulate buses, deliver their positions.
//!
//! ```text
//! RouteSource ──► Emulator ──► VehicleSimulator × N ──► DeliveryPool (M slots) ──► relay
//! ```
//!
//! Simulators never touch the network. Each one is bound to a random pool slot
//! and pushes positions into that slot's queue; the slot owns the connection,
//! reconnects on failure and delivers queued positions in order.

mod config;
mod connector;
mod pool;
mod routes;
mod runner;
mod simulator;

pub use config::{
    EmulatorConfig, PoolConfig, DEFAULT_POOL_SIZE, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_RECONNECT_DELAY, DEFAULT_REFRESH_INTERVAL, DEFAULT_ROUTES_DIR, MAX_START_OFFSET,
    PHASE_SPACING,
};
pub use connector::{RelayLink, WsConnector};
pub use pool::{ConnectionError, Connector, DeliveryPool, SlotHandle};
pub use routes::{load_route, DirectoryRouteSource, RouteError, RouteIter, RouteSource};
pub use runner::{generate_bus_id, Emulator};
pub use simulator::{route_index, VehicleSimulator};
