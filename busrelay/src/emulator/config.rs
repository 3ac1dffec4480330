//! Emulator configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default directory holding route JSON files.
pub const DEFAULT_ROUTES_DIR: &str = "routes";

/// Default number of outbound connections.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Default emission interval per vehicle.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Default per-slot queue capacity.
///
/// One message: a producer waits as soon as its slot has an undelivered
/// message, which is how a stalled connection slows the simulators down.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// Wait between a connection failure and the next connect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Route points between consecutive buses on the same route.
pub const PHASE_SPACING: u64 = 100;

/// Upper bound (inclusive) of the random per-run start offset.
pub const MAX_START_OFFSET: u64 = 1000;

/// Delivery Channel Pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of outbound connections.
    pub size: usize,

    /// Messages buffered per slot before producers wait.
    pub queue_capacity: usize,

    /// Pause before reconnecting after a failure.
    pub reconnect_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Configuration for a full emulator run.
#[derive(Debug, Clone)]
pub struct EmulatorConfig {
    /// Relay address, e.g. `ws://127.0.0.1:8080`.
    pub server_url: String,

    /// Directory with route files.
    pub routes_dir: PathBuf,

    /// How many routes to load; `0` loads all of them.
    pub routes_limit: usize,

    /// Simulated buses per route.
    pub buses_per_route: usize,

    /// Prefix for generated bus ids, distinguishing emulator instances.
    pub emulator_id: String,

    /// Emission interval of every simulator.
    pub refresh_interval: Duration,

    /// Outbound connection pool.
    pub pool: PoolConfig,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080".to_string(),
            routes_dir: PathBuf::from(DEFAULT_ROUTES_DIR),
            routes_limit: 0,
            buses_per_route: 1,
            emulator_id: "emulator".to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            pool: PoolConfig::default(),
        }
    }
}
