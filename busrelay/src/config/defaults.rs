//! Default values and limits for all configuration settings.
//!
//! The limits are shared with the CLI so that a value is accepted or rejected
//! the same way whether it comes from a flag or from the config file.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use super::settings::*;
use crate::emulator::{
    DEFAULT_POOL_SIZE, DEFAULT_RECONNECT_DELAY, DEFAULT_REFRESH_INTERVAL, DEFAULT_ROUTES_DIR,
};
use crate::relay::{
    DEFAULT_BROADCAST_INTERVAL, DEFAULT_HOST, DEFAULT_VEHICLE_PORT, DEFAULT_VIEWER_PORT,
};

// =============================================================================
// Limits
// =============================================================================

/// Accepted `routes_number` values; 0 loads every route.
pub const ROUTES_NUMBER_RANGE: RangeInclusive<usize> = 0..=1_000_000_000;

/// Accepted `buses_per_route` values.
pub const BUSES_PER_ROUTE_RANGE: RangeInclusive<usize> = 0..=100;

/// Accepted `websockets_number` values.
pub const WEBSOCKETS_NUMBER_RANGE: RangeInclusive<usize> = 1..=20;

/// Accepted `refresh_timeout` values in seconds.
pub const REFRESH_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=60;

/// Highest verbosity value (errors only).
pub const MAX_VERBOSITY: u8 = 50;

/// Verbosity values must be multiples of this.
pub const VERBOSITY_STEP: u8 = 10;

// =============================================================================
// Defaults
// =============================================================================

/// Default verbosity: info.
pub const DEFAULT_VERBOSITY: u8 = 20;

/// Whether `value` is one of 0, 10, 20, 30, 40, 50.
pub fn is_valid_verbosity(value: u8) -> bool {
    value <= MAX_VERBOSITY && value % VERBOSITY_STEP == 0
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            bus_port: DEFAULT_VEHICLE_PORT,
            browser_port: DEFAULT_VIEWER_PORT,
            broadcast_interval_ms: DEFAULT_BROADCAST_INTERVAL.as_millis() as u64,
        }
    }
}

impl Default for EmulatorSettings {
    fn default() -> Self {
        Self {
            server: None,
            routes_dir: PathBuf::from(DEFAULT_ROUTES_DIR),
            routes_number: 0,
            buses_per_route: 1,
            emulator_id: None,
            websockets_number: DEFAULT_POOL_SIZE,
            refresh_timeout: DEFAULT_REFRESH_INTERVAL.as_secs(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY.as_secs(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            verbosity: DEFAULT_VERBOSITY,
            file: None,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            relay: RelaySettings::default(),
            emulator: EmulatorSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
