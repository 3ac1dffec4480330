//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing logic.

use std::path::PathBuf;

/// Complete configuration loaded from an INI file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Relay server settings
    pub relay: RelaySettings,
    /// Vehicle emulator settings
    pub emulator: EmulatorSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// `[relay]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    /// Address both endpoints bind to
    pub host: String,
    /// Port vehicles connect to
    pub bus_port: u16,
    /// Port viewers connect to
    pub browser_port: u16,
    /// Viewer broadcast cadence in milliseconds
    pub broadcast_interval_ms: u64,
}

/// `[emulator]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorSettings {
    /// Relay address, e.g. `ws://127.0.0.1:8080`
    pub server: Option<String>,
    /// Directory with route JSON files
    pub routes_dir: PathBuf,
    /// Routes to load, 0 for all
    pub routes_number: usize,
    /// Buses simulated on every route
    pub buses_per_route: usize,
    /// Prefix for bus ids
    pub emulator_id: Option<String>,
    /// Outbound WebSocket connections
    pub websockets_number: usize,
    /// Seconds between positions of one bus
    pub refresh_timeout: u64,
    /// Seconds to wait before reconnecting a failed connection
    pub reconnect_delay: u64,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// 0 (everything) to 50 (errors only) in steps of 10
    pub verbosity: u8,
    /// Optional log file, in addition to stderr
    pub file: Option<PathBuf>,
}
