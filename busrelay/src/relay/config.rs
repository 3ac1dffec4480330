//! Relay configuration.

use std::time::Duration;

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port for vehicle ingestion connections.
pub const DEFAULT_VEHICLE_PORT: u16 = 8080;

/// Default port for viewer connections.
pub const DEFAULT_VIEWER_PORT: u16 = 8000;

/// How often each viewer receives the vehicles in its window.
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the relay server.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address both endpoints bind to.
    pub host: String,

    /// Port vehicles (or the emulator) connect to. `0` picks a free port.
    pub vehicle_port: u16,

    /// Port viewers connect to. `0` picks a free port.
    pub viewer_port: u16,

    /// Broadcast cadence for viewer sessions.
    pub broadcast_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            vehicle_port: DEFAULT_VEHICLE_PORT,
            viewer_port: DEFAULT_VIEWER_PORT,
            broadcast_interval: DEFAULT_BROADCAST_INTERVAL,
        }
    }
}

impl From<&crate::config::RelaySettings> for RelayConfig {
    fn from(settings: &crate::config::RelaySettings) -> Self {
        Self {
            host: settings.host.clone(),
            vehicle_port: settings.bus_port,
            viewer_port: settings.browser_port,
            broadcast_interval: Duration::from_millis(settings.broadcast_interval_ms),
        }
    }
}
