//! INI configuration file.
//!
//! An optional file with three sections:
//!
//! ```ini
//! [relay]
//! host = 127.0.0.1
//! bus_port = 8080
//! browser_port = 8000
//! broadcast_interval_ms = 1000
//!
//! [emulator]
//! server = ws://127.0.0.1:8080
//! routes_dir = routes
//! routes_number = 0
//! buses_per_route = 1
//! emulator_id = north
//! websockets_number = 5
//! refresh_timeout = 1
//!
//! [logging]
//! verbosity = 20
//! file = busrelay.log
//! ```
//!
//! Missing keys keep their defaults. Command-line arguments take precedence
//! over the file.

mod defaults;
mod file;
mod parser;
mod settings;

pub use file::{
    is_valid_verbosity, ConfigFile, ConfigFileError, EmulatorSettings, LoggingSettings,
    RelaySettings, BUSES_PER_ROUTE_RANGE, DEFAULT_VERBOSITY, MAX_VERBOSITY,
    REFRESH_TIMEOUT_RANGE, ROUTES_NUMBER_RANGE, VERBOSITY_STEP, WEBSOCKETS_NUMBER_RANGE,
};
