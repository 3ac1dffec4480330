//! Emulate command - simulate buses driving routes and stream them to a relay.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use busrelay::config::EmulatorSettings;
use busrelay::emulator::{Emulator, EmulatorConfig, PoolConfig, DEFAULT_QUEUE_CAPACITY};

use super::common;
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the emulate command.
#[derive(Debug, Args)]
pub struct EmulateArgs {
    /// Relay address, e.g. "ws://127.0.0.1:8080"
    #[arg(long)]
    pub server: Option<String>,

    /// Directory with route JSON files
    #[arg(long)]
    pub routes_dir: Option<PathBuf>,

    /// Take the first N routes from the directory, 0 for all
    #[arg(long, visible_alias = "rn", value_parser = common::routes_number)]
    pub routes_number: Option<usize>,

    /// Buses on every route, spread over different points
    #[arg(long, short = 'b', value_parser = common::buses_per_route)]
    pub buses_per_route: Option<usize>,

    /// Unique tag for this emulator instance, prefixed to every bus id
    #[arg(long, visible_alias = "id")]
    pub emulator_id: Option<String>,

    /// Number of WebSocket connections, 1 to 20
    #[arg(long, visible_alias = "wn", value_parser = common::websockets_number)]
    pub websockets_number: Option<usize>,

    /// Send each bus position every N seconds, 1 to 60
    #[arg(long, short = 't', value_parser = common::refresh_timeout)]
    pub refresh_timeout: Option<u64>,

    /// Seconds to wait before reconnecting a failed connection
    #[arg(long)]
    pub reconnect_delay: Option<u64>,
}

/// Run the emulate command.
pub fn run(args: EmulateArgs, options: &GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("emulate");

    let config = resolve(args, &runner.config().emulator)?;

    println!("Emulator '{}' sending to {}", config.emulator_id, config.server_url);
    println!("Routes: {}", config.routes_dir.display());
    println!("Press Ctrl-C to stop");

    runner.run_until_ctrl_c(|shutdown| async move {
        Emulator::from_config(config).run(shutdown).await?;
        Ok::<(), CliError>(())
    })
}

/// Merge arguments over config file settings.
fn resolve(args: EmulateArgs, settings: &EmulatorSettings) -> Result<EmulatorConfig, CliError> {
    let server_url = args
        .server
        .or_else(|| settings.server.clone())
        .ok_or_else(|| {
            CliError::Config(
                "relay address is required. \
                 Set server in the [emulator] section or use --server"
                    .to_string(),
            )
        })?;
    let emulator_id = args
        .emulator_id
        .or_else(|| settings.emulator_id.clone())
        .ok_or_else(|| {
            CliError::Config(
                "emulator id is required. \
                 Set emulator_id in the [emulator] section or use --emulator-id"
                    .to_string(),
            )
        })?;

    let refresh_timeout = args.refresh_timeout.unwrap_or(settings.refresh_timeout);
    let reconnect_delay = args.reconnect_delay.unwrap_or(settings.reconnect_delay);

    Ok(EmulatorConfig {
        server_url,
        routes_dir: args.routes_dir.unwrap_or_else(|| settings.routes_dir.clone()),
        routes_limit: args.routes_number.unwrap_or(settings.routes_number),
        buses_per_route: args.buses_per_route.unwrap_or(settings.buses_per_route),
        emulator_id,
        refresh_interval: Duration::from_secs(refresh_timeout),
        pool: PoolConfig {
            size: args.websockets_number.unwrap_or(settings.websockets_number),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            reconnect_delay: Duration::from_secs(reconnect_delay),
        },
    })
}
