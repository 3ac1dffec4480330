//! Serve command - run the relay server until Ctrl-C.

use std::time::Duration;

use clap::Args;
use tracing::info;

use busrelay::relay::{RelayConfig, RelayServer};

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the serve command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address both endpoints bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port buses (or the emulator) send positions to
    #[arg(long, visible_alias = "lp")]
    pub bus_port: Option<u16>,

    /// Port browsers connect to for bus updates
    #[arg(long, visible_alias = "sp")]
    pub browser_port: Option<u16>,

    /// Milliseconds between updates sent to each browser
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub broadcast_interval_ms: Option<u64>,
}

/// Run the serve command.
pub fn run(args: ServeArgs, options: &GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("serve");

    // CLI > config file > defaults
    let mut config = RelayConfig::from(&runner.config().relay);
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.bus_port {
        config.vehicle_port = port;
    }
    if let Some(port) = args.browser_port {
        config.viewer_port = port;
    }
    if let Some(ms) = args.broadcast_interval_ms {
        config.broadcast_interval = Duration::from_millis(ms);
    }

    runner.run_until_ctrl_c(|shutdown| async move {
        let server = RelayServer::bind(config).await?;
        if let (Some(buses), Some(browsers)) = (server.vehicle_addr(), server.viewer_addr()) {
            println!("Accepting buses on     ws://{}", buses);
            println!("Accepting browsers on  ws://{}", browsers);
            println!("Press Ctrl-C to stop");
        }
        server.run(shutdown).await;
        info!("Relay shut down cleanly");
        Ok::<(), CliError>(())
    })
}
