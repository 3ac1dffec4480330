//! BusRelay CLI - Command-line interface
//!
//! This binary runs either the relay server or the bus emulator.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::emulate::EmulateArgs;
use commands::serve::ServeArgs;
use runner::GlobalOptions;

#[derive(Parser)]
#[command(name = "busrelay")]
#[command(version = busrelay::VERSION)]
#[command(about = "Real-time bus position relay and fleet emulator", long_about = None)]
struct Cli {
    /// Config file (default: ./busrelay.ini when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity from 0 (everything) to 50 (errors only) in steps of 10
    #[arg(long, short = 'v', global = true, value_parser = commands::common::verbosity)]
    verbosity: Option<u8>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay: receive bus positions and push them to browsers
    Serve(ServeArgs),
    /// Emulate buses driving routes and send their positions to a relay
    Emulate(EmulateArgs),
}

fn main() {
    let cli = Cli::parse();
    let options = GlobalOptions {
        config: cli.config,
        verbosity: cli.verbosity,
        log_file: cli.log_file,
    };

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args, &options),
        Commands::Emulate(args) => commands::emulate::run(args, &options),
    };

    if let Err(e) = result {
        e.exit();
    }
}
