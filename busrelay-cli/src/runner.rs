//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and the async runtime
//! so command handlers only build their library entry point.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use busrelay::config::ConfigFile;
use busrelay::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "busrelay.ini";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub verbosity: Option<u8>,
    pub log_file: Option<PathBuf>,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// Command-line values win over the config file.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let config_path = options
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if options.config.is_some() && !config_path.exists() {
            return Err(CliError::Config(format!(
                "config file '{}' does not exist",
                config_path.display()
            )));
        }
        let config = ConfigFile::load_from(&config_path)?;

        let verbosity = options.verbosity.unwrap_or(config.logging.verbosity);
        let log_file: Option<&Path> = options
            .log_file
            .as_deref()
            .or(config.logging.file.as_deref());

        let logging_guard = init_logging(verbosity, log_file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("BusRelay v{}", busrelay::VERSION);
        info!("BusRelay CLI: {} command", command);
    }

    /// Run `task` on a multi-threaded runtime until it finishes.
    ///
    /// Ctrl-C cancels the token handed to `task`; the task is expected to wind
    /// down and return.
    pub fn run_until_ctrl_c<F, Fut, T>(&self, task: F) -> Result<T, CliError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, CliError>>,
    {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        runtime.block_on(async {
            let shutdown = CancellationToken::new();
            let signal = shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                    return;
                }
                info!("Shutdown requested");
                signal.cancel();
            });

            task(shutdown).await
        })
    }
}
