//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`serve`] - Relay server (bus ingestion + browser updates)
//! - [`emulate`] - Bus fleet emulator feeding a relay

pub mod common;
pub mod emulate;
pub mod serve;
