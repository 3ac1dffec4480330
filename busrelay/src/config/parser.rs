//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::defaults::*;
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
/// Empty values are treated as absent.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [relay] section
    if let Some(section) = ini.section(Some("relay")) {
        if let Some(v) = value(section, "host") {
            config.relay.host = v.to_string();
        }
        if let Some(v) = value(section, "bus_port") {
            config.relay.bus_port = parse("relay", "bus_port", v, "must be a port number")?;
        }
        if let Some(v) = value(section, "browser_port") {
            config.relay.browser_port =
                parse("relay", "browser_port", v, "must be a port number")?;
        }
        if let Some(v) = value(section, "broadcast_interval_ms") {
            let ms: u64 = parse(
                "relay",
                "broadcast_interval_ms",
                v,
                "must be a positive integer (milliseconds)",
            )?;
            if ms == 0 {
                return Err(invalid(
                    "relay",
                    "broadcast_interval_ms",
                    v,
                    "must be a positive integer (milliseconds)",
                ));
            }
            config.relay.broadcast_interval_ms = ms;
        }
    }

    // [emulator] section
    if let Some(section) = ini.section(Some("emulator")) {
        if let Some(v) = value(section, "server") {
            config.emulator.server = Some(v.to_string());
        }
        if let Some(v) = value(section, "routes_dir") {
            config.emulator.routes_dir = PathBuf::from(v);
        }
        if let Some(v) = value(section, "routes_number") {
            config.emulator.routes_number =
                parse_in_range("emulator", "routes_number", v, ROUTES_NUMBER_RANGE)?;
        }
        if let Some(v) = value(section, "buses_per_route") {
            config.emulator.buses_per_route =
                parse_in_range("emulator", "buses_per_route", v, BUSES_PER_ROUTE_RANGE)?;
        }
        if let Some(v) = value(section, "emulator_id") {
            config.emulator.emulator_id = Some(v.to_string());
        }
        if let Some(v) = value(section, "websockets_number") {
            config.emulator.websockets_number =
                parse_in_range("emulator", "websockets_number", v, WEBSOCKETS_NUMBER_RANGE)?;
        }
        if let Some(v) = value(section, "refresh_timeout") {
            config.emulator.refresh_timeout =
                parse_in_range("emulator", "refresh_timeout", v, REFRESH_TIMEOUT_RANGE)?;
        }
        if let Some(v) = value(section, "reconnect_delay") {
            config.emulator.reconnect_delay = parse(
                "emulator",
                "reconnect_delay",
                v,
                "must be a non-negative integer (seconds)",
            )?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = value(section, "verbosity") {
            let verbosity = parse("logging", "verbosity", v, "must be one of 0, 10, 20, 30, 40, 50")
                .ok()
                .filter(|level| is_valid_verbosity(*level));
            config.logging.verbosity = verbosity.ok_or_else(|| {
                invalid("logging", "verbosity", v, "must be one of 0, 10, 20, 30, 40, 50")
            })?;
        }
        if let Some(v) = value(section, "file") {
            config.logging.file = Some(PathBuf::from(v));
        }
    }

    Ok(config)
}

fn value<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value.parse().map_err(|_| invalid(section, key, value, reason))
}

fn parse_in_range<T>(
    section: &str,
    key: &str,
    value: &str,
    range: RangeInclusive<T>,
) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Display,
{
    let reason = format!("must be an integer from {} to {}", range.start(), range.end());
    let parsed: T = parse(section, key, value, &reason)?;
    if !range.contains(&parsed) {
        return Err(invalid(section, key, value, &reason));
    }
    Ok(parsed)
}
