//! Argument value parsers shared across CLI commands.
//!
//! Limits come from the library's config module so flags and config file
//! accept the same values.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use busrelay::config::{
    is_valid_verbosity, BUSES_PER_ROUTE_RANGE, REFRESH_TIMEOUT_RANGE, ROUTES_NUMBER_RANGE,
    WEBSOCKETS_NUMBER_RANGE,
};

fn limited<T>(value: &str, range: RangeInclusive<T>) -> Result<T, String>
where
    T: FromStr + PartialOrd + Display,
{
    let parsed: T = value
        .parse()
        .map_err(|_| format!("'{}' is not a whole number", value))?;
    if !range.contains(&parsed) {
        return Err(format!(
            "{} is out of range, expected {} to {}",
            value,
            range.start(),
            range.end()
        ));
    }
    Ok(parsed)
}

pub fn routes_number(value: &str) -> Result<usize, String> {
    limited(value, ROUTES_NUMBER_RANGE)
}

pub fn buses_per_route(value: &str) -> Result<usize, String> {
    limited(value, BUSES_PER_ROUTE_RANGE)
}

pub fn websockets_number(value: &str) -> Result<usize, String> {
    limited(value, WEBSOCKETS_NUMBER_RANGE)
}

pub fn refresh_timeout(value: &str) -> Result<u64, String> {
    limited(value, REFRESH_TIMEOUT_RANGE)
}

/// Verbosity: 0 (everything) to 50 (errors only) in steps of 10.
pub fn verbosity(value: &str) -> Result<u8, String> {
    value
        .parse()
        .ok()
        .filter(|level| is_valid_verbosity(*level))
        .ok_or_else(|| format!("'{}' is not one of 0, 10, 20, 30, 40, 50", value))
}
