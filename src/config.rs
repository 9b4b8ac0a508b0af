//! Configuration resolution: API key, base URL, stop selection and line refs.

use std::fmt;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;
use crate::stops::{self, STOPS, Stop};

pub const DEFAULT_BASE_URL: &str = "http://bustime.mta.info/api/siri";
pub const DEFAULT_BUS_LINE: &str = "Q18";
pub const DEFAULT_OPERATOR: &str = "MTABC";

/// Operators advertised in `--operator` help. Other values are passed through.
pub const OPERATORS: &[&str] = &["MTA_NYCT", "MTABC"];

/// Connection settings for the BusTime client.
#[derive(Clone)]
pub struct BusTimeConfig {
    pub base_url: Url,
    pub api_key: String,
    /// `None` leaves reqwest's default in place.
    pub timeout: Option<Duration>,
}

impl BusTimeConfig {
    pub fn new(base_url: &str, api_key: String, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            base_url,
            api_key,
            timeout,
        })
    }
}

// Keep the key out of logs and panics.
impl fmt::Debug for BusTimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusTimeConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// What a single run asks BusTime about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopQuery {
    pub stop: Stop,
    pub line_ref: String,
}

impl StopQuery {
    pub fn new(stop: Stop, operator: &str, bus_line: &str) -> Self {
        Self {
            stop,
            line_ref: build_line_ref(operator, bus_line),
        }
    }
}

/// Validates the value read from `API_KEY`.
pub fn resolve_api_key(value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ConfigError::MissingApiKey),
    }
}

/// Joins an operator code and a line name into a BusTime `LineRef`.
///
/// Only the line is uppercased; the operator is used exactly as given.
pub fn build_line_ref(operator: &str, line: &str) -> String {
    format!("{}_{}", operator, line.to_uppercase())
}

/// clap value parser for `--stop`: a 1-based index into [`STOPS`].
pub fn parse_stop(value: &str) -> Result<Stop, String> {
    let position: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a stop number"))?;
    stops::by_position(position)
        .ok_or_else(|| format!("stop must be between 1 and {}", STOPS.len()))
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    // A trailing slash keeps Url::join from dropping the last path segment.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "not a hierarchical URL".to_string(),
        });
    }
    Ok(url)
}
