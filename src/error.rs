//! Error types and their exit codes.

use thiserror::Error;

/// Exit code for a problem the user can fix (missing or rejected API key).
pub const EXIT_USER_ERROR: u8 = 3;
/// Exit code for an error reported by BusTime itself.
pub const EXIT_UPSTREAM_ERROR: u8 = 4;
/// Exit code for an unreachable host or an unreadable response.
pub const EXIT_TRANSPORT_ERROR: u8 = 5;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("You must set an API_KEY environment variable.")]
    MissingApiKey,

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ConfigError {
    pub const fn exit_code(&self) -> u8 {
        EXIT_USER_ERROR
    }
}

/// Errors raised while talking to the BusTime SIRI API.
#[derive(Debug, Error)]
pub enum BusTimeError {
    /// BusTime answered a stop-monitoring query with a vehicle-monitoring
    /// envelope, or refused the request outright.
    #[error("Invalid MTA API key, please try again.")]
    InvalidApiKey,

    /// The delivery carried an `ErrorCondition`.
    #[error("Error while fetching data: {description}")]
    Upstream { description: String },

    /// A vehicle lookup returned no activity.
    #[error("No vehicle found for ref={vehicle_ref}, line={line_ref}")]
    VehicleNotFound {
        vehicle_ref: String,
        line_ref: String,
    },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("BusTime returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl BusTimeError {
    /// Returns true if the API could not be reached or its answer could not be read.
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::MalformedResponse(_)
        )
    }

    pub const fn exit_code(&self) -> u8 {
        if self.is_transport() {
            return EXIT_TRANSPORT_ERROR;
        }
        match self {
            Self::InvalidApiKey => EXIT_USER_ERROR,
            _ => EXIT_UPSTREAM_ERROR,
        }
    }
}

// The request URL carries the API key, so it is stripped before the message is kept.
impl From<reqwest::Error> for BusTimeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for BusTimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Maps any error produced by a run to the process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<BusTimeError>() {
        e.exit_code()
    } else if let Some(e) = err.downcast_ref::<ConfigError>() {
        e.exit_code()
    } else {
        1
    }
}
