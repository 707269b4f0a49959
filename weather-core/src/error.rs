use thiserror::Error;

use crate::query::QueryError;

/// Shown when a lookup got as far as the provider but produced no weather.
pub const WEATHER_NOT_FOUND: &str = "Weather data for this location cannot be found";

/// Shown when geocoding found nothing for a well-formed query.
pub const INVALID_LOCATION: &str = "City and Country are invalid";

/// Everything that can stop a lookup from producing a snapshot.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    InvalidInput(#[from] QueryError),

    #[error("No location matches '{0}'")]
    GeocodeMiss(String),

    #[error("Failed to send {endpoint} request: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {endpoint} response: {message}")]
    Parse {
        endpoint: &'static str,
        message: String,
    },
}

impl LookupError {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            LookupError::InvalidInput(_) => "invalid_input",
            LookupError::GeocodeMiss(_) => "geocode_miss",
            LookupError::Transport { .. } => "transport",
            LookupError::Status { .. } => "status",
            LookupError::Parse { .. } => "parse",
        }
    }

    /// Message for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::InvalidInput(err) => err.to_string(),
            LookupError::GeocodeMiss(_) => INVALID_LOCATION.to_string(),
            _ => WEATHER_NOT_FOUND.to_string(),
        }
    }

    /// Request URLs carry the API key, so they are stripped before the
    /// error is kept anywhere.
    pub(crate) fn transport(endpoint: &'static str, err: reqwest::Error) -> Self {
        LookupError::Transport {
            endpoint,
            message: err.without_url().to_string(),
        }
    }

    pub(crate) fn parse(endpoint: &'static str, err: serde_json::Error) -> Self {
        LookupError::Parse {
            endpoint,
            message: err.to_string(),
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
