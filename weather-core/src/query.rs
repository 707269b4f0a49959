use std::{fmt, str::FromStr};
use thiserror::Error;

/// Why a search text was rejected before any request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Please input city and country code")]
    MissingCityAndCountry,

    #[error("Please input city")]
    MissingCity,

    #[error("Please input country code")]
    MissingCountry,
}

/// A `City, Country Code` pair typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub city: String,
    pub country_code: String,
}

impl LocationQuery {
    /// Split `raw` on its first comma and trim both halves.
    ///
    /// Everything after the first comma, further commas included, becomes the
    /// country code unchanged apart from trimming (`"Springfield, IL, US"`
    /// gives `"IL, US"`). Only emptiness is checked; a well-formed but
    /// unknown place is left for geocoding to reject.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(QueryError::MissingCityAndCountry);
        }

        let (city, country) = match raw.split_once(',') {
            Some((city, country)) => (city.trim(), country.trim()),
            None => (raw, ""),
        };

        if city.is_empty() {
            return Err(QueryError::MissingCity);
        }
        if country.is_empty() {
            return Err(QueryError::MissingCountry);
        }

        Ok(Self {
            city: city.to_string(),
            country_code: country.to_string(),
        })
    }

    /// The `q` parameter for direct geocoding: `"{city},{country}"`.
    pub fn geocode_param(&self) -> String {
        format!("{},{}", self.city, self.country_code)
    }
}

impl FromStr for LocationQuery {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country_code)
    }
}
