use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

use crate::{
    Config, LookupError,
    model::{Coordinates, GeocodeMatch, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
    query::LocationQuery,
};

pub mod openweather;

/// A source of geocoding and current conditions.
///
/// Each call is a single attempt: no retry, no backoff.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Candidates for `query`, best first. No match is `Ok` with an empty list.
    async fn geocode(&self, query: &LocationQuery) -> Result<Vec<GeocodeMatch>, LookupError>;

    /// Current conditions at exactly `at`.
    async fn current(&self, at: Coordinates) -> Result<WeatherSnapshot, LookupError>;
}

/// HTTP client shared by the provider and the IP locator.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .build()
        .context("Failed to build HTTP client")
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config, http: Client) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `weather configure`, or set WEATHER_API_KEY."
        )
    })?;

    Ok(OpenWeatherProvider::new(api_key)
        .with_base_url(&config.base_url)
        .with_http_client(http))
}
