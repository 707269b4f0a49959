use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::DEFAULT_BASE_URL,
    error::{LookupError, truncate_body},
    model::{Condition, Coordinates, GeocodeMatch, WeatherSnapshot},
    query::LocationQuery,
};

use super::WeatherProvider;

const GEOCODE: &str = "geocode";
const CURRENT: &str = "current weather";

/// OpenWeather direct geocoding and current weather.
///
/// The key is only ever exposed when building the query string; `Debug`
/// prints it redacted.
#[derive(Debug)]
pub struct OpenWeatherProvider {
    api_key: SecretString,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_geocode(&self, query: &LocationQuery) -> Result<Vec<GeocodeMatch>, LookupError> {
        let url = format!("{}/geo/1.0/direct", self.base_url);
        let q = query.geocode_param();
        debug!(query = %q, "geocoding location");

        let res = self
            .http
            .get(&url)
            .query(&[("q", q.as_str()), ("appid", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| LookupError::transport(GEOCODE, e))?;

        let body = read_body(GEOCODE, res).await?;

        let parsed: Vec<OwGeocodeMatch> =
            serde_json::from_str(&body).map_err(|e| LookupError::parse(GEOCODE, e))?;

        debug!(query = %q, matches = parsed.len(), "geocode finished");

        Ok(parsed.into_iter().map(GeocodeMatch::from).collect())
    }

    async fn fetch_current(&self, at: Coordinates) -> Result<WeatherSnapshot, LookupError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let (lat, lon) = (at.lat.to_string(), at.lon.to_string());
        debug!(%lat, %lon, "fetching current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("APPID", self.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::transport(CURRENT, e))?;

        let body = read_body(CURRENT, res).await?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::parse(CURRENT, e))?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .map(Condition::from)
            .unwrap_or_else(Condition::unknown);

        Ok(WeatherSnapshot {
            id: parsed.id,
            name: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            coordinates: Coordinates::new(parsed.coord.lat, parsed.coord.lon),
            temperature_k: parsed.main.temp,
            temp_min_k: parsed.main.temp_min,
            temp_max_k: parsed.main.temp_max,
            humidity_pct: parsed.main.humidity,
            condition,
            utc_offset_secs: parsed.timezone,
            captured_at: Utc::now(),
        })
    }
}

async fn read_body(endpoint: &'static str, res: Response) -> Result<String, LookupError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| LookupError::transport(endpoint, e))?;

    if !status.is_success() {
        return Err(LookupError::Status {
            endpoint,
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    Ok(body)
}

#[derive(Debug, Deserialize)]
struct OwGeocodeMatch {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<OwGeocodeMatch> for GeocodeMatch {
    fn from(m: OwGeocodeMatch) -> Self {
        GeocodeMatch {
            name: m.name,
            country: m.country,
            state: m.state,
            lat: m.lat,
            lon: m.lon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u16,
    main: String,
    #[serde(default)]
    description: String,
}

impl From<OwWeather> for Condition {
    fn from(w: OwWeather) -> Self {
        Condition {
            id: w.id,
            main: w.main,
            description: w.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    id: u64,
    name: String,
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    sys: OwSys,
    timezone: i32,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, query: &LocationQuery) -> Result<Vec<GeocodeMatch>, LookupError> {
        self.fetch_geocode(query)
            .await
            .inspect_err(|e| warn!(reason = e.reason(), error = %e, "geocode request failed"))
    }

    async fn current(&self, at: Coordinates) -> Result<WeatherSnapshot, LookupError> {
        self.fetch_current(at).await.inspect_err(
            |e| warn!(reason = e.reason(), error = %e, "current weather request failed"),
        )
    }
}
