//! Start-up location lookup.
//!
//! [`GeolocationResolver::current_location`] never fails: when the source
//! is unavailable or refuses, the fallback location (Singapore by default)
//! is used instead and the failure is only logged.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::{GeolocationConfig, GeolocationMode},
    model::Coordinates,
};

/// Singapore.
pub const FALLBACK_COORDINATES: Coordinates = Coordinates::new(1.3521, 103.8198);

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("location is not available in this environment")]
    Unsupported,

    #[error("location lookup was refused: {0}")]
    Denied(String),

    #[error("location lookup failed: {0}")]
    Request(String),
}

/// Something that can tell where the user is.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocateError>;
}

/// Always answers with the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Ok(self.0)
    }
}

/// A host with no location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Err(LocateError::Unsupported)
    }
}

/// Looks the caller up by public IP through an ip-api compatible endpoint.
#[derive(Debug, Clone)]
pub struct IpLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

#[async_trait]
impl LocationSource for IpLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        debug!(url = %self.url, "looking up location by IP");

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocateError::Request(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocateError::Request(format!("status {status}")));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocateError::Request(e.to_string()))?;

        if body.status != "success" {
            return Err(LocateError::Denied(
                body.message.unwrap_or_else(|| body.status.clone()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocateError::Request("response has no coordinates".into())),
        }
    }
}

#[derive(Debug)]
pub struct GeolocationResolver {
    source: Box<dyn LocationSource>,
    fallback: Coordinates,
}

impl GeolocationResolver {
    pub fn new(source: impl LocationSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            fallback: FALLBACK_COORDINATES,
        }
    }

    pub fn with_fallback(mut self, fallback: Coordinates) -> Self {
        self.fallback = fallback;
        self
    }

    /// Pick the source described by `config`.
    pub fn from_config(config: &GeolocationConfig, http: Client) -> Self {
        match config.mode {
            GeolocationMode::Ip => Self::new(IpLocator::new(&config.ip_lookup_url, http)),
            GeolocationMode::Fixed => match config.fixed_coordinates() {
                Some(at) => Self::new(FixedLocation(at)),
                None => {
                    warn!("geolocation mode is 'fixed' but lat/lon are not both set");
                    Self::new(NoLocation)
                }
            },
            GeolocationMode::Off => Self::new(NoLocation),
        }
    }

    pub async fn current_location(&self) -> Coordinates {
        match self.source.locate().await {
            Ok(at) => {
                info!(lat = at.lat, lon = at.lon, "resolved current location");
                at
            }
            Err(e) => {
                warn!(error = %e, "Unable to retrieve location, using fallback");
                self.fallback
            }
        }
    }
}
