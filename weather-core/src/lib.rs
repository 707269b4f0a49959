//! Core library for the `weather` lookup tool.
//!
//! This crate defines:
//! - Configuration handling
//! - The weather provider abstraction and its OpenWeather implementation
//! - Start-up geolocation with a fixed fallback
//! - Search input parsing and the session search history
//! - Application state, its reducer, and the controller driving lookups
//!
//! It is used by `weather-lookup-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod provider;
pub mod query;
pub mod render;

pub use app::{AppState, Controller, Event, RequestToken, Status, Theme};
pub use config::{Config, GeolocationConfig, GeolocationMode};
pub use error::LookupError;
pub use geolocation::{
    FALLBACK_COORDINATES, FixedLocation, GeolocationResolver, IpLocator, LocateError,
    LocationSource, NoLocation,
};
pub use history::{History, HistoryEntry};
pub use model::{Condition, Coordinates, GeocodeMatch, WeatherSnapshot};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use query::{LocationQuery, QueryError};
