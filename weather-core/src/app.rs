//! Application state and the controller that drives it.
//!
//! [`AppState::reduce`] is the only way state changes. The [`Controller`]
//! performs the asynchronous work for each user action and feeds the
//! outcome back in as [`Event`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    LookupError,
    geolocation::GeolocationResolver,
    history::{History, HistoryEntry},
    model::{Coordinates, WeatherSnapshot},
    provider::WeatherProvider,
    query::{LocationQuery, QueryError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// Identifies one triggered fetch. Only the latest token may change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    fn next(self) -> Self {
        RequestToken(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading(RequestToken),
}

#[derive(Debug)]
pub enum Event {
    InputChanged(String),
    /// Clear the search box and the error banner.
    Cleared,
    InputRejected(QueryError),
    /// Issues a fresh token; read it back with [`AppState::latest_token`].
    RequestStarted,
    WeatherLoaded {
        token: RequestToken,
        snapshot: WeatherSnapshot,
        /// Coordinates the fetch was issued with.
        coordinates: Coordinates,
        /// Whether the lookup goes into history.
        record: bool,
        at: DateTime<Utc>,
    },
    LookupFailed {
        token: RequestToken,
        error: LookupError,
    },
    HistoryDeleted(u64),
    ThemeToggled,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub theme: Theme,
    pub input: String,
    pub current: Option<WeatherSnapshot>,
    pub history: History,
    pub error: Option<String>,
    pub status: Status,
    latest: RequestToken,
}

impl AppState {
    pub fn latest_token(&self) -> RequestToken {
        self.latest
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading(_))
    }

    fn is_stale(&self, token: RequestToken) -> bool {
        token != self.latest
    }

    pub fn reduce(mut self, event: Event) -> Self {
        match event {
            Event::InputChanged(text) => {
                self.input = text;
            }
            Event::Cleared => {
                self.input.clear();
                self.error = None;
            }
            Event::InputRejected(err) => {
                self.error = Some(err.to_string());
            }
            Event::RequestStarted => {
                self.latest = self.latest.next();
                self.status = Status::Loading(self.latest);
            }
            Event::WeatherLoaded {
                token,
                snapshot,
                coordinates,
                record,
                at,
            } => {
                if self.is_stale(token) {
                    debug!(?token, latest = ?self.latest, "dropping stale weather response");
                    return self;
                }
                if record {
                    let entry = HistoryEntry::from_snapshot(&snapshot, coordinates, at);
                    self.history = self.history.upsert(entry);
                }
                self.current = Some(snapshot);
                self.input.clear();
                self.error = None;
                self.status = Status::Idle;
            }
            Event::LookupFailed { token, error } => {
                if self.is_stale(token) {
                    debug!(?token, latest = ?self.latest, "dropping stale lookup failure");
                    return self;
                }
                self.error = Some(error.user_message());
                self.status = Status::Idle;
            }
            Event::HistoryDeleted(id) => {
                self.history = self.history.remove(id);
            }
            Event::ThemeToggled => {
                self.theme = self.theme.toggled();
            }
        }
        self
    }
}

/// Owns the state and a provider; one method per user action.
#[derive(Debug)]
pub struct Controller<P> {
    provider: P,
    state: AppState,
}

impl<P: WeatherProvider> Controller<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn dispatch(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(event);
    }

    fn start_request(&mut self) -> RequestToken {
        self.dispatch(Event::RequestStarted);
        self.state.latest_token()
    }

    /// Show weather for wherever the user is. Not recorded in history.
    pub async fn initialize(&mut self, resolver: &GeolocationResolver) {
        let at = resolver.current_location().await;
        let token = self.start_request();
        self.fetch(token, at, false).await;
    }

    /// Parse `raw`, geocode it, and show weather for the first match.
    pub async fn search(&mut self, raw: &str) {
        self.dispatch(Event::InputChanged(raw.to_string()));

        let query = match LocationQuery::parse(raw) {
            Ok(query) => query,
            Err(err) => {
                self.dispatch(Event::InputRejected(err));
                return;
            }
        };

        let token = self.start_request();
        let at = match self.provider.geocode(&query).await {
            Ok(matches) => match matches.first() {
                Some(first) => first.coordinates(),
                None => {
                    let error = LookupError::GeocodeMiss(query.to_string());
                    self.dispatch(Event::LookupFailed { token, error });
                    return;
                }
            },
            Err(error) => {
                self.dispatch(Event::LookupFailed { token, error });
                return;
            }
        };

        self.fetch(token, at, true).await;
    }

    /// Re-run the lookup stored in history under `id`.
    pub async fn select_history(&mut self, id: u64) {
        let Some(at) = self.state.history.get(id).map(|e| e.coordinates) else {
            warn!(id, "history entry not found");
            return;
        };

        let token = self.start_request();
        self.fetch(token, at, true).await;
    }

    pub fn delete_history(&mut self, id: u64) {
        self.dispatch(Event::HistoryDeleted(id));
    }

    pub fn toggle_theme(&mut self) {
        self.dispatch(Event::ThemeToggled);
    }

    pub fn clear(&mut self) {
        self.dispatch(Event::Cleared);
    }

    async fn fetch(&mut self, token: RequestToken, coordinates: Coordinates, record: bool) {
        let event = match self.provider.current(coordinates).await {
            Ok(snapshot) => Event::WeatherLoaded {
                token,
                snapshot,
                coordinates,
                record,
                at: Utc::now(),
            },
            Err(error) => Event::LookupFailed { token, error },
        };
        self.dispatch(event);
    }
}
