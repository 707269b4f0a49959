//! Session search history.
//!
//! Newest lookup first, at most one row per provider location id. Every
//! operation returns a new [`History`] and leaves the receiver untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Coordinates, WeatherSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub city: String,
    pub country: String,
    /// Coordinates the lookup was issued with; re-searching uses these.
    pub coordinates: Coordinates,
    pub searched_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_snapshot(
        snapshot: &WeatherSnapshot,
        coordinates: Coordinates,
        searched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: snapshot.id,
            city: snapshot.name.clone(),
            country: snapshot.country.clone(),
            coordinates,
            searched_at,
        }
    }

    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `entry` first, dropping any older row for the same location.
    pub fn upsert(&self, entry: HistoryEntry) -> Self {
        let id = entry.id;
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(entry);
        entries.extend(self.entries.iter().filter(|e| e.id != id).cloned());

        Self { entries }
    }

    pub fn remove(&self, id: u64) -> Self {
        Self {
            entries: self.entries.iter().filter(|e| e.id != id).cloned().collect(),
        }
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
