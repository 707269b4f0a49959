//! The interactive lookup session.
//!
//! History lives in the controller for the lifetime of this loop only.

use anyhow::Context;
use chrono::{Local, Utc};
use inquire::{InquireError, Select, Text};
use std::fmt;
use weather_lookup_core::{
    AppState, Config, Controller, GeolocationResolver, HistoryEntry, Theme, WeatherProvider,
    provider::{http_client, provider_from_config},
    render,
};

use crate::cli::palette;

const PLACEHOLDER: &str = "Enter City, Country Code (E.g. Singapore, SG)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Search,
    Reopen,
    Delete,
    ToggleTheme(Theme),
    Clear,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Search => f.write_str("Search"),
            MenuItem::Reopen => f.write_str("Search again from history"),
            MenuItem::Delete => f.write_str("Delete from history"),
            MenuItem::ToggleTheme(Theme::Light) => f.write_str("Switch to dark theme"),
            MenuItem::ToggleTheme(Theme::Dark) => f.write_str("Switch to light theme"),
            MenuItem::Clear => f.write_str("Clear"),
            MenuItem::Quit => f.write_str("Quit"),
        }
    }
}

fn menu(state: &AppState) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::Search];
    if !state.history.is_empty() {
        items.push(MenuItem::Reopen);
        items.push(MenuItem::Delete);
    }
    items.push(MenuItem::ToggleTheme(state.theme));
    if !state.input.is_empty() || state.error.is_some() {
        items.push(MenuItem::Clear);
    }
    items.push(MenuItem::Quit);
    items
}

struct HistoryChoice {
    id: u64,
    label: String,
}

impl From<&HistoryEntry> for HistoryChoice {
    fn from(entry: &HistoryEntry) -> Self {
        let searched = entry.searched_at.with_timezone(&Local);
        Self {
            id: entry.id,
            label: format!("{}  ({})", entry.label(), searched.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl fmt::Display for HistoryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Esc or Ctrl-C at a prompt backs out instead of failing.
fn prompt<T>(res: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Prompt failed"),
    }
}

fn pick_history(state: &AppState, message: &str) -> anyhow::Result<Option<u64>> {
    let choices: Vec<HistoryChoice> = state.history.iter().map(HistoryChoice::from).collect();
    Ok(prompt(Select::new(message, choices).prompt())?.map(|c| c.id))
}

fn draw<P: WeatherProvider>(controller: &Controller<P>, color: bool) {
    let state = controller.state();
    println!();
    print!("{}", render::screen(state, Utc::now(), &palette(state.theme, color)));
    println!();
}

pub async fn run(config: &Config, color: bool) -> anyhow::Result<()> {
    let http = http_client(config)?;
    let resolver = GeolocationResolver::from_config(&config.geolocation, http.clone());
    let mut controller = Controller::new(provider_from_config(config, http)?);

    controller.initialize(&resolver).await;

    loop {
        draw(&controller, color);

        let items = menu(controller.state());
        let Some(item) = prompt(Select::new("What next?", items).prompt())? else {
            break;
        };

        match item {
            MenuItem::Search => {
                let input = controller.state().input.clone();
                let raw = prompt(
                    Text::new("Search:")
                        .with_placeholder(PLACEHOLDER)
                        .with_initial_value(&input)
                        .prompt(),
                )?;
                if let Some(raw) = raw {
                    controller.search(&raw).await;
                }
            }
            MenuItem::Reopen => {
                if let Some(id) = pick_history(controller.state(), "Search again:")? {
                    controller.select_history(id).await;
                }
            }
            MenuItem::Delete => {
                if let Some(id) = pick_history(controller.state(), "Delete:")? {
                    controller.delete_history(id);
                }
            }
            MenuItem::ToggleTheme(_) => controller.toggle_theme(),
            MenuItem::Clear => controller.clear(),
            MenuItem::Quit => break,
        }
    }

    Ok(())
}
