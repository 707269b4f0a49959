//! Plain-text rendering of the weather card, error banner and history list.

use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

use crate::{
    app::{AppState, Theme},
    history::History,
    model::WeatherSnapshot,
};

const DEGREE: char = '\u{b0}';

/// ANSI colours for one theme. [`Palette::plain`] renders without escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub error: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub const fn plain() -> Self {
        Self {
            accent: "",
            muted: "",
            error: "",
            reset: "",
        }
    }

    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                accent: "\x1b[1;35m",
                muted: "\x1b[90m",
                error: "\x1b[1;37;41m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Self {
                accent: "\x1b[1;97m",
                muted: "\x1b[37m",
                error: "\x1b[1;97;41m",
                reset: "\x1b[0m",
            },
        }
    }
}

fn degrees(celsius: f64) -> String {
    format!("{celsius:.0}{DEGREE}")
}

pub fn weather_icon(snapshot: &WeatherSnapshot) -> &'static str {
    if snapshot.is_clear() { "sun" } else { "cloud" }
}

/// The "Today's Weather" card. `now` drives the local clock shown.
pub fn weather_card(snapshot: Option<&WeatherSnapshot>, now: DateTime<Utc>, p: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}Today's Weather{}", p.muted, p.reset);

    let Some(s) = snapshot else {
        let _ = writeln!(out, "{}(no weather yet){}", p.muted, p.reset);
        return out;
    };

    let _ = writeln!(out, "[{}]", weather_icon(s));
    let _ = writeln!(out, "{}{}{}", p.accent, degrees(s.temperature_c()), p.reset);
    let _ = writeln!(
        out,
        "{}H: {} L: {}{}",
        p.muted,
        degrees(s.temp_max_c()),
        degrees(s.temp_min_c()),
        p.reset
    );
    let _ = writeln!(out, "{}", s.display_name());
    let _ = writeln!(
        out,
        "{}  {}  Humidity: {}%",
        s.local_time(now).format("%Y-%m-%d %H:%M:%S"),
        s.condition.main,
        s.humidity_pct
    );
    out
}

pub fn error_banner(message: &str, p: &Palette) -> String {
    format!("{}! {}{}\n", p.error, message, p.reset)
}

/// Rows are numbered from 1 in display order.
pub fn history_list(history: &History, p: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}Search History{}", p.muted, p.reset);

    if history.is_empty() {
        let _ = writeln!(out, "{}(empty){}", p.muted, p.reset);
        return out;
    }

    for (i, entry) in history.iter().enumerate() {
        let searched = entry.searched_at.with_timezone(&Local);
        let _ = writeln!(
            out,
            "{:>2}. {:<28} {}{}{}",
            i + 1,
            entry.label(),
            p.muted,
            searched.format("%Y-%m-%d %H:%M:%S"),
            p.reset
        );
    }
    out
}

/// Everything the session shows between prompts.
pub fn screen(state: &AppState, now: DateTime<Utc>, p: &Palette) -> String {
    let mut out = String::new();
    if let Some(err) = &state.error {
        out.push_str(&error_banner(err, p));
        out.push('\n');
    }
    out.push_str(&weather_card(state.current.as_ref(), now, p));
    out.push('\n');
    out.push_str(&history_list(&state.history, p));
    out
}
