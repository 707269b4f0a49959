use anyhow::{Context, bail};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use std::path::Path;
use tracing::{debug, warn};
use weather_lookup_core::{
    Config, Controller, GeolocationResolver, Theme, WeatherProvider,
    provider::{http_client, provider_from_config},
    render::{self, Palette},
};

use crate::session;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather lookup with a session search history")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// OpenWeather API key; overrides the config file.
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Provider base URL; overrides the config file.
    #[arg(long, env = "WEATHER_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Print without ANSI colours.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive session: search, re-search and delete history, toggle theme.
    Session,

    /// Show weather for a "City, Country Code" query and exit.
    Show {
        /// e.g. "Singapore, SG"
        query: String,
    },

    /// Show weather for the current location and exit.
    Here,

    /// Store the OpenWeather API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Session);
        let mut config = load_config(&command, &Config::config_file_path()?)?;
        config.apply_overrides(self.api_key, self.base_url);
        let color = !self.no_color;

        debug!(?command, configured = config.is_configured(), "dispatching");
        match command {
            Command::Configure => configure(config),
            Command::Show { query } => show(&config, &query, color).await,
            Command::Here => here(&config, color).await,
            Command::Session => session::run(&config, color).await,
        }
    }
}

/// `configure` is how a broken config file gets repaired, so it starts from
/// defaults instead of failing; every other command needs a readable file.
fn load_config(command: &Command, path: &Path) -> anyhow::Result<Config> {
    match Config::load_from(path) {
        Ok(config) => Ok(config),
        Err(e) if matches!(command, Command::Configure) => {
            warn!(error = %format!("{e:#}"), "config file is unreadable, starting from defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

pub fn palette(theme: Theme, color: bool) -> Palette {
    if color {
        Palette::for_theme(theme)
    } else {
        Palette::plain()
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let base_url = Text::new("Base URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    config.set_api_key(api_key);
    config.base_url = base_url;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(config: &Config, query: &str, color: bool) -> anyhow::Result<()> {
    let http = http_client(config)?;
    let mut controller = Controller::new(provider_from_config(config, http)?);

    controller.search(query).await;
    finish(&controller, color)
}

async fn here(config: &Config, color: bool) -> anyhow::Result<()> {
    let http = http_client(config)?;
    let resolver = GeolocationResolver::from_config(&config.geolocation, http.clone());
    let mut controller = Controller::new(provider_from_config(config, http)?);

    controller.initialize(&resolver).await;
    finish(&controller, color)
}

fn finish<P: WeatherProvider>(controller: &Controller<P>, color: bool) -> anyhow::Result<()> {
    let state = controller.state();
    let p = palette(state.theme, color);

    if let Some(err) = &state.error {
        bail!("{err}");
    }

    print!("{}", render::weather_card(state.current.as_ref(), Utc::now(), &p));
    Ok(())
}
