use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use skycast_core::{
    Completion, Config, FileSlot, HistoryCache, Session, TemperatureUnit,
    gateway::gateway_from_config,
};
use tracing::debug;

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather, forecast and search history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and preferred unit.
    Configure,

    /// Show current weather and forecast for a city.
    Show {
        /// City or location name.
        city: String,

        /// Display unit: c or f. Defaults to the configured unit.
        #[arg(long, value_parser = parse_unit)]
        unit: Option<TemperatureUnit>,

        /// Number of forecast days to request.
        #[arg(long)]
        days: Option<u8>,
    },

    /// Print the stored search history.
    History {
        #[arg(long, value_parser = parse_unit)]
        unit: Option<TemperatureUnit>,

        /// Remove all stored entries.
        #[arg(long)]
        clear: bool,
    },

    /// Prompt for cities until `:quit` (the default).
    Interactive {
        #[arg(long, value_parser = parse_unit)]
        unit: Option<TemperatureUnit>,
    },
}

fn parse_unit(value: &str) -> Result<TemperatureUnit, String> {
    TemperatureUnit::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Interactive { unit: None }) {
            Command::Configure => configure(config),
            Command::Show { city, unit, days } => {
                let days = days.unwrap_or(config.forecast_days);
                let mut session = open_session(&config, unit, days)?;
                show(&mut session, &city).await
            }
            Command::History { unit, clear } => {
                let cache = HistoryCache::new(FileSlot::new(config.history_file_path()?));
                if clear {
                    cache.clear().context("Failed to clear history")?;
                    println!("Search history cleared.");
                    return Ok(());
                }
                let unit = unit.unwrap_or(config.default_unit);
                print!("{}", render::history(&cache.restore(), unit));
                Ok(())
            }
            Command::Interactive { unit } => {
                let session = open_session(&config, unit, config.forecast_days)?;
                interactive::run(session).await
            }
        }
    }
}

fn open_session(
    config: &Config,
    unit: Option<TemperatureUnit>,
    days: u8,
) -> anyhow::Result<Session<FileSlot>> {
    let gateway = gateway_from_config(config)?;
    let history_path = config.history_file_path()?;
    debug!(history = %history_path.display(), days, "opening session");

    let cache = HistoryCache::new(FileSlot::new(history_path));

    Ok(Session::new(gateway, cache, unit.unwrap_or(config.default_unit), days))
}

async fn show(session: &mut Session<FileSlot>, city: &str) -> anyhow::Result<()> {
    if city.trim().is_empty() {
        bail!("City name must not be empty.");
    }

    match session.search(city).await {
        Completion::Applied | Completion::Stale => {
            print!("{}", render::session(session));
            Ok(())
        }
        Completion::Failed(err) => bail!("Weather unavailable for '{city}': {err}"),
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Text::new("WeatherAPI.com key:")
        .with_help_message("Create one at https://www.weatherapi.com/")
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty.");
    }

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == config.default_unit).unwrap_or(0);
    let unit = Select::new("Default unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read default unit")?;

    config.set_api_key(api_key);
    config.default_unit = unit;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}
