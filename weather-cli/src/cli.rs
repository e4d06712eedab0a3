use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use serde::Serialize;
use tracing::debug;
use weather_access::{Config, ErrorKind, WeatherError, WeatherService};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Cached AccuWeather lookups")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the AccuWeather API key in the config file.
    Configure,

    /// Resolve a place name to its location.
    Location { place: String },

    /// Current conditions for a place.
    Current { place: String },

    /// Five-day daily forecast for a place.
    Forecast { place: String },

    /// Hourly forecast for a place.
    Hourly {
        place: String,

        /// 1, 12 or 24; anything else means 12.
        #[arg(long, default_value_t = 12)]
        hours: u32,
    },

    /// Active weather alerts for a place.
    Alerts { place: String },

    /// Location, current conditions, daily and hourly forecast together.
    All { place: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        if let Command::Configure = self.command {
            return configure();
        }

        let config = Config::load()?;
        debug!(command = ?self.command, base_url = %config.upstream.base_url, "running command");

        let service = WeatherService::from_config(&config)?;
        let sweeper = service.start_sweeper(config.cache.sweep_interval());

        let output = self.command.execute(&service).await;
        sweeper.shutdown();

        println!("{}", output?);
        Ok(())
    }
}

impl Command {
    async fn execute(&self, service: &WeatherService) -> anyhow::Result<String> {
        match self {
            Command::Configure => Err(anyhow!("configure does not query the weather service")),
            Command::Location { place } => render(service.resolve_location(place).await),
            Command::Current { place } => {
                let key = service.location_key(place).await.map_err(user_error)?;
                render(service.current_conditions(&key).await)
            }
            Command::Forecast { place } => {
                let key = service.location_key(place).await.map_err(user_error)?;
                render(service.daily_forecast(&key).await)
            }
            Command::Hourly { place, hours } => {
                let key = service.location_key(place).await.map_err(user_error)?;
                render(service.hourly_forecast(&key, *hours).await)
            }
            Command::Alerts { place } => {
                let key = service.location_key(place).await.map_err(user_error)?;
                render(service.alerts(&key).await)
            }
            Command::All { place } => render(service.complete_weather(place).await),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_from(&Config::config_file_path()?)?;

    let api_key = Password::new("AccuWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    let path = config.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn render<T: Serialize>(result: Result<T, WeatherError>) -> anyhow::Result<String> {
    let value = result.map_err(user_error)?;

    serde_json::to_string_pretty(&value).context("Failed to serialize response")
}

fn user_error(err: WeatherError) -> anyhow::Error {
    match err.kind() {
        ErrorKind::NotFound => anyhow!("No weather data for this place ({err})"),
        ErrorKind::QuotaExceeded => {
            anyhow!("Weather service temporarily unavailable, try again later ({err})")
        }
        ErrorKind::Transport => anyhow::Error::new(err),
    }
}
