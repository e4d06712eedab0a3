use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Config,
    error::WeatherResult,
    model::{Alert, CurrentConditions, DailyForecast, HourlyEntry, Location},
    upstream::accuweather::AccuWeatherClient,
};

pub mod accuweather;

/// Hour spans the hourly forecast endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HourlySpan {
    One,
    #[default]
    Twelve,
    TwentyFour,
}

impl HourlySpan {
    /// Map a requested hour count onto a supported span; anything
    /// unsupported becomes twelve hours.
    pub fn coerce(hours: u32) -> Self {
        match hours {
            1 => HourlySpan::One,
            24 => HourlySpan::TwentyFour,
            _ => HourlySpan::Twelve,
        }
    }

    pub const fn hours(self) -> u32 {
        match self {
            HourlySpan::One => 1,
            HourlySpan::Twelve => 12,
            HourlySpan::TwentyFour => 24,
        }
    }
}

/// One call per upstream endpoint. Implementations classify failures into
/// [`crate::WeatherError`] and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherUpstream: Send + Sync {
    /// Resolve a free-text place name; the first match wins.
    async fn search_location(&self, place: &str) -> WeatherResult<Location>;

    async fn current_conditions(&self, location_key: &str) -> WeatherResult<CurrentConditions>;

    async fn daily_forecast(&self, location_key: &str) -> WeatherResult<DailyForecast>;

    async fn hourly_forecast(
        &self,
        location_key: &str,
        span: HourlySpan,
    ) -> WeatherResult<Vec<HourlyEntry>>;

    /// Active alerts; an empty list is a valid answer.
    async fn alerts(&self, location_key: &str) -> WeatherResult<Vec<Alert>>;
}

/// Construct the AccuWeather client from config.
pub fn upstream_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherUpstream>> {
    let api_key = config.api_key()?;
    let client = AccuWeatherClient::from_config(&config.upstream, api_key.to_owned())?;

    Ok(Arc::new(client))
}
