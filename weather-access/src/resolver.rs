//! Cache-first resolution of weather data.
//!
//! Every lookup reads the cache, falls back to the upstream on a miss and
//! writes fresh results through. When the upstream refuses with
//! [`WeatherError::QuotaExceeded`] an expired entry for the same key is
//! served instead, if one exists. `NotFound` and transport failures always
//! propagate.

use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{
    Config,
    cache::{SweepHandle, TtlMap, WeatherCache},
    error::{WeatherError, WeatherResult},
    model::{Alert, CompleteWeather, CurrentConditions, DailyForecast, HourlyEntry, Location},
    upstream::{HourlySpan, WeatherUpstream, upstream_from_config},
};

/// Entry point for route handlers.
#[derive(Clone)]
pub struct WeatherService {
    cache: Arc<WeatherCache>,
    upstream: Arc<dyn WeatherUpstream>,
}

impl WeatherService {
    pub fn new(upstream: Arc<dyn WeatherUpstream>, cache: Arc<WeatherCache>) -> Self {
        Self { cache, upstream }
    }

    /// AccuWeather-backed service with an empty cache.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let upstream = upstream_from_config(config)?;

        Ok(Self::new(upstream, Arc::new(WeatherCache::new())))
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        &self.cache
    }

    /// Start the periodic cache sweep; drop or shut down the handle at exit.
    pub fn start_sweeper(&self, every: Duration) -> SweepHandle {
        self.cache.spawn_sweeper(every)
    }

    async fn resolve<T, F, Fut>(&self, store: &TtlMap<T>, key: &str, fetch: F) -> WeatherResult<T>
    where
        T: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = WeatherResult<T>>,
    {
        let namespace = store.namespace();

        if let Some(value) = store.get(key).await {
            debug!(%namespace, key, "cache hit");
            return Ok(value);
        }

        debug!(%namespace, key, "cache miss, querying upstream");
        match fetch().await {
            Ok(value) => {
                store.put(key, value.clone()).await;
                Ok(value)
            }
            Err(err) if err.is_quota_exceeded() => match store.get_stale(key).await {
                Some(stale) => {
                    warn!(%namespace, key, error = %err, "quota exceeded, serving stale cache entry");
                    Ok(stale)
                }
                None => {
                    warn!(%namespace, key, error = %err, "quota exceeded with nothing cached");
                    Err(err)
                }
            },
            Err(err) => Err(err),
        }
    }

    /// Resolve a place name to the first matching upstream location.
    pub async fn resolve_location(&self, place: &str) -> WeatherResult<Location> {
        let query = place.trim();

        self.resolve(self.cache.locations(), place, || self.upstream.search_location(query))
            .await
    }

    /// Resolve a place name to its location key.
    pub async fn location_key(&self, place: &str) -> WeatherResult<String> {
        self.resolve_location(place).await.map(|location| location.key)
    }

    pub async fn current_conditions(&self, location_key: &str) -> WeatherResult<CurrentConditions> {
        self.resolve(self.cache.current(), location_key, || {
            self.upstream.current_conditions(location_key)
        })
        .await
    }

    pub async fn daily_forecast(&self, location_key: &str) -> WeatherResult<DailyForecast> {
        self.resolve(self.cache.forecasts(), location_key, || {
            self.upstream.daily_forecast(location_key)
        })
        .await
    }

    /// Hourly forecast for 1, 12 or 24 hours; any other count means 12.
    pub async fn hourly_forecast(
        &self,
        location_key: &str,
        hours: u32,
    ) -> WeatherResult<Vec<HourlyEntry>> {
        let span = HourlySpan::coerce(hours);
        let key = hourly_key(location_key, span);

        self.resolve(self.cache.hourly(), &key, || {
            self.upstream.hourly_forecast(location_key, span)
        })
        .await
    }

    pub async fn alerts(&self, location_key: &str) -> WeatherResult<Vec<Alert>> {
        self.resolve(self.cache.alerts(), location_key, || self.upstream.alerts(location_key))
            .await
    }

    /// Location, current conditions, daily and hourly forecast in one call.
    ///
    /// Steps run in order and the first failure is returned as is; callers
    /// that can live with partial data should use the individual lookups.
    pub async fn complete_weather(&self, place: &str) -> WeatherResult<CompleteWeather> {
        let location_key = self.location_key(place).await?;
        let current = self.current_conditions(&location_key).await?;
        let forecast = self.daily_forecast(&location_key).await?;
        let hourly = self.hourly_forecast(&location_key, HourlySpan::default().hours()).await?;

        Ok(CompleteWeather { location_key, current, forecast, hourly })
    }
}

fn hourly_key(location_key: &str, span: HourlySpan) -> String {
    format!("{location_key}:{}", span.hours())
}
