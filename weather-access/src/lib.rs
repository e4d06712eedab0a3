//! Weather data access layer.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - A TTL cache with one namespace per kind of weather data
//! - The upstream (AccuWeather) client and its failure classification
//! - The cache-first resolver that degrades to stale data on quota errors
//!
//! It is used by `weather-cli`, but is meant to sit behind the route handlers
//! of any service that needs weather lookups.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;
pub mod upstream;

pub use cache::{Namespace, SweepHandle, TtlMap, WeatherCache};
pub use config::{CacheConfig, Config, UpstreamConfig};
pub use error::{ErrorKind, WeatherError, WeatherResult};
pub use model::{Alert, CompleteWeather, CurrentConditions, DailyForecast, HourlyEntry, Location};
pub use resolver::WeatherService;
pub use upstream::{HourlySpan, WeatherUpstream, accuweather::AccuWeatherClient};
