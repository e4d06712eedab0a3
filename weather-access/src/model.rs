//! Typed payloads returned by the upstream provider.
//!
//! Field names mirror the provider's PascalCase JSON so that route handlers
//! can serialize the values back out unchanged. Anything the provider may
//! omit is optional.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Region {
    #[serde(rename = "ID")]
    pub id: String,
    pub localized_name: String,
}

/// A place resolved by the city search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    /// Opaque location key, the join key for every other lookup.
    pub key: String,
    pub localized_name: String,
    #[serde(default)]
    pub country: Option<Region>,
    #[serde(default)]
    pub administrative_area: Option<Region>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measure {
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub phrase: Option<String>,
}

/// A measurement reported in both unit systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DualMeasure {
    pub metric: Measure,
    pub imperial: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Wind {
    pub speed: DualMeasure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CurrentConditions {
    #[serde(default)]
    pub local_observation_date_time: Option<DateTime<FixedOffset>>,
    pub weather_text: String,
    #[serde(default)]
    pub weather_icon: Option<u8>,
    #[serde(default)]
    pub has_precipitation: bool,
    #[serde(default)]
    pub is_day_time: bool,
    pub temperature: DualMeasure,
    #[serde(default)]
    pub real_feel_temperature: Option<DualMeasure>,
    #[serde(default)]
    pub relative_humidity: Option<u8>,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Headline {
    #[serde(default)]
    pub effective_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub severity: Option<u8>,
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemperatureRange {
    pub minimum: Measure,
    pub maximum: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayPart {
    #[serde(default)]
    pub icon: Option<u8>,
    pub icon_phrase: String,
    #[serde(default)]
    pub has_precipitation: bool,
    #[serde(default)]
    pub precipitation_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyEntry {
    pub date: DateTime<FixedOffset>,
    pub temperature: TemperatureRange,
    pub day: DayPart,
    pub night: DayPart,
}

/// Multi-day forecast: a short headline plus one entry per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyForecast {
    pub headline: Headline,
    pub daily_forecasts: Vec<DailyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HourlyEntry {
    pub date_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub weather_icon: Option<u8>,
    pub icon_phrase: String,
    #[serde(default)]
    pub has_precipitation: bool,
    #[serde(default)]
    pub is_daylight: bool,
    pub temperature: Measure,
    #[serde(default)]
    pub precipitation_probability: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertDescription {
    pub localized: String,
    #[serde(default)]
    pub english: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertArea {
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub end_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Alert {
    #[serde(rename = "AlertID")]
    pub alert_id: u64,
    pub description: AlertDescription,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub area: Vec<AlertArea>,
}

/// Everything the composite fetch resolves for one place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteWeather {
    pub location_key: String,
    pub current: CurrentConditions,
    pub forecast: DailyForecast,
    pub hourly: Vec<HourlyEntry>,
}
