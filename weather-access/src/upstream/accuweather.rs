use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::UpstreamConfig,
    error::{WeatherError, WeatherResult},
    model::{Alert, CurrentConditions, DailyForecast, HourlyEntry, Location},
};

use super::{HourlySpan, WeatherUpstream};

pub const DEFAULT_BASE_URL: &str = "http://dataservice.accuweather.com";

/// Substrings that mark a quota or rate-limit rejection in an error body.
/// AccuWeather reports an exhausted quota as a 503 with
/// "The allowed number of requests has been exceeded."
const QUOTA_MARKERS: &[&str] = &[
    "allowed number of requests",
    "requests has been exceeded",
    "rate limit",
    "quota",
    "too many requests",
];

#[derive(Debug, Clone)]
pub struct AccuWeatherClient {
    api_key: String,
    base_url: String,
    language: String,
    metric: bool,
    http: Client,
}

impl AccuWeatherClient {
    pub fn from_config(config: &UpstreamConfig, api_key: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("weather-access/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            metric: config.metric,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn metric_flag(&self) -> &'static str {
        if self.metric { "true" } else { "false" }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> WeatherResult<T> {
        debug!(endpoint, path, "requesting upstream");

        let res = self
            .http
            .get(self.url(path))
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(format!("{endpoint} request failed"), e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| transport_error(format!("failed to read {endpoint} response body"), e))?;

        decode(endpoint, status, &body).map_err(|err| self.redact(err))
    }

    /// Scrub the credential from details the upstream echoed back.
    fn redact(&self, err: WeatherError) -> WeatherError {
        if self.api_key.is_empty() {
            return err;
        }

        let scrub = |detail: String| detail.replace(self.api_key.as_str(), "***");
        match err {
            WeatherError::NotFound(detail) => WeatherError::NotFound(scrub(detail)),
            WeatherError::QuotaExceeded(detail) => WeatherError::QuotaExceeded(scrub(detail)),
            WeatherError::Transport(detail) => WeatherError::Transport(scrub(detail)),
        }
    }
}

/// The request URL carries the API key, so it never reaches the message.
fn transport_error(context: String, err: reqwest::Error) -> WeatherError {
    WeatherError::Transport(format!("{context}: {}", err.without_url()))
}

/// Turn a raw upstream response into a typed payload or a classified error.
fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    status: StatusCode,
    body: &str,
) -> WeatherResult<T> {
    if !status.is_success() {
        let err = classify_failure(status, body);
        debug!(endpoint, status = status.as_u16(), error = %err, "upstream request failed");
        return Err(err);
    }

    serde_json::from_str(body).map_err(|e| {
        WeatherError::Transport(format!("failed to parse {endpoint} response: {e}"))
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiFault {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Classify a non-success upstream response.
///
/// The provider reuses generic statuses for several conditions, so the body
/// is inspected before the status is trusted.
pub fn classify_failure(status: StatusCode, body: &str) -> WeatherError {
    let fault: ApiFault = serde_json::from_str(body).unwrap_or_default();
    let detail = fault.message.clone().unwrap_or_else(|| truncate_body(body));

    let haystack = match (&fault.code, &fault.message) {
        (None, None) => body.to_lowercase(),
        (code, message) => format!(
            "{} {}",
            code.as_deref().unwrap_or_default(),
            message.as_deref().unwrap_or_default()
        )
        .to_lowercase(),
    };

    if status == StatusCode::TOO_MANY_REQUESTS
        || QUOTA_MARKERS.iter().any(|marker| haystack.contains(marker))
    {
        return WeatherError::QuotaExceeded(detail);
    }

    if status == StatusCode::NOT_FOUND {
        return WeatherError::NotFound(detail);
    }

    WeatherError::Transport(format!("unexpected status {status}: {detail}"))
}

fn first_or_not_found<T>(items: Vec<T>, what: impl FnOnce() -> String) -> WeatherResult<T> {
    items.into_iter().next().ok_or_else(|| WeatherError::NotFound(what()))
}

/// Location keys are interpolated into the request path.
fn check_location_key(location_key: &str) -> WeatherResult<()> {
    let valid = !location_key.is_empty()
        && location_key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(WeatherError::NotFound(format!("invalid location key '{location_key}'")))
    }
}

#[async_trait]
impl WeatherUpstream for AccuWeatherClient {
    async fn search_location(&self, place: &str) -> WeatherResult<Location> {
        let matches: Vec<Location> = self
            .fetch(
                "city search",
                "locations/v1/cities/search",
                &[("q", place), ("language", self.language.as_str())],
            )
            .await?;

        first_or_not_found(matches, || format!("no location matches '{place}'"))
    }

    async fn current_conditions(&self, location_key: &str) -> WeatherResult<CurrentConditions> {
        check_location_key(location_key)?;

        let observations: Vec<CurrentConditions> = self
            .fetch(
                "current conditions",
                &format!("currentconditions/v1/{location_key}"),
                &[("details", "true"), ("language", self.language.as_str())],
            )
            .await?;

        first_or_not_found(observations, || {
            format!("no current conditions for location '{location_key}'")
        })
    }

    async fn daily_forecast(&self, location_key: &str) -> WeatherResult<DailyForecast> {
        check_location_key(location_key)?;

        let forecast: DailyForecast = self
            .fetch(
                "daily forecast",
                &format!("forecasts/v1/daily/5day/{location_key}"),
                &[("metric", self.metric_flag()), ("language", self.language.as_str())],
            )
            .await?;

        if forecast.daily_forecasts.is_empty() {
            return Err(WeatherError::NotFound(format!(
                "no daily forecast for location '{location_key}'"
            )));
        }

        Ok(forecast)
    }

    async fn hourly_forecast(
        &self,
        location_key: &str,
        span: HourlySpan,
    ) -> WeatherResult<Vec<HourlyEntry>> {
        check_location_key(location_key)?;

        let hours: Vec<HourlyEntry> = self
            .fetch(
                "hourly forecast",
                &format!("forecasts/v1/hourly/{}hour/{location_key}", span.hours()),
                &[("metric", self.metric_flag()), ("language", self.language.as_str())],
            )
            .await?;

        if hours.is_empty() {
            return Err(WeatherError::NotFound(format!(
                "no hourly forecast for location '{location_key}'"
            )));
        }

        Ok(hours)
    }

    async fn alerts(&self, location_key: &str) -> WeatherResult<Vec<Alert>> {
        check_location_key(location_key)?;

        self.fetch(
            "alerts",
            &format!("alerts/v1/{location_key}"),
            &[("language", self.language.as_str())],
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
