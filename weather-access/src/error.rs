use thiserror::Error;

/// Failures surfaced by the weather access layer.
///
/// The set is closed: route handlers match on these three variants to decide
/// between "no data for this place", "try again later" and a generic failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The place or location key yields no upstream data.
    #[error("no weather data found: {0}")]
    NotFound(String),

    /// The upstream refused the request because the API quota is used up.
    #[error("upstream request quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Network failure, malformed body or unexpected status.
    #[error("weather upstream request failed: {0}")]
    Transport(String),
}

/// Payload-free discriminant of [`WeatherError`], for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    QuotaExceeded,
    Transport,
}

impl WeatherError {
    /// The variant of this error without its detail message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::NotFound(_) => ErrorKind::NotFound,
            WeatherError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            WeatherError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// True only for quota rejections, the one case a stale cache entry may answer.
    pub fn is_quota_exceeded(&self) -> bool {
        self.kind() == ErrorKind::QuotaExceeded
    }
}

pub type WeatherResult<T> = Result<T, WeatherError>;
