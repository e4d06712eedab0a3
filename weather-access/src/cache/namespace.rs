use std::{borrow::Cow, fmt, time::Duration};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// The independent cache namespaces, one per kind of upstream data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Location,
    Current,
    Forecast,
    Hourly,
    Alerts,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Namespace::Location,
        Namespace::Current,
        Namespace::Forecast,
        Namespace::Hourly,
        Namespace::Alerts,
    ];

    /// How long an entry in this namespace counts as fresh.
    pub const fn ttl(self) -> Duration {
        match self {
            Namespace::Location => Duration::from_secs(7 * DAY),
            Namespace::Current => Duration::from_secs(30 * MINUTE),
            Namespace::Forecast => Duration::from_secs(3 * HOUR),
            Namespace::Hourly => Duration::from_secs(HOUR),
            Namespace::Alerts => Duration::from_secs(HOUR),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Location => "location",
            Namespace::Current => "current",
            Namespace::Forecast => "forecast",
            Namespace::Hourly => "hourly",
            Namespace::Alerts => "alerts",
        }
    }

    /// Map a caller-supplied key onto the key actually stored.
    ///
    /// Place names are case and whitespace insensitive; location keys are
    /// opaque and used verbatim.
    pub fn cache_key(self, raw: &str) -> Cow<'_, str> {
        match self {
            Namespace::Location => Cow::Owned(normalize_place(raw)),
            _ => Cow::Borrowed(raw),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn normalize_place(place: &str) -> String {
    place.trim().to_lowercase()
}
