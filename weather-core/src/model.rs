use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// The single location this service reports on (central Tokyo).
pub const TOKYO: Coordinate = Coordinate {
    latitude: 35.6854,
    longitude: 139.7531,
};

/// One hourly sample of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    #[serde(with = "iso_utc")]
    pub date: DateTime<Utc>,
    /// Degrees Celsius; `None` where the provider has no value for the hour.
    pub temperature_2m: Option<f64>,
}

/// Response payload of `GET /weather`.
///
/// `coordinates` are the ones the provider reports back, which are snapped
/// to its grid and therefore differ slightly from [`TOKYO`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub coordinates: Coordinate,
    pub elevation: f64,
    pub timezone: String,
    pub timezone_abbreviation: String,
    pub utc_offset_seconds: i32,
    pub hourly: Vec<HourlyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into() }
    }
}

/// Renders timestamps as `2024-01-01T00:00:00+00:00` rather than chrono's
/// default `Z` suffix.
mod iso_utc {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}
