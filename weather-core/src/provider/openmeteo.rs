use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    WeatherError,
    model::{Coordinate, TOKYO, WeatherInfo},
    series::HourlySeries,
    transport::{Transport, UpstreamRequest, UpstreamResponse},
};

use super::WeatherProvider;

pub const FORECAST_PATH: &str = "/v1/forecast";

/// Hourly 2 m temperature forecast for [`TOKYO`] from Open-Meteo.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    pub fn forecast_request(&self) -> UpstreamRequest {
        UpstreamRequest::new(format!("{}{FORECAST_PATH}", self.base_url.trim_end_matches('/')))
            .param("latitude", TOKYO.latitude)
            .param("longitude", TOKYO.longitude)
            .param("hourly", "temperature_2m")
            .param("timeformat", "unixtime")
    }
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<i64>,
    temperature_2m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    latitude: f64,
    longitude: f64,
    elevation: f64,
    utc_offset_seconds: i32,
    timezone: String,
    timezone_abbreviation: String,
    hourly: Option<OmHourly>,
}

/// Body Open-Meteo sends with 4xx responses.
#[derive(Debug, Deserialize)]
struct OmErrorBody {
    reason: String,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_weather(&self) -> Result<WeatherInfo, WeatherError> {
        let request = self.forecast_request();
        tracing::debug!(url = %request.signature(), "Fetching hourly forecast");

        let response = self.transport.send(&request).await.inspect_err(|e| {
            tracing::warn!("Forecast request failed: {e}");
        })?;

        parse_forecast(response).inspect_err(|e| {
            tracing::warn!("Rejected forecast response: {e}");
        })
    }
}

fn parse_forecast(response: UpstreamResponse) -> Result<WeatherInfo, WeatherError> {
    if !response.is_success() {
        let message = serde_json::from_str::<OmErrorBody>(&response.body)
            .map(|b| b.reason)
            .unwrap_or_else(|_| truncate_body(&response.body));
        let message = if message.trim().is_empty() { "empty response body".to_string() } else { message };

        return Err(WeatherError::Upstream {
            status: response.status,
            message,
        });
    }

    if response.body.trim().is_empty() {
        return Err(WeatherError::Malformed("empty response body".into()));
    }

    let parsed: OmForecastResponse = serde_json::from_str(&response.body)
        .map_err(|e| WeatherError::Malformed(format!("Failed to parse Open-Meteo forecast JSON: {e}")))?;

    let hourly = parsed
        .hourly
        .ok_or_else(|| WeatherError::Malformed("response contained no hourly block".into()))?;

    let hourly = HourlySeries::from_unix_times(&hourly.time, hourly.temperature_2m)?.into_records()?;

    Ok(WeatherInfo {
        coordinates: Coordinate {
            latitude: parsed.latitude,
            longitude: parsed.longitude,
        },
        elevation: parsed.elevation,
        timezone: parsed.timezone,
        timezone_abbreviation: parsed.timezone_abbreviation,
        utc_offset_seconds: parsed.utc_offset_seconds,
        hourly,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
