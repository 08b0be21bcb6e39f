//! Columnar hourly series as the provider describes it, and its expansion
//! into one [`HourlyRecord`] per time step.

use chrono::{DateTime, Utc};

use crate::{WeatherError, model::HourlyRecord};

/// Step used when the provider sends a single sample and the spacing cannot
/// be read off the time column. The request always asks for hourly data.
pub const DEFAULT_INTERVAL_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    /// Unix seconds of the first sample (inclusive).
    pub start: i64,
    /// Unix seconds one step past the last sample (exclusive).
    pub end: i64,
    /// Seconds between samples.
    pub interval: i64,
    /// Temperatures in step order.
    pub values: Vec<Option<f64>>,
}

impl HourlySeries {
    /// Derive start, end and interval from an explicit time column.
    ///
    /// The column must be non-empty, strictly increasing and evenly spaced.
    pub fn from_unix_times(times: &[i64], values: Vec<Option<f64>>) -> Result<Self, WeatherError> {
        let (&start, &last) = match (times.first(), times.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(WeatherError::Malformed("hourly time column is empty".into())),
        };

        let interval = match times {
            [first, second, ..] => second.checked_sub(*first).ok_or_else(|| {
                WeatherError::Malformed(format!("hourly time step {first} -> {second} overflows"))
            })?,
            _ => DEFAULT_INTERVAL_SECS,
        };

        if interval <= 0 {
            return Err(WeatherError::Malformed(format!(
                "hourly time column is not increasing (step {interval}s)"
            )));
        }

        if let Some(pair) = times
            .windows(2)
            .find(|pair| pair[1].checked_sub(pair[0]) != Some(interval))
        {
            return Err(WeatherError::Malformed(format!(
                "hourly time column is unevenly spaced: {} -> {} (expected step {interval}s)",
                pair[0], pair[1]
            )));
        }

        let end = last.checked_add(interval).ok_or_else(|| {
            WeatherError::Malformed(format!("hourly time column ends out of range at {last}"))
        })?;

        Ok(Self {
            start,
            end,
            interval,
            values,
        })
    }

    /// Pair the nth timestamp with the nth value.
    pub fn into_records(self) -> Result<Vec<HourlyRecord>, WeatherError> {
        let dates = expand_time_steps(self.start, self.end, self.interval)?;

        if dates.len() != self.values.len() {
            return Err(WeatherError::Malformed(format!(
                "hourly series has {} time steps but {} temperature values",
                dates.len(),
                self.values.len()
            )));
        }

        Ok(dates
            .into_iter()
            .zip(self.values)
            .map(|(date, temperature_2m)| HourlyRecord { date, temperature_2m })
            .collect())
    }
}

/// Every `interval` seconds from `start` (inclusive) to `end` (exclusive).
pub fn expand_time_steps(start: i64, end: i64, interval: i64) -> Result<Vec<DateTime<Utc>>, WeatherError> {
    if interval <= 0 {
        return Err(WeatherError::Malformed(format!(
            "hourly interval must be positive, got {interval}s"
        )));
    }

    let mut steps = Vec::new();
    let mut ts = start;
    while ts < end {
        let date = DateTime::<Utc>::from_timestamp(ts, 0)
            .ok_or_else(|| WeatherError::Malformed(format!("timestamp {ts} is out of range")))?;
        steps.push(date);
        ts = match ts.checked_add(interval) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(steps)
}
