//! Core library for the weather backend.
//!
//! This crate defines:
//! - The hourly temperature forecast model served over HTTP
//! - The Open-Meteo provider that fetches and reshapes it
//! - A retrying, caching transport in front of the provider
//! - Configuration handling
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod series;
pub mod transport;

pub use config::{CacheConfig, Config, RetryConfig, UpstreamConfig};
pub use error::WeatherError;
pub use model::{Coordinate, HourlyRecord, TOKYO, VersionInfo, WeatherInfo};
pub use provider::{WeatherProvider, openmeteo::OpenMeteoProvider, provider_from_config};
pub use series::{HourlySeries, expand_time_steps};
pub use transport::{Transport, UpstreamRequest, UpstreamResponse};
