use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{Config, WeatherError, WeatherInfo, provider::openmeteo::OpenMeteoProvider, transport};

pub mod openmeteo;

/// Source of the forecast served by `GET /weather`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self) -> Result<WeatherInfo, WeatherError>;
}

/// Construct the Open-Meteo provider with the retrying, caching transport
/// described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    let transport = transport::transport_from_config(config)?;
    Ok(Arc::new(OpenMeteoProvider::new(config.upstream.base_url.clone(), transport)))
}
