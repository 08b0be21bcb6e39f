use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use weather_core::{VersionInfo, WeatherError, WeatherInfo, WeatherProvider};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(weather))
        .route("/version", get(version))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any fetch failure becomes a 500 with `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(e: WeatherError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("Weather fetch failed: {}", self.0);
        let body = json!({ "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// GET /weather — hourly temperature forecast for Tokyo.
async fn weather(State(state): State<AppState>) -> Result<Json<WeatherInfo>, ApiError> {
    let info = state.provider.fetch_weather().await?;
    Ok(Json(info))
}

/// GET /version
async fn version() -> Json<VersionInfo> {
    Json(VersionInfo::new(env!("CARGO_PKG_VERSION")))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
