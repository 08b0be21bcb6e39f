use thiserror::Error;

/// Everything that can go wrong between issuing the forecast request and
/// handing a [`WeatherInfo`](crate::WeatherInfo) back to the caller.
#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    /// Network, DNS, connect or timeout failure. Retried by the transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("Upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The provider answered 2xx but the payload has an unexpected shape.
    #[error("Malformed upstream payload: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeatherError {
    /// Whether the retry layer should try the request again.
    pub fn is_retryable(&self) -> bool {
        match self {
            WeatherError::Transport(_) => true,
            WeatherError::Upstream { status, .. } => is_retryable_status(*status),
            WeatherError::Malformed(_) | WeatherError::Config(_) => false,
        }
    }
}

/// 5xx, 408 Request Timeout and 429 Too Many Requests are worth another try.
/// Every other 4xx is permanent.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 500..=599 | 408 | 429)
}
