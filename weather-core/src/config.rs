use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::WeatherError;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

/// Where and how the forecast provider is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_factor_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor_secs: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// bind = "0.0.0.0:8000"
///
/// [retry]
/// max_attempts = 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server listens on.
    pub bind: String,
    pub upstream: UpstreamConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            upstream: UpstreamConfig::default(),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or return defaults if
    /// it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-backend", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(WeatherError::Config("upstream.base_url must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(WeatherError::Config("retry.max_attempts must be at least 1".into()));
        }
        self.retry.backoff_factor()?;
        Ok(())
    }
}

impl RetryConfig {
    /// `backoff_factor_secs` as a `Duration`; rejects negative, NaN and
    /// values too large to represent.
    pub fn backoff_factor(&self) -> Result<Duration, WeatherError> {
        let factor = self.backoff_factor_secs;
        Duration::try_from_secs_f64(factor).map_err(|e| {
            WeatherError::Config(format!(
                "retry.backoff_factor_secs must be a non-negative number of seconds, got {factor}: {e}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_upstream_policy() {
        let cfg = Config::default();

        assert_eq!(cfg.bind, "127.0.0.1:8000");
        assert_eq!(cfg.upstream.base_url, "https://api.open-meteo.com");
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.retry.backoff_factor_secs, 0.2);
        assert_eq!(cfg.cache.ttl_secs, 3600);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "bind = \"0.0.0.0:9000\"\n[retry]\nmax_attempts = 3\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.bind, "0.0.0.0:9000");
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.backoff_factor_secs, 0.2);
        assert_eq!(cfg.cache.ttl_secs, 3600);
    }

    #[test]
    fn garbage_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "bind = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut cfg = Config::default();
        cfg.retry.max_attempts = 0;

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn negative_backoff_is_rejected() {
        let mut cfg = Config::default();
        cfg.retry.backoff_factor_secs = -1.0;
        assert!(cfg.validate().is_err());

        cfg.retry.backoff_factor_secs = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_backoff_is_rejected() {
        let mut cfg = Config::default();
        cfg.retry.backoff_factor_secs = 1e20;

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("backoff_factor_secs"));
    }

    #[test]
    fn oversized_backoff_in_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[retry]\nbackoff_factor_secs = 1e20\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn default_backoff_is_200ms() {
        assert_eq!(RetryConfig::default().backoff_factor().unwrap(), Duration::from_millis(200));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let mut cfg = Config::default();
        cfg.upstream.base_url = "  ".into();
        assert!(cfg.validate().is_err());
    }
}
