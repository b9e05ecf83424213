//! Configuration Module
//!
//! Loads the discovery service configuration from environment variables.
//! Values are read and validated once; the resulting `Config` is immutable.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::ecs::{default_cache_config, DEFAULT_TTL, SWEEP_INTERVAL};
use crate::error::{DiscoveryError, Result};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Service configuration parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Time between refresh ticks
    pub refresh_interval: Duration,
    /// file_sd output path, `None` when file output is disabled
    pub output_file: Option<PathBuf>,
    /// HTTP server port
    pub server_port: u16,
    /// Default tracing level for this crate
    pub log_level: String,
    /// Base URL of the ECS JSON API
    pub ecs_endpoint: String,
    /// Timeout for each remote call
    pub request_timeout: Duration,
    /// Default TTL for cached remote responses
    pub cache_ttl: Duration,
    /// Interval between cache sweeps
    pub cache_sweep_interval: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ECS_SD_REFRESH_INTERVAL` - Seconds between refreshes (default: 60)
    /// - `ECS_SD_OUTPUT_FILE` - file_sd output path, empty disables (default: ecs_sd.json)
    /// - `ECS_SD_SERVER_PORT` - HTTP server port (default: 9723)
    /// - `ECS_SD_LOG_LEVEL` - Default log level (default: warn)
    /// - `ECS_SD_ENDPOINT` - ECS API base URL (default: regional endpoint)
    /// - `AWS_REGION` - Region for the default endpoint (default: us-east-1)
    /// - `ECS_SD_CACHE_TTL` - Cache TTL in seconds (default: 900)
    /// - `ECS_SD_CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 1800)
    /// - `ECS_SD_REQUEST_TIMEOUT` - Remote call timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let refresh_interval = seconds(&lookup, "ECS_SD_REFRESH_INTERVAL", defaults.refresh_interval)?;
        if refresh_interval.is_zero() {
            return Err(DiscoveryError::Config(
                "ECS_SD_REFRESH_INTERVAL must be greater than 0".to_string(),
            ));
        }

        let cache_sweep_interval =
            seconds(&lookup, "ECS_SD_CACHE_SWEEP_INTERVAL", defaults.cache_sweep_interval)?;
        if cache_sweep_interval.is_zero() {
            return Err(DiscoveryError::Config(
                "ECS_SD_CACHE_SWEEP_INTERVAL must be greater than 0".to_string(),
            ));
        }

        let log_level = lookup("ECS_SD_LOG_LEVEL")
            .map(|level| level.trim().to_ascii_lowercase())
            .unwrap_or(defaults.log_level);
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(DiscoveryError::Config(format!(
                "ECS_SD_LOG_LEVEL must be one of {}, got {log_level:?}",
                LOG_LEVELS.join(", ")
            )));
        }

        let output_file = match lookup("ECS_SD_OUTPUT_FILE") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => defaults.output_file,
        };

        let ecs_endpoint = match lookup("ECS_SD_ENDPOINT") {
            Some(endpoint) if !endpoint.trim().is_empty() => endpoint.trim_end_matches('/').to_string(),
            _ => regional_endpoint(lookup("AWS_REGION").as_deref()),
        };

        Ok(Self {
            refresh_interval,
            output_file,
            server_port: parsed(&lookup, "ECS_SD_SERVER_PORT", defaults.server_port)?,
            log_level,
            ecs_endpoint,
            request_timeout: seconds(&lookup, "ECS_SD_REQUEST_TIMEOUT", defaults.request_timeout)?,
            cache_ttl: seconds(&lookup, "ECS_SD_CACHE_TTL", defaults.cache_ttl)?,
            cache_sweep_interval,
        })
    }

    /// True when the endpoint is a public AWS host.
    ///
    /// Requests are sent unsigned, so such an endpoint rejects every call
    /// unless a signing proxy sits in front of it.
    pub fn uses_aws_endpoint(&self) -> bool {
        self.ecs_endpoint
            .split("://")
            .last()
            .and_then(|rest| rest.split(['/', ':']).next())
            .is_some_and(|host| host.ends_with(".amazonaws.com"))
    }

    /// Cache settings for the caching client.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl: Some(self.cache_ttl),
            sweep_interval: Some(self.cache_sweep_interval),
            ..default_cache_config()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60),
            output_file: Some(PathBuf::from("ecs_sd.json")),
            server_port: 9723,
            log_level: "warn".to_string(),
            ecs_endpoint: regional_endpoint(None),
            request_timeout: Duration::from_secs(30),
            cache_ttl: DEFAULT_TTL,
            cache_sweep_interval: SWEEP_INTERVAL,
        }
    }
}

fn regional_endpoint(region: Option<&str>) -> String {
    let region = region
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("us-east-1");
    format!("https://ecs.{region}.amazonaws.com")
}

fn parsed<T, F>(lookup: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| DiscoveryError::Config(format!("{name}={raw:?}: {e}"))),
        None => Ok(default),
    }
}

fn seconds<F>(lookup: &F, name: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parsed(lookup, name, default.as_secs()).map(Duration::from_secs)
}
