//! Application configuration. Backend URL, timeouts, dispatcher sizing.

use serde::Deserialize;

/// Default backend base URL (local ApiLogicServer-style dev server).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5656/api";

/// Default capacity for the request dispatcher's job queue. Bounded channel
/// provides backpressure: when full, submitters block on send().await until
/// the worker drains.
pub const DEFAULT_REQUEST_QUEUE_SIZE: usize = 64;

/// Default cap on concurrently in-flight dispatched requests.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Backend base URL. Read from INTAKE_API_BASE_URL.
    pub api_base_url: Option<String>,

    /// Fixed per-request timeout in seconds. Read from INTAKE_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Dispatcher job queue capacity (backpressure). Read from INTAKE_REQUEST_QUEUE_SIZE.
    #[serde(default)]
    pub request_queue_size: Option<usize>,

    /// Max concurrently in-flight dispatched requests. Read from INTAKE_MAX_IN_FLIGHT.
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("INTAKE"));
        if let Ok(path) = std::env::var("INTAKE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // INTAKE_REQUEST_TIMEOUT_SECS is also read directly so .env values win
        // over file sources without worrying about source ordering.
        if let Ok(s) = std::env::var("INTAKE_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = s.parse::<u64>() {
                cfg.request_timeout_secs = Some(secs);
            }
        }
        if let Ok(s) = std::env::var("INTAKE_REQUEST_QUEUE_SIZE") {
            if let Ok(n) = s.parse::<usize>() {
                cfg.request_queue_size = Some(n);
            }
        }
        if let Ok(s) = std::env::var("INTAKE_MAX_IN_FLIGHT") {
            if let Ok(n) = s.parse::<usize>() {
                cfg.max_in_flight = Some(n);
            }
        }
        Ok(cfg)
    }

    /// Returns the backend base URL. Defaults to the local dev server.
    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Returns the per-request timeout in seconds. Defaults to 30 if unset or invalid.
    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(30)
    }

    /// Returns the dispatcher queue capacity. Defaults to DEFAULT_REQUEST_QUEUE_SIZE.
    pub fn request_queue_size_or_default(&self) -> usize {
        self.request_queue_size.unwrap_or(DEFAULT_REQUEST_QUEUE_SIZE)
    }

    /// Returns the in-flight request cap. Defaults to DEFAULT_MAX_IN_FLIGHT.
    pub fn max_in_flight_or_default(&self) -> usize {
        self.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT)
    }
}

/// Tracing filter directive for the process. `LOG_LEVEL` takes precedence
/// (`NONE|ERROR|WARN|INFO|DEBUG`, case-insensitive), then `RUST_LOG`,
/// then "info".
pub fn log_filter_from_env() -> String {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        if let Some(directive) = log_level_directive(&level) {
            return directive.to_string();
        }
    }
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

/// Maps a LOG_LEVEL value to an EnvFilter directive. Unknown values return
/// None so the caller can fall through to RUST_LOG.
pub fn log_level_directive(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_uppercase().as_str() {
        "NONE" => Some("off"),
        "ERROR" => Some("error"),
        "WARN" => Some("warn"),
        "INFO" => Some("info"),
        "DEBUG" => Some("debug"),
        _ => None,
    }
}
