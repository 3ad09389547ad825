use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Per-request timeout applied to outbound Google API calls.
    pub http_timeout_secs: u64,
    /// Row limit for the Search Console query-term report.
    pub term_row_limit: u32,
    /// Row limit for the Search Console page report.
    pub page_row_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: {
                let raw = std::env::var("SEARCHLENS_PORT").unwrap_or_else(|_| "3000".to_string());
                raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "SEARCHLENS_PORT",
                    value: raw,
                })?
            },
            cors_origins: std::env::var("SEARCHLENS_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            http_timeout_secs: std::env::var("SEARCHLENS_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            term_row_limit: std::env::var("SEARCHLENS_TERM_ROW_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            page_row_limit: std::env::var("SEARCHLENS_PAGE_ROW_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
