//! Client configuration loaded from the environment.

use std::env;

/// Base URL used when `MULTIBANK_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const BASE_URL_ENV: &str = "MULTIBANK_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read `MULTIBANK_API_URL`, falling back to `DEFAULT_BASE_URL` when it
    /// is unset or blank.
    pub fn from_env() -> Self {
        let base_url = env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url.trim())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
