use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Runner configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// API key pool, rotated by the client as keys exhaust their quota.
    pub api_keys: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let raw = env::var("YOUTUBE_API_KEYS")
            .context("YOUTUBE_API_KEYS must be set (comma-separated)")?;
        let api_keys: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
        if api_keys.is_empty() {
            anyhow::bail!("YOUTUBE_API_KEYS contains no usable keys");
        }

        Ok(Self { api_keys })
    }
}
