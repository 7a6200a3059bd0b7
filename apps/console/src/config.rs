use std::time::Duration;

use anyhow::{Context, Result};

use crate::polling::DEFAULT_POLL_INTERVAL;

const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Console configuration loaded from environment variables.
/// Everything has a local-development default; nothing is required.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let poll_interval = match std::env::var("SMARTHIRE_POLL_INTERVAL_MS") {
            Ok(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .context("SMARTHIRE_POLL_INTERVAL_MS must be a number of milliseconds")?,
            ),
            Err(_) => DEFAULT_POLL_INTERVAL,
        };

        Ok(Config {
            api_base_url: std::env::var("SMARTHIRE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            poll_interval,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
