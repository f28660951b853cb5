use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, Context, Result};

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_UPDATE_RATE_SECS: u64 = 600;

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub tickers: Vec<String>,
    pub currency: String,
    pub update_rate: Duration,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    tickers: Vec<String>,
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default = "default_update_rate_secs")]
    update_rate_secs: u64,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_update_rate_secs() -> u64 {
    DEFAULT_UPDATE_RATE_SECS
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config JSON at {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json).context("failed to parse config JSON")?;
        raw.into_config()
    }
}

impl RawConfig {
    fn into_config(self) -> Result<Config> {
        let mut issues = Vec::new();

        let tickers: Vec<String> = self
            .tickers
            .iter()
            .map(|symbol| symbol.trim().to_string())
            .filter(|symbol| !symbol.is_empty())
            .collect();

        if tickers.is_empty() {
            issues.push("tickers must list at least one symbol".to_string());
        }

        let currency = self.currency.trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            issues.push(format!(
                "currency must be a 3-letter code, found `{}`",
                self.currency
            ));
        }

        if self.update_rate_secs == 0 {
            issues.push("update_rate_secs must be at least 1".to_string());
        }

        if !issues.is_empty() {
            return Err(AppError::message(format!(
                "config invalid:\n  - {}",
                issues.join("\n  - ")
            )));
        }

        Ok(Config {
            tickers,
            currency,
            update_rate: Duration::from_secs(self.update_rate_secs),
        })
    }
}
