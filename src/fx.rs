use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::{AppError, Context, Result};

/// Base currency every provider price is quoted in.
pub const USD: &str = "USD";

const RATES_ENDPOINT: &str = "https://open.er-api.com/v6/latest";

/// External currency-conversion utility: `(from, to, amount) -> amount`.
pub trait CurrencyConverter {
    fn convert(&self, from: &str, to: &str, amount: f64) -> Result<f64>;
}

/// Conversion backed by a snapshot of rates relative to one base currency.
#[derive(Debug, Clone)]
pub struct RateTable {
    base: String,
    rates: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(rename = "base_code")]
    base: String,
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn from_rates(base: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        Self {
            base: base.into(),
            rates,
        }
    }

    /// Fetch the current rates table for a base currency.
    pub fn fetch(client: &Client, base: &str) -> Result<Self> {
        let url = format!("{}/{}", RATES_ENDPOINT, base);
        let response = client
            .get(&url)
            .send()
            .with_context(|| format!("Rates request failed for base {}", base))?;

        if !response.status().is_success() {
            return Err(AppError::message(format!(
                "Rates request for base {} failed with status {}",
                base,
                response.status()
            )));
        }

        let body = response
            .text()
            .with_context(|| format!("Failed to read rates body for base {}", base))?;

        parse_rates(&body)
    }

    fn rate(&self, code: &str) -> Result<f64> {
        if code == self.base {
            return Ok(1.0);
        }
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| AppError::message(format!("No exchange rate for currency {}", code)))
    }
}

impl CurrencyConverter for RateTable {
    fn convert(&self, from: &str, to: &str, amount: f64) -> Result<f64> {
        if from == to {
            return Ok(amount);
        }
        Ok(amount / self.rate(from)? * self.rate(to)?)
    }
}

fn parse_rates(body: &str) -> Result<RateTable> {
    let parsed: RatesResponse =
        serde_json::from_str(body).context("Failed to parse rates JSON")?;

    if parsed.rates.is_empty() {
        return Err(AppError::message("Rates payload contained no rates"));
    }

    Ok(RateTable::from_rates(parsed.base, parsed.rates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur_table() -> RateTable {
        RateTable::from_rates(USD, HashMap::from([("EUR".to_string(), 0.9)]))
    }

    #[test]
    fn same_currency_is_identity() {
        let table = eur_table();
        assert_eq!(table.convert(USD, USD, 150.0).unwrap(), 150.0);
    }

    #[test]
    fn converts_usd_price_into_target_currency() {
        let table = eur_table();
        let converted = table.convert(USD, "EUR", 150.0).unwrap();
        assert!((converted - 135.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_currency_is_an_error() {
        let table = eur_table();
        let err = table.convert(USD, "XXX", 1.0).unwrap_err();
        assert!(
            err.to_string().contains("No exchange rate"),
            "unexpected error message: {err}"
        );
    }

    #[test]
    fn parses_rates_payload() {
        let sample = r#"{
            "base_code": "USD",
            "rates": {"USD": 1.0, "EUR": 0.9, "GBP": 0.78}
        }"#;

        let table = parse_rates(sample).unwrap();
        let converted = table.convert(USD, "GBP", 100.0).unwrap();
        assert!((converted - 78.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_rates_payload() {
        let sample = r#"{"base_code": "USD", "rates": {}}"#;
        assert!(parse_rates(sample).is_err());
    }
}
