use chrono::{Duration as ChronoDuration, Utc};
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::error::{AppError, Context};

use super::quote::ProviderClient;
use super::{FetchResult, BROWSER_USER_AGENT};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// History request span: how many days back to ask for, at which sampling
/// interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartWindow {
    pub days: i64,
    pub interval: &'static str,
}

impl ChartWindow {
    /// One trading day at one-minute granularity.
    pub const INTRADAY: ChartWindow = ChartWindow {
        days: 1,
        interval: "1m",
    };

    /// Three-day fallback window at the same granularity.
    pub const THREE_DAY: ChartWindow = ChartWindow {
        days: 3,
        interval: "1m",
    };
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ProviderClient {
    /// Fetch the close-price series for a symbol over the given window.
    pub fn chart_prices(&self, symbol: &str, window: ChartWindow) -> FetchResult<Vec<f64>> {
        let url = chart_url(symbol, window);

        let response = self
            .http()
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()?;

        if !response.status().is_success() {
            return Err(AppError::message(format!(
                "History request for {} failed with status {}",
                symbol,
                response.status()
            )));
        }

        let body = response.text()?;
        parse_chart_prices(&body, symbol)
    }
}

fn chart_url(symbol: &str, window: ChartWindow) -> String {
    let end = Utc::now();
    let start = end - ChronoDuration::days(window.days);
    format!(
        "{}/{}?period1={}&period2={}&interval={}",
        CHART_ENDPOINT,
        symbol,
        start.timestamp(),
        end.timestamp(),
        window.interval
    )
}

/// Extract the close series from a chart payload. Null slots mark minutes
/// without a trade and are dropped.
pub fn parse_chart_prices(body: &str, symbol: &str) -> FetchResult<Vec<f64>> {
    let parsed: ChartResponse = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse history JSON for {}", symbol))?;

    if let Some(error) = parsed.chart.error {
        return Err(AppError::message(format!(
            "Provider rejected history request for {}: {} ({})",
            symbol, error.description, error.code
        )));
    }

    let data = parsed
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| AppError::message(format!("No history data returned for {}", symbol)))?;

    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    Ok(closes.into_iter().flatten().collect())
}
