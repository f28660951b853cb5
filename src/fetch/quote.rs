use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::error::{AppError, Context};

use super::{FetchResult, BROWSER_USER_AGENT, REQUEST_TIMEOUT};

const QUOTE_ENDPOINT: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

/// Blocking HTTP client for the market-data provider.
pub struct ProviderClient {
    client: Client,
    quote_endpoint: String,
}

/// Quote metadata for a single symbol. Every consumed field is optional so a
/// thin payload surfaces as missing data downstream instead of a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: String,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketPreviousClose")]
    pub regular_market_previous_close: Option<f64>,
    #[serde(rename = "logoUrl")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResult,
}

#[derive(Debug, Deserialize)]
struct QuoteResult {
    result: Vec<QuoteSnapshot>,
    error: Option<serde_json::Value>,
}

impl ProviderClient {
    pub fn new() -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to construct provider HTTP client")?;

        Ok(Self {
            client,
            quote_endpoint: QUOTE_ENDPOINT.to_string(),
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Fetch the current quote snapshot for a symbol.
    pub fn quote(&self, symbol: &str) -> FetchResult<QuoteSnapshot> {
        let url = format!("{}?symbols={}", self.quote_endpoint, symbol);

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()?;

        if !response.status().is_success() {
            return Err(AppError::message(format!(
                "Quote request for {} failed with status {}",
                symbol,
                response.status()
            )));
        }

        let body = response.text()?;
        parse_quote(&body, symbol)
    }
}

pub fn parse_quote(body: &str, symbol: &str) -> FetchResult<QuoteSnapshot> {
    let parsed: QuoteResponse = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse quote JSON for {}", symbol))?;

    if let Some(error) = parsed.quote_response.error {
        return Err(AppError::message(format!(
            "Provider rejected quote request for {}: {}",
            symbol, error
        )));
    }

    parsed
        .quote_response
        .result
        .into_iter()
        .find(|quote| quote.symbol.eq_ignore_ascii_case(symbol))
        .ok_or_else(|| AppError::message(format!("No quote data returned for {}", symbol)))
}
