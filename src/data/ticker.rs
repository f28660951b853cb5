use log::{debug, error, warn};

use crate::error::{AppError, Result};
use crate::fetch::{ChartWindow, ProviderClient, QuoteSnapshot};
use crate::fx::{CurrencyConverter, USD};

use super::Status;

/// A one-day window with fewer points than this is considered truncated
/// (holiday, pre-open) and widened before giving up.
const MIN_INTRADAY_POINTS: usize = 100;

/// Instrument-specific retrieval of the prior session's close.
pub trait PrevClose {
    fn prev_close(
        &self,
        quote: &QuoteSnapshot,
        currency: &str,
        fx: &dyn CurrencyConverter,
    ) -> Result<f64>;
}

/// Fetch-and-derive state for a single symbol.
///
/// `name` and `prev_close` are written once by `initialize`; `update`
/// refreshes only the price, the derived change fields and the chart series.
#[derive(Debug)]
pub struct Ticker {
    pub currency: String,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub prev_close: f64,
    pub value_change: f64,
    pub pct_change: String,
    pub chart_prices: Vec<f64>,
    pub valid: bool,
    pub status: Status,
    quote: Option<QuoteSnapshot>,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            symbol: symbol.into(),
            name: String::new(),
            price: 0.0,
            prev_close: 0.0,
            value_change: 0.0,
            pct_change: String::new(),
            chart_prices: Vec::new(),
            valid: true,
            status: Status::Success,
            quote: None,
        }
    }

    /// Fetch the full initial data set: name, previous close, price, derived
    /// change fields and the chart series.
    pub fn initialize(
        &mut self,
        provider: &ProviderClient,
        fx: &dyn CurrencyConverter,
        policy: &dyn PrevClose,
    ) -> Status {
        debug!("Fetching initial data for {}", self.symbol);
        self.status = match self.try_initialize(provider, fx, policy) {
            Ok(()) => Status::Success,
            Err(err) if err.is_network() => {
                warn!("Network error while initializing {}: {}", self.symbol, err);
                Status::NetworkError
            }
            Err(err) => {
                error!("No data available for {}: {}", self.symbol, err);
                self.valid = false;
                Status::Fail
            }
        };
        self.status
    }

    fn try_initialize(
        &mut self,
        provider: &ProviderClient,
        fx: &dyn CurrencyConverter,
        policy: &dyn PrevClose,
    ) -> Result<()> {
        let quote = provider.quote(&self.symbol)?;
        self.name = quote
            .short_name
            .clone()
            .ok_or_else(|| AppError::message(format!("No short name for {}", self.symbol)))?;
        self.prev_close = policy.prev_close(&quote, &self.currency, fx)?;
        self.apply_quote(&quote, fx)?;
        self.chart_prices = self.fetch_chart_series(provider)?;
        self.quote = Some(quote);
        Ok(())
    }

    /// Refresh only the data that moves between updates; `name` and
    /// `prev_close` stay untouched.
    pub fn update(&mut self, provider: &ProviderClient, fx: &dyn CurrencyConverter) -> Status {
        debug!("Fetching new data for {}", self.symbol);
        self.status = match self.try_update(provider, fx) {
            Ok(()) => Status::Success,
            Err(err) if err.is_network() => {
                warn!("Network error while updating {}: {}", self.symbol, err);
                Status::NetworkError
            }
            Err(err) => {
                // The symbol survived initialize; a data error here is
                // reported without invalidating the instance.
                error!("Update failed for {}: {}", self.symbol, err);
                Status::Fail
            }
        };
        self.status
    }

    fn try_update(&mut self, provider: &ProviderClient, fx: &dyn CurrencyConverter) -> Result<()> {
        let quote = provider.quote(&self.symbol)?;
        self.apply_quote(&quote, fx)?;
        self.chart_prices = self.fetch_chart_series(provider)?;
        self.quote = Some(quote);
        Ok(())
    }

    /// Convert a raw USD price into the display currency and round it for
    /// the matrix: three decimals below 1.0, two otherwise.
    pub fn display_price(&self, raw: f64, fx: &dyn CurrencyConverter) -> Result<f64> {
        let price = if self.currency != USD {
            fx.convert(USD, &self.currency, raw)?
        } else {
            raw
        };
        Ok(if price < 1.0 {
            round_to(price, 3)
        } else {
            round_to(price, 2)
        })
    }

    /// Provider metadata retained from the most recent fetch.
    pub fn last_quote(&self) -> Option<&QuoteSnapshot> {
        self.quote.as_ref()
    }

    fn apply_quote(&mut self, quote: &QuoteSnapshot, fx: &dyn CurrencyConverter) -> Result<()> {
        let raw_price = quote
            .regular_market_price
            .ok_or_else(|| AppError::message(format!("No market price for {}", self.symbol)))?;
        self.price = self.display_price(raw_price, fx)?;
        self.value_change = round_to(self.price - self.prev_close, 2);
        self.pct_change = format!("{:.2}%", 100.0 * self.value_change / self.prev_close.abs());
        Ok(())
    }

    fn fetch_chart_series(&mut self, provider: &ProviderClient) -> Result<Vec<f64>> {
        let symbol = self.symbol.clone();
        self.chart_series(|window| provider.chart_prices(&symbol, window))
    }

    /// Intraday series with the widened-window fallback: fewer than 100
    /// one-day points trigger a three-day request; an empty fallback marks
    /// the ticker invalid and yields the placeholder series.
    fn chart_series<F>(&mut self, mut fetch: F) -> Result<Vec<f64>>
    where
        F: FnMut(ChartWindow) -> Result<Vec<f64>>,
    {
        let prices = fetch(ChartWindow::INTRADAY)?;
        if prices.len() >= MIN_INTRADAY_POINTS {
            return Ok(prices);
        }

        let prices = fetch(ChartWindow::THREE_DAY)?;
        if prices.is_empty() {
            self.valid = false;
            return Ok(vec![0.0]);
        }
        Ok(prices)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::fx::RateTable;

    use super::*;

    fn usd_table() -> RateTable {
        RateTable::from_rates(USD, HashMap::from([("EUR".to_string(), 0.9)]))
    }

    fn snapshot(price: Option<f64>) -> QuoteSnapshot {
        QuoteSnapshot {
            symbol: "AAPL".to_string(),
            short_name: Some("Apple Inc.".to_string()),
            regular_market_price: price,
            regular_market_previous_close: Some(148.0),
            logo_url: None,
        }
    }

    #[test]
    fn rounds_sub_dollar_prices_to_three_decimals() {
        let ticker = Ticker::new("SIRI", USD);
        let fx = usd_table();

        assert_eq!(ticker.display_price(0.1234, &fx).unwrap(), 0.123);
        assert_eq!(ticker.display_price(0.9996, &fx).unwrap(), 1.0);
    }

    #[test]
    fn rounds_dollar_prices_to_two_decimals() {
        let ticker = Ticker::new("AAPL", USD);
        let fx = usd_table();

        assert_eq!(ticker.display_price(150.018, &fx).unwrap(), 150.02);
        assert_eq!(ticker.display_price(1.0, &fx).unwrap(), 1.0);
    }

    #[test]
    fn converts_before_rounding() {
        let ticker = Ticker::new("AAPL", "EUR");
        let fx = usd_table();

        // 150 USD at 0.90 lands at 135.00, two decimals since >= 1.0.
        assert_eq!(ticker.display_price(150.0, &fx).unwrap(), 135.0);
    }

    #[test]
    fn derives_change_fields_from_quote() {
        let mut ticker = Ticker::new("AAPL", USD);
        ticker.prev_close = 148.0;
        let fx = usd_table();

        ticker.apply_quote(&snapshot(Some(150.0)), &fx).unwrap();

        assert_eq!(ticker.price, 150.0);
        assert_eq!(ticker.value_change, 2.0);
        assert_eq!(ticker.pct_change, "1.35%");
    }

    #[test]
    fn percent_change_uses_absolute_previous_close() {
        let mut ticker = Ticker::new("WTI", USD);
        ticker.prev_close = -40.0;
        let fx = usd_table();

        ticker.apply_quote(&snapshot(Some(-38.0)), &fx).unwrap();

        assert_eq!(ticker.value_change, 2.0);
        assert_eq!(ticker.pct_change, "5.00%");
    }

    #[test]
    fn quote_refresh_leaves_name_and_prev_close_alone() {
        let mut ticker = Ticker::new("AAPL", USD);
        ticker.name = "Apple Inc.".to_string();
        ticker.prev_close = 148.0;
        let fx = usd_table();

        ticker.apply_quote(&snapshot(Some(151.5)), &fx).unwrap();

        assert_eq!(ticker.name, "Apple Inc.");
        assert_eq!(ticker.prev_close, 148.0);
        assert_eq!(ticker.price, 151.5);
    }

    #[test]
    fn missing_market_price_is_a_data_error() {
        let mut ticker = Ticker::new("AAPL", USD);
        let fx = usd_table();

        let err = ticker.apply_quote(&snapshot(None), &fx).unwrap_err();
        assert!(!err.is_network());
    }

    #[test]
    fn full_intraday_window_is_kept() {
        let mut ticker = Ticker::new("AAPL", USD);
        let series: Vec<f64> = (0..120).map(|i| 100.0 + i as f64).collect();
        let expected = series.clone();

        let prices = ticker
            .chart_series(|window| {
                assert_eq!(window, ChartWindow::INTRADAY);
                Ok(series.clone())
            })
            .unwrap();

        assert_eq!(prices, expected);
        assert!(ticker.valid);
    }

    #[test]
    fn short_intraday_window_widens_to_three_days() {
        let mut ticker = Ticker::new("AAPL", USD);

        let prices = ticker
            .chart_series(|window| match window {
                ChartWindow::INTRADAY => Ok(vec![1.0, 2.0]),
                _ => Ok(vec![3.0; 40]),
            })
            .unwrap();

        assert_eq!(prices.len(), 40);
        assert!(ticker.valid);
    }

    #[test]
    fn empty_fallback_marks_invalid_with_placeholder() {
        let mut ticker = Ticker::new("AAPL", USD);

        let prices = ticker.chart_series(|_| Ok(Vec::new())).unwrap();

        assert_eq!(prices, vec![0.0]);
        assert!(!ticker.valid);
    }

    #[test]
    fn chart_fetch_errors_propagate() {
        let mut ticker = Ticker::new("AAPL", USD);

        let result = ticker.chart_series(|_| Err(AppError::message("boom")));

        assert!(result.is_err());
        assert!(ticker.valid);
    }
}
