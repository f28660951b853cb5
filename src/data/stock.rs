use image::RgbImage;
use log::debug;

use crate::error::{AppError, Result};
use crate::fetch::{fetch_logo, ProviderClient, QuoteSnapshot};
use crate::fx::{CurrencyConverter, USD};

use super::ticker::{PrevClose, Ticker};
use super::Status;

/// Equity previous-close policy: read the regular-market previous close and
/// convert it into the display currency.
pub struct StockPrevClose;

impl PrevClose for StockPrevClose {
    fn prev_close(
        &self,
        quote: &QuoteSnapshot,
        currency: &str,
        fx: &dyn CurrencyConverter,
    ) -> Result<f64> {
        let prev_close = quote
            .regular_market_previous_close
            .ok_or_else(|| AppError::message(format!("No previous close for {}", quote.symbol)))?;

        if currency != USD {
            fx.convert(USD, currency, prev_close)
        } else {
            Ok(prev_close)
        }
    }
}

/// A listed company: the common ticker lifecycle plus a logo thumbnail.
#[derive(Debug)]
pub struct Stock {
    pub ticker: Ticker,
    pub logo: Option<RgbImage>,
}

impl Stock {
    pub fn new(symbol: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            ticker: Ticker::new(symbol, currency),
            logo: None,
        }
    }

    /// Run the ticker lifecycle, then attach the company logo.
    pub fn initialize(&mut self, provider: &ProviderClient, fx: &dyn CurrencyConverter) -> Status {
        let status = self.ticker.initialize(provider, fx, &StockPrevClose);

        match self
            .ticker
            .last_quote()
            .and_then(|quote| quote.logo_url.clone())
        {
            Some(url) => self.logo = fetch_logo(provider, &self.ticker.symbol, &url),
            None => debug!("No logo URL for {}", self.ticker.symbol),
        }

        status
    }

    pub fn update(&mut self, provider: &ProviderClient, fx: &dyn CurrencyConverter) -> Status {
        self.ticker.update(provider, fx)
    }
}
