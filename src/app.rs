use std::collections::HashMap;
use std::path::PathBuf;
use std::thread;

use log::info;

use crate::config::Config;
use crate::data::{Status, Stock};
use crate::error::{AppError, Result};
use crate::fetch::ProviderClient;
use crate::fx::{RateTable, USD};
use crate::layout::Layout;

/// Startup options resolved by the binary's flag parsing.
#[derive(Debug, Clone)]
pub struct Options {
    pub width: u32,
    pub height: u32,
    pub config_path: PathBuf,
    pub layout_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
            config_path: PathBuf::from("assets/config.json"),
            layout_dir: PathBuf::from("assets/layouts"),
        }
    }
}

/// Entry point used by `main`: load configuration, bring every ticker up,
/// then refresh on the configured cadence until killed.
pub fn run(options: &Options) -> Result<()> {
    let config = Config::load(&options.config_path)?;
    let layout = Layout::load(&options.layout_dir, options.width, options.height)?;

    info!(
        "{} v{} ({}x{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        layout.width,
        layout.height
    );

    let provider = ProviderClient::new()?;
    let rates = if config.currency == USD {
        RateTable::from_rates(USD, HashMap::new())
    } else {
        RateTable::fetch(provider.http(), USD)?
    };

    let mut stocks: Vec<Stock> = config
        .tickers
        .iter()
        .map(|symbol| Stock::new(symbol.clone(), config.currency.clone()))
        .collect();

    for stock in &mut stocks {
        // Failures are logged inside the lifecycle; successes get a line.
        if stock.initialize(&provider, &rates) == Status::Success {
            info!("{}", display_line(stock));
        }
    }

    // Symbols the provider rejected outright would fail every later update.
    stocks.retain(|stock| stock.ticker.valid);
    if stocks.is_empty() {
        return Err(AppError::message("no valid tickers after initialization"));
    }

    loop {
        thread::sleep(config.update_rate);
        for stock in &mut stocks {
            if stock.update(&provider, &rates) == Status::Success {
                info!("{}", display_line(stock));
            }
        }
    }
}

fn display_line(stock: &Stock) -> String {
    let ticker = &stock.ticker;
    format!(
        "{} {} {} {:+.2} ({})",
        ticker.symbol, ticker.name, ticker.price, ticker.value_change, ticker.pct_change
    )
}
