use std::time::Duration;

use crate::error::Result;

pub mod chart;
pub mod logo;
pub mod quote;

pub use chart::ChartWindow;
pub use logo::fetch_logo;
pub use quote::{ProviderClient, QuoteSnapshot};

/// Timeout applied to every provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The provider serves browsers; a bare client UA gets rejected.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub type FetchResult<T> = Result<T>;
