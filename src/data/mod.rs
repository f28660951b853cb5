mod stock;
mod ticker;

pub use stock::{Stock, StockPrevClose};
pub use ticker::{PrevClose, Ticker};

/// Outcome of one ticker lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// Provider has no usable data for the symbol; permanent for the instance.
    Fail,
    /// Transient transport failure; the instance stays valid.
    NetworkError,
}
