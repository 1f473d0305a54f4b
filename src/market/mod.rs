//! Instruments and everything that hangs off them: the registry, the
//! holdings store, the per-day price history and dividend distribution.

mod dividend;
mod error;
mod history;
mod holdings;
mod instrument;
mod registry;

pub use dividend::{DividendDistributor, DividendRecord};
pub use error::MarketError;
pub use history::{PriceHistory, PricePoint};
pub use holdings::HoldingsStore;
pub use instrument::{Instrument, InstrumentId};
pub use registry::InstrumentRegistry;
