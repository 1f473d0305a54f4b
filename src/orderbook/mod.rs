//! The order book and matching engine: escrowed limit orders, midpoint
//! matching, and settlement against the ledger and holdings stores.

mod book;
mod error;
mod exchange;
mod matching;
mod order;
mod snapshot;
mod tests;

pub use error::OrderBookError;
pub use exchange::{Exchange, Placement};
pub use order::{Order, OrderId, OrderStatus, Side, Trade, TradeId};
pub use snapshot::{DepthLevel, DepthSnapshot};
