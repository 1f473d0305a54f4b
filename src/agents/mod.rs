//! Autonomous trading agents.
//!
//! Two families generate synthetic order flow: simple virtual traders with
//! three fixed strategies, and rarity-tiered trading assistants owned by
//! real accounts. Both submit orders through [`Exchange::place_order`]
//! exactly like human callers — no agent touches the ledger or holdings
//! directly for a trade.
//!
//! [`Exchange::place_order`]: crate::orderbook::Exchange::place_order

mod assistant;
mod error;
pub mod indicators;
mod strategy;
mod tests;
mod tiers;
mod trader;

pub use assistant::{
    Assistant, AssistantDetails, AssistantId, AssistantManager, AssistantTrade, Rarity,
};
pub use error::AgentError;
pub use strategy::{TradeAction, TradeContext, TraderStrategy};
pub use trader::{TraderId, TraderStats, VirtualTrader, VirtualTraderManager};
