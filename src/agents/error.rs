//! Agent error types

use super::assistant::{AssistantId, Rarity};
use super::trader::TraderId;
use crate::ledger::LedgerError;
use crate::orderbook::OrderBookError;
use std::fmt;

/// Errors raised by agent management and decision cycles
#[derive(Debug, Clone, PartialEq)]
pub enum AgentError {
    /// No virtual trader with the id
    UnknownTrader(TraderId),

    /// No assistant with the id
    UnknownAssistant(AssistantId),

    /// The caller does not own the assistant
    NotAssistantOwner(AssistantId),

    /// The watch list exceeds what the rarity allows
    TooManyWatched {
        /// Rarity of the assistant
        rarity: Rarity,
        /// Maximum instruments this rarity may monitor
        max: usize,
        /// Instruments requested
        requested: usize,
    },

    /// A stored setting could not be parsed
    InvalidSetting {
        /// Setting key
        key: String,
        /// Stored value
        value: String,
    },

    /// No strategy is registered under the name
    UnknownStrategy(String),

    /// Error from a submitted order
    OrderBook(OrderBookError),

    /// Error from an underlying ledger operation
    Ledger(LedgerError),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::UnknownTrader(id) => write!(f, "No virtual trader with id {}", id),
            AgentError::UnknownAssistant(id) => write!(f, "No assistant with id {}", id),
            AgentError::NotAssistantOwner(id) => {
                write!(f, "Assistant {} belongs to another account", id)
            }
            AgentError::TooManyWatched {
                rarity,
                max,
                requested,
            } => {
                write!(
                    f,
                    "A {} assistant can monitor at most {} instruments, got {}",
                    rarity, max, requested
                )
            }
            AgentError::InvalidSetting { key, value } => {
                write!(f, "Setting {} has an invalid value: {}", key, value)
            }
            AgentError::UnknownStrategy(name) => write!(f, "Unknown strategy: {}", name),
            AgentError::OrderBook(err) => write!(f, "Order error: {}", err),
            AgentError::Ledger(err) => write!(f, "Ledger error: {}", err),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<OrderBookError> for AgentError {
    fn from(err: OrderBookError) -> Self {
        AgentError::OrderBook(err)
    }
}

impl From<LedgerError> for AgentError {
    fn from(err: LedgerError) -> Self {
        AgentError::Ledger(err)
    }
}
