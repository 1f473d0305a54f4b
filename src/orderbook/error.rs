//! Order book error types

use super::order::OrderId;
use crate::ledger::LedgerError;
use crate::market::MarketError;
use std::fmt;

/// Errors that can occur while placing, matching or canceling orders
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBookError {
    /// No instrument is registered under the ticker
    UnknownInstrument(String),

    /// Order quantity must be positive
    InvalidQuantity(u64),

    /// Limit price must be positive
    InvalidPrice(f64),

    /// Limit price falls outside the daily band
    PriceOutsideBand {
        /// Rejected limit price
        limit_price: f64,
        /// Lower band bound
        low: f64,
        /// Upper band bound
        high: f64,
    },

    /// Buyer cannot escrow the order's full cost
    InsufficientFunds {
        /// Coins the order requires
        required: i64,
        /// Coins available
        available: i64,
    },

    /// Seller does not hold enough shares
    InsufficientShares {
        /// Shares the order requires
        requested: u64,
        /// Shares held
        held: u64,
    },

    /// Order not found in any book
    UnknownOrder(OrderId),

    /// The caller does not own the order
    NotOrderOwner(OrderId),

    /// The order is already completed or canceled
    OrderNotActive(OrderId),

    /// Error from an underlying market operation
    Market(MarketError),

    /// Error from an underlying ledger operation
    Ledger(LedgerError),
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::UnknownInstrument(ticker) => {
                write!(f, "No instrument found for ticker {}", ticker)
            }
            OrderBookError::InvalidQuantity(shares) => {
                write!(f, "Order quantity must be positive, got {}", shares)
            }
            OrderBookError::InvalidPrice(price) => {
                write!(f, "Limit price must be positive, got {}", price)
            }
            OrderBookError::PriceOutsideBand {
                limit_price,
                low,
                high,
            } => {
                write!(
                    f,
                    "Limit price {:.2} is outside the daily band {:.2} ~ {:.2}",
                    limit_price, low, high
                )
            }
            OrderBookError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: order requires {}, only {} available",
                    required, available
                )
            }
            OrderBookError::InsufficientShares { requested, held } => {
                write!(
                    f,
                    "Insufficient shares: order requires {}, only {} held",
                    requested, held
                )
            }
            OrderBookError::UnknownOrder(id) => write!(f, "Order not found: {}", id),
            OrderBookError::NotOrderOwner(id) => {
                write!(f, "Order {} belongs to another account", id)
            }
            OrderBookError::OrderNotActive(id) => {
                write!(f, "Order {} is no longer active", id)
            }
            OrderBookError::Market(err) => write!(f, "Market error: {}", err),
            OrderBookError::Ledger(err) => write!(f, "Ledger error: {}", err),
        }
    }
}

impl std::error::Error for OrderBookError {}

impl From<MarketError> for OrderBookError {
    fn from(err: MarketError) -> Self {
        OrderBookError::Market(err)
    }
}

impl From<LedgerError> for OrderBookError {
    fn from(err: LedgerError) -> Self {
        OrderBookError::Ledger(err)
    }
}
