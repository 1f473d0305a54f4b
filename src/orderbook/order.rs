//! Orders and executed trades.

use crate::ledger::AccountId;
use crate::market::InstrumentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposing side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Unique order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        OrderId(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique trade identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeId(Uuid);

impl TradeId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        TradeId(Uuid::new_v4())
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an order. `Completed` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Active,
    Completed,
    Canceled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Active => write!(f, "active"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// A limit order resting in (or just submitted to) the book.
///
/// Buy orders carry the cash escrowed at placement in `escrow_remaining`;
/// sell orders carry the shares withdrawn from the holding in
/// `reserved_shares`. Settlement and cancellation drain these fields, so at
/// any moment escrow plus settled cash and reservation plus transferred
/// shares add up to what was taken at placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub account: AccountId,
    pub instrument: InstrumentId,
    pub side: Side,
    /// Remaining unfilled shares
    pub shares: u64,
    pub limit_price: f64,
    /// Milliseconds since UNIX epoch
    pub created_at: u64,
    /// Per-book tie-breaker for time priority within a price
    pub(crate) seq: u64,
    pub status: OrderStatus,
    pub(crate) escrow_remaining: i64,
    pub(crate) reserved_shares: u64,
}

impl Order {
    /// Whether the order can still participate in matching.
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Cash still escrowed for this order (buy orders only).
    pub fn escrow_remaining(&self) -> i64 {
        self.escrow_remaining
    }

    /// Shares still reserved for this order (sell orders only).
    pub fn reserved_shares(&self) -> u64 {
        self.reserved_shares
    }
}

/// Immutable record of one executed trade. Also what drives instrument
/// price updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub instrument: InstrumentId,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub shares: u64,
    pub price_per_share: f64,
    /// Coins credited to the seller
    pub total_amount: i64,
    /// Milliseconds since UNIX epoch
    pub timestamp: u64,
}
