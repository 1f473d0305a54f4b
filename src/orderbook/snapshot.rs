//! Depth snapshots for market data.

use serde::{Deserialize, Serialize};

/// Aggregate of the active orders resting at one price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: f64,
    /// Total unfilled shares at this price
    pub shares: u64,
    /// Number of resting orders at this price
    pub orders: usize,
}

/// A snapshot of an instrument's order book at a specific point in time.
/// Bids are ordered best (highest) first, asks best (lowest) first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub ticker: String,
    /// Milliseconds since UNIX epoch when the snapshot was taken
    pub timestamp: u64,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

impl DepthSnapshot {
    /// Best bid price and shares, if any.
    pub fn best_bid(&self) -> Option<(f64, u64)> {
        self.bids.first().map(|level| (level.price, level.shares))
    }

    /// Best ask price and shares, if any.
    pub fn best_ask(&self) -> Option<(f64, u64)> {
        self.asks.first().map(|level| (level.price, level.shares))
    }

    /// Midpoint of the best bid and ask.
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }

    /// Total unfilled shares on the bid side.
    pub fn total_bid_shares(&self) -> u64 {
        self.bids.iter().map(|level| level.shares).sum()
    }

    /// Total unfilled shares on the ask side.
    pub fn total_ask_shares(&self) -> u64 {
        self.asks.iter().map(|level| level.shares).sum()
    }

    /// Serialize for the UI layer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
