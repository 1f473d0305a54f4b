//! The tradable instrument record.

use crate::ledger::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an instrument, allocated sequentially by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentId(pub u64);

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tradable instrument.
///
/// `total_shares` is fixed at issuance; shares only ever move between
/// holdings. `price` carries the last trade (or walk) price, `last_price`
/// the one before it, which is what the movers ranking compares against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    /// Unique short code, uppercase ASCII
    pub ticker: String,
    pub name: String,
    pub issuer: AccountId,
    pub total_shares: u64,
    /// Shares currently held outside the issuer (the float)
    pub available_shares: u64,
    pub price: f64,
    pub initial_price: f64,
    pub last_price: f64,
    /// Milliseconds since UNIX epoch of the last price application
    pub last_update: u64,
    pub description: String,
    pub created_at: u64,
}

impl Instrument {
    /// Relative move of the current price against the previous one.
    /// `None` until the instrument has traded or walked at least once.
    pub fn change_ratio(&self) -> Option<f64> {
        if self.last_price > 0.0 {
            Some(self.price / self.last_price - 1.0)
        } else {
            None
        }
    }

    /// Relative move against the issuance price.
    pub fn change_since_issue(&self) -> f64 {
        self.price / self.initial_price - 1.0
    }
}
