//! Market error types

use crate::ledger::{AccountId, LedgerError};
use std::fmt;

/// Errors raised by the registry, the dividend distributor and related flows
#[derive(Debug, Clone, PartialEq)]
pub enum MarketError {
    /// A ticker is already registered
    TickerTaken(String),

    /// No instrument is registered under the ticker
    UnknownInstrument(String),

    /// No instrument exists with the id
    UnknownInstrumentId(crate::market::InstrumentId),

    /// Issue price below the configured minimum
    PriceTooLow {
        /// Requested issue price
        price: f64,
        /// Configured minimum
        min: f64,
    },

    /// Issue share count below the configured minimum
    TooFewShares {
        /// Requested share count
        shares: u64,
        /// Configured minimum
        min: u64,
    },

    /// A price or amount that must be strictly positive was not
    InvalidAmount(f64),

    /// The caller is not the issuer of the instrument
    NotIssuer {
        /// Ticker of the instrument
        ticker: String,
        /// Account that attempted the operation
        account: AccountId,
    },

    /// Error from an underlying ledger operation
    Ledger(LedgerError),
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketError::TickerTaken(ticker) => {
                write!(f, "Ticker {} is already taken", ticker)
            }
            MarketError::UnknownInstrument(ticker) => {
                write!(f, "No instrument found for ticker {}", ticker)
            }
            MarketError::UnknownInstrumentId(id) => {
                write!(f, "No instrument found with id {}", id)
            }
            MarketError::PriceTooLow { price, min } => {
                write!(f, "Issue price {} is below the minimum of {}", price, min)
            }
            MarketError::TooFewShares { shares, min } => {
                write!(f, "Share count {} is below the minimum of {}", shares, min)
            }
            MarketError::InvalidAmount(amount) => {
                write!(f, "Amount must be positive, got {}", amount)
            }
            MarketError::NotIssuer { ticker, account } => {
                write!(f, "Account {} is not the issuer of {}", account, ticker)
            }
            MarketError::Ledger(err) => write!(f, "Ledger error: {}", err),
        }
    }
}

impl std::error::Error for MarketError {}

impl From<LedgerError> for MarketError {
    fn from(err: LedgerError) -> Self {
        MarketError::Ledger(err)
    }
}
