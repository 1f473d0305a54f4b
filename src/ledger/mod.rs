//! Integer-coin ledger: per-account balances with an immutable history.

mod accounts;
mod error;
mod tests;

pub use accounts::{AccountId, Ledger, LedgerEntry};
pub use error::LedgerError;
