//! Ledger error types

use super::accounts::AccountId;
use std::fmt;

/// Errors that can occur while mutating the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// The balance change would leave the account below zero
    InsufficientFunds {
        /// Account that attempted the change
        account: AccountId,
        /// Requested change (negative)
        delta: i64,
        /// Balance before the change
        balance: i64,
    },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InsufficientFunds {
                account,
                delta,
                balance,
            } => {
                write!(
                    f,
                    "Insufficient funds for account {}: balance {} cannot absorb {}",
                    account, balance, delta
                )
            }
        }
    }
}

impl std::error::Error for LedgerError {}
