//! Account balances and their transaction history.
//!
//! The ledger is the single source of truth for money. Every mutation goes
//! through [`Ledger::apply_delta`], which enforces the non-negative balance
//! invariant and appends a history record inside the same critical section,
//! so a reader can never observe a balance without its matching entry.

use super::error::LedgerError;
use crate::utils::current_time_millis;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Identifier of a ledger account. Human callers map their chat-platform
/// user ids onto this; agent managers allocate their own ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable history record, appended on every balance change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Signed change applied to the balance
    pub delta: i64,
    /// Balance immediately after the change
    pub balance_after: i64,
    /// Human-readable reason for the change
    pub description: String,
    /// Milliseconds since UNIX epoch
    pub timestamp: u64,
}

#[derive(Debug, Default)]
struct Account {
    balance: i64,
    last_updated: u64,
    history: Vec<LedgerEntry>,
}

/// Per-account coin balances with atomic credit/debit.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: DashMap<AccountId, Account>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Current balance of `account`, creating a zero-balance record on first
    /// access. Never fails.
    pub fn balance(&self, account: AccountId) -> i64 {
        self.accounts.entry(account).or_default().balance
    }

    /// Atomically add `delta` (possibly negative) to the account's balance
    /// and append a history record describing the change.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] and leaves the account
    /// untouched when the result would be negative. This is the single
    /// enforcement point for "cannot spend money you don't have".
    pub fn apply_delta(
        &self,
        account: AccountId,
        delta: i64,
        description: impl Into<String>,
    ) -> Result<i64, LedgerError> {
        let mut entry = self.accounts.entry(account).or_default();

        let new_balance = entry.balance + delta;
        if new_balance < 0 {
            return Err(LedgerError::InsufficientFunds {
                account,
                delta,
                balance: entry.balance,
            });
        }

        let now = current_time_millis();
        entry.balance = new_balance;
        entry.last_updated = now;
        entry.history.push(LedgerEntry {
            delta,
            balance_after: new_balance,
            description: description.into(),
            timestamp: now,
        });

        trace!("Ledger: account {} {:+} -> {}", account, delta, new_balance);
        Ok(new_balance)
    }

    /// Most-recent-first history of an account, at most `limit` entries.
    pub fn history(&self, account: AccountId, limit: usize) -> Vec<LedgerEntry> {
        match self.accounts.get(&account) {
            Some(entry) => entry.history.iter().rev().take(limit).cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Accounts ranked by balance, descending, at most `limit` entries.
    /// Zero-balance accounts are skipped, matching the leaderboard the
    /// command layer renders.
    pub fn top_balances(&self, limit: usize) -> Vec<(AccountId, i64)> {
        let mut rows: Vec<(AccountId, i64)> = self
            .accounts
            .iter()
            .filter(|item| item.value().balance > 0)
            .map(|item| (*item.key(), item.value().balance))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.truncate(limit);
        rows
    }

    /// Sum of every account balance. Used by conservation checks and stats.
    pub fn total_coins(&self) -> i64 {
        self.accounts.iter().map(|item| item.value().balance).sum()
    }
}
