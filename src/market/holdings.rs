//! Per-account, per-instrument share counts.
//!
//! Records exist only while the share count is positive: adjusting a holding
//! to zero deletes it, and a record is only created by a positive delta.
//! Sell-side sufficiency is NOT enforced here — the order book reserves
//! shares before an order is accepted; this store merely refuses to go
//! negative on a plain adjust.

use super::instrument::InstrumentId;
use crate::ledger::AccountId;
use dashmap::DashMap;
use tracing::trace;

/// Share counts keyed by (account, instrument).
#[derive(Debug, Default)]
pub struct HoldingsStore {
    holdings: DashMap<(AccountId, InstrumentId), u64>,
}

impl HoldingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            holdings: DashMap::new(),
        }
    }

    /// Shares `account` holds of `instrument`, zero if none.
    pub fn shares(&self, account: AccountId, instrument: InstrumentId) -> u64 {
        self.holdings
            .get(&(account, instrument))
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    /// Add or remove shares. Creates the record only for a positive delta,
    /// deletes it when the result reaches zero, and saturates rather than
    /// going negative (callers validate sufficiency beforehand).
    pub fn adjust(&self, account: AccountId, instrument: InstrumentId, delta: i64) {
        let key = (account, instrument);

        if delta >= 0 {
            let mut entry = self.holdings.entry(key).or_insert(0);
            *entry += delta as u64;
            let remaining = *entry;
            drop(entry);
            if remaining == 0 {
                // A zero-delta adjust on a fresh key must not leave a record.
                self.holdings.remove_if(&key, |_, shares| *shares == 0);
            }
            trace!("Holdings: {} {} {:+} -> {}", account, instrument, delta, remaining);
            return;
        }

        let mut removed = false;
        if let Some(mut entry) = self.holdings.get_mut(&key) {
            let current = *entry.value();
            let new_shares = current.saturating_sub((-delta) as u64);
            if new_shares == 0 {
                removed = true;
            } else {
                *entry.value_mut() = new_shares;
            }
            trace!("Holdings: {} {} {:+} -> {}", account, instrument, delta, new_shares);
        }
        if removed {
            self.holdings.remove(&key);
        }
    }

    /// Atomically remove `shares` from a holding, failing without mutation
    /// when the holding is smaller. Used by the order book to reserve
    /// shares at sell-order placement.
    pub fn try_withdraw(&self, account: AccountId, instrument: InstrumentId, shares: u64) -> bool {
        let key = (account, instrument);
        let mut removed = false;
        let mut withdrawn = false;

        if let Some(mut entry) = self.holdings.get_mut(&key) {
            let current = *entry.value();
            if current >= shares {
                let remaining = current - shares;
                if remaining == 0 {
                    removed = true;
                } else {
                    *entry.value_mut() = remaining;
                }
                withdrawn = true;
            }
        }
        if removed {
            self.holdings.remove(&key);
        }
        withdrawn
    }

    /// All holdings of one account as (instrument, shares) pairs.
    pub fn holdings_of(&self, account: AccountId) -> Vec<(InstrumentId, u64)> {
        let mut rows: Vec<(InstrumentId, u64)> = self
            .holdings
            .iter()
            .filter(|item| item.key().0 == account)
            .map(|item| (item.key().1, *item.value()))
            .collect();
        rows.sort_by_key(|(instrument, _)| *instrument);
        rows
    }

    /// All holders of one instrument as (account, shares) pairs, largest
    /// position first.
    pub fn holders_of(&self, instrument: InstrumentId) -> Vec<(AccountId, u64)> {
        let mut rows: Vec<(AccountId, u64)> = self
            .holdings
            .iter()
            .filter(|item| item.key().1 == instrument)
            .map(|item| (item.key().0, *item.value()))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows
    }

    /// Total shares of `instrument` across all holdings.
    pub fn outstanding(&self, instrument: InstrumentId) -> u64 {
        self.holdings
            .iter()
            .filter(|item| item.key().1 == instrument)
            .map(|item| *item.value())
            .sum()
    }
}
