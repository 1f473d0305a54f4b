//! The instrument registry: issuance, price application, listings.

use super::error::MarketError;
use super::history::PriceHistory;
use super::holdings::HoldingsStore;
use super::instrument::{Instrument, InstrumentId};
use crate::config::MarketConfig;
use crate::ledger::{AccountId, Ledger};
use crate::utils::current_time_millis;
use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, trace};

/// Registry of all tradable instruments.
///
/// Issuance charges the fee through the ledger, seeds the issuer's holding
/// and records the day-0 price point, so the three stores are wired in at
/// construction rather than reached through globals.
pub struct InstrumentRegistry {
    ledger: Arc<Ledger>,
    holdings: Arc<HoldingsStore>,
    history: Arc<PriceHistory>,
    config: MarketConfig,
    instruments: DashMap<InstrumentId, Instrument>,
    tickers: DashMap<String, InstrumentId>,
    next_id: AtomicU64,
}

impl InstrumentRegistry {
    /// Create an empty registry on top of the given stores.
    pub fn new(
        ledger: Arc<Ledger>,
        holdings: Arc<HoldingsStore>,
        history: Arc<PriceHistory>,
        config: MarketConfig,
    ) -> Self {
        Self {
            ledger,
            holdings,
            history,
            config,
            instruments: DashMap::new(),
            tickers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Issue a new instrument.
    ///
    /// Charges the issuer a fee of `issue_fee_rate × initial_price ×
    /// total_shares`, credits the full share count to the issuer's holding
    /// and records the day-0 price point. Fails without any state change
    /// when the ticker is taken, the price or share count is below the
    /// configured minimum, or the issuer cannot afford the fee.
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        &self,
        issuer: AccountId,
        ticker: &str,
        name: &str,
        initial_price: f64,
        total_shares: u64,
        description: &str,
        today: NaiveDate,
    ) -> Result<InstrumentId, MarketError> {
        if initial_price < self.config.min_issue_price {
            return Err(MarketError::PriceTooLow {
                price: initial_price,
                min: self.config.min_issue_price,
            });
        }
        if total_shares < self.config.min_issue_shares {
            return Err(MarketError::TooFewShares {
                shares: total_shares,
                min: self.config.min_issue_shares,
            });
        }

        let ticker = ticker.trim().to_ascii_uppercase();

        // The vacant entry is held across the fee charge so two issuers
        // cannot race the same ticker.
        match self.tickers.entry(ticker.clone()) {
            Entry::Occupied(_) => Err(MarketError::TickerTaken(ticker)),
            Entry::Vacant(slot) => {
                let fee = (initial_price * total_shares as f64 * self.config.issue_fee_rate)
                    .round() as i64;
                self.ledger
                    .apply_delta(issuer, -fee, format!("Issue fee for {}", ticker))?;

                let id = InstrumentId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let now = current_time_millis();
                let instrument = Instrument {
                    id,
                    ticker: ticker.clone(),
                    name: name.to_string(),
                    issuer,
                    total_shares,
                    available_shares: 0,
                    price: initial_price,
                    initial_price,
                    last_price: initial_price,
                    last_update: now,
                    description: description.to_string(),
                    created_at: now,
                };
                self.instruments.insert(id, instrument);
                slot.insert(id);

                // All shares start with the issuer; none are floating.
                self.holdings.adjust(issuer, id, total_shares as i64);
                self.history.record(id, initial_price, today);

                info!(
                    "Issued {} ({} shares at {}) for account {}, fee {}",
                    ticker, total_shares, initial_price, issuer, fee
                );
                Ok(id)
            }
        }
    }

    /// Snapshot of the instrument registered under `ticker`, if any.
    pub fn get_info(&self, ticker: &str) -> Option<Instrument> {
        let ticker = ticker.trim().to_ascii_uppercase();
        let id = *self.tickers.get(&ticker)?;
        self.get(id)
    }

    /// Snapshot of an instrument by id.
    pub fn get(&self, id: InstrumentId) -> Option<Instrument> {
        self.instruments.get(&id).map(|entry| entry.value().clone())
    }

    /// Id registered under `ticker`, if any.
    pub fn id_of(&self, ticker: &str) -> Option<InstrumentId> {
        let ticker = ticker.trim().to_ascii_uppercase();
        self.tickers.get(&ticker).map(|entry| *entry.value())
    }

    /// Page through all instruments ordered by ticker.
    pub fn list(&self, offset: usize, limit: usize) -> Vec<Instrument> {
        let mut rows: Vec<Instrument> = self
            .instruments
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        rows.into_iter().skip(offset).take(limit).collect()
    }

    /// Every instrument, unordered.
    pub fn all(&self) -> Vec<Instrument> {
        self.instruments
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Instruments ranked by the move of `price` against `last_price`,
    /// best performer first.
    pub fn top_movers(&self, limit: usize) -> Vec<Instrument> {
        let mut rows: Vec<(f64, Instrument)> = self
            .instruments
            .iter()
            .filter_map(|entry| {
                let instrument = entry.value();
                instrument
                    .change_ratio()
                    .map(|ratio| (ratio, instrument.clone()))
            })
            .collect();
        rows.sort_by(|a, b| b.0.total_cmp(&a.0));
        rows.into_iter()
            .take(limit)
            .map(|(_, instrument)| instrument)
            .collect()
    }

    /// Apply a new price: rotates `price` into `last_price` and upserts the
    /// day's history point. Used by the matching engine after every fill and
    /// by the periodic random walk.
    pub fn apply_price(
        &self,
        id: InstrumentId,
        new_price: f64,
        date: NaiveDate,
    ) -> Result<(), MarketError> {
        if new_price <= 0.0 {
            return Err(MarketError::InvalidAmount(new_price));
        }
        match self.instruments.get_mut(&id) {
            Some(mut entry) => {
                let instrument = entry.value_mut();
                instrument.last_price = instrument.price;
                instrument.price = new_price;
                instrument.last_update = current_time_millis();
                trace!(
                    "Price {}: {} -> {}",
                    instrument.ticker, instrument.last_price, new_price
                );
                drop(entry);
                self.history.record(id, new_price, date);
                Ok(())
            }
            None => Err(MarketError::UnknownInstrumentId(id)),
        }
    }

    /// Shift the float by `delta` shares. Called by settlement when the
    /// issuer is on one side of a trade.
    pub(crate) fn adjust_available(&self, id: InstrumentId, delta: i64) {
        if let Some(mut entry) = self.instruments.get_mut(&id) {
            let instrument = entry.value_mut();
            if delta >= 0 {
                instrument.available_shares =
                    (instrument.available_shares + delta as u64).min(instrument.total_shares);
            } else {
                instrument.available_shares =
                    instrument.available_shares.saturating_sub((-delta) as u64);
            }
        }
    }

    /// Apply one random-walk step to every instrument: a uniform move within
    /// ±`random_walk_limit`, clipped to the daily band. Invoked by the
    /// external scheduler, typically hourly.
    pub fn random_walk<R: Rng>(&self, date: NaiveDate, rng: &mut R) {
        let ids: Vec<InstrumentId> = self.instruments.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            let Some(instrument) = self.get(id) else {
                continue;
            };
            let limit = self.config.random_walk_limit;
            let change = rng.random_range(-limit..=limit);
            let (low, high) = self.config.band_around(instrument.price);
            let new_price = (instrument.price * (1.0 + change)).clamp(low, high);
            if let Err(err) = self.apply_price(id, new_price, date) {
                tracing::warn!("Random walk skipped {}: {}", instrument.ticker, err);
            }
        }
    }

    /// Holders of an instrument with their share of the outstanding total,
    /// largest first.
    pub fn shareholders(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Result<Vec<(AccountId, u64, f64)>, MarketError> {
        let ticker_norm = ticker.trim().to_ascii_uppercase();
        let id = self
            .id_of(&ticker_norm)
            .ok_or(MarketError::UnknownInstrument(ticker_norm))?;
        let holders = self.holdings.holders_of(id);
        let outstanding: u64 = holders.iter().map(|(_, shares)| shares).sum();
        Ok(holders
            .into_iter()
            .take(limit)
            .map(|(account, shares)| {
                let pct = if outstanding > 0 {
                    shares as f64 * 100.0 / outstanding as f64
                } else {
                    0.0
                };
                (account, shares, pct)
            })
            .collect())
    }

    /// Market value of every holding of `account` at current prices.
    pub fn portfolio_value(&self, account: AccountId) -> f64 {
        self.holdings
            .holdings_of(account)
            .into_iter()
            .filter_map(|(id, shares)| self.get(id).map(|i| shares as f64 * i.price))
            .sum()
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }
}
