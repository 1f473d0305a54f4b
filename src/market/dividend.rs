//! Issuer-funded pro-rata dividend distribution.

use super::error::MarketError;
use super::holdings::HoldingsStore;
use super::registry::InstrumentRegistry;
use crate::ledger::{AccountId, Ledger};
use crate::market::InstrumentId;
use crate::utils::current_time_millis;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::info;

/// Record of one completed payout.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DividendRecord {
    pub instrument: InstrumentId,
    pub amount_per_share: f64,
    pub issuer: AccountId,
    /// Total coins debited from the issuer
    pub total_paid: i64,
    /// Milliseconds since UNIX epoch
    pub issued_at: u64,
}

/// Pays dividends out of the issuer's ledger balance to every current
/// holder, pro rata.
pub struct DividendDistributor {
    ledger: Arc<Ledger>,
    holdings: Arc<HoldingsStore>,
    registry: Arc<InstrumentRegistry>,
    records: Mutex<Vec<DividendRecord>>,
}

impl DividendDistributor {
    /// Create a distributor over the given stores.
    pub fn new(
        ledger: Arc<Ledger>,
        holdings: Arc<HoldingsStore>,
        registry: Arc<InstrumentRegistry>,
    ) -> Self {
        Self {
            ledger,
            holdings,
            registry,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Pay `amount_per_share` to every holder of `ticker`.
    ///
    /// Only the issuer may pay, the amount must be positive, and the
    /// issuer's balance must cover `amount_per_share × Σ holdings`. The
    /// holder set and the total are taken from one snapshot; the issuer is
    /// debited the exact total first, so the payout either happens in full
    /// or not at all — holder credits cannot fail.
    pub fn pay(
        &self,
        issuer: AccountId,
        ticker: &str,
        amount_per_share: f64,
    ) -> Result<DividendRecord, MarketError> {
        if amount_per_share <= 0.0 {
            return Err(MarketError::InvalidAmount(amount_per_share));
        }

        let instrument = self
            .registry
            .get_info(ticker)
            .ok_or_else(|| MarketError::UnknownInstrument(ticker.trim().to_ascii_uppercase()))?;
        if instrument.issuer != issuer {
            return Err(MarketError::NotIssuer {
                ticker: instrument.ticker.clone(),
                account: issuer,
            });
        }

        // Point-in-time snapshot: every credit below comes from this list,
        // and the debit is its exact sum.
        let holders = self.holdings.holders_of(instrument.id);
        let payouts: Vec<(AccountId, i64)> = holders
            .into_iter()
            .map(|(account, shares)| (account, (shares as f64 * amount_per_share).round() as i64))
            .filter(|(_, amount)| *amount > 0)
            .collect();
        let total: i64 = payouts.iter().map(|(_, amount)| amount).sum();
        if total == 0 {
            return Err(MarketError::InvalidAmount(amount_per_share));
        }

        self.ledger.apply_delta(
            issuer,
            -total,
            format!("Dividend payout for {}", instrument.ticker),
        )?;

        for (account, amount) in &payouts {
            // Credits cannot fail: the delta is positive.
            let _ = self.ledger.apply_delta(
                *account,
                *amount,
                format!("Dividend from {}", instrument.ticker),
            );
        }

        let record = DividendRecord {
            instrument: instrument.id,
            amount_per_share,
            issuer,
            total_paid: total,
            issued_at: current_time_millis(),
        };
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }

        info!(
            "Dividend on {}: {} per share, {} total to {} holders",
            instrument.ticker,
            amount_per_share,
            total,
            payouts.len()
        );
        Ok(record)
    }

    /// Payout history for one instrument, newest first.
    pub fn history(&self, instrument: InstrumentId) -> Vec<DividendRecord> {
        match self.records.lock() {
            Ok(records) => records
                .iter()
                .rev()
                .filter(|record| record.instrument == instrument)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
