//! Per-instrument, per-day price series.
//!
//! One point per instrument per calendar day; a later write on the same day
//! overwrites the earlier one. Strategies consume the series as an
//! oldest-to-newest window of closes, the UI reads it newest-first.

use super::instrument::InstrumentId;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recorded close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Daily price series for every instrument.
#[derive(Debug, Default)]
pub struct PriceHistory {
    series: DashMap<InstrumentId, BTreeMap<NaiveDate, f64>>,
}

impl PriceHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            series: DashMap::new(),
        }
    }

    /// Upsert the point for `(instrument, date)` — last write wins within
    /// a day.
    pub fn record(&self, instrument: InstrumentId, price: f64, date: NaiveDate) {
        self.series
            .entry(instrument)
            .or_default()
            .insert(date, price);
    }

    /// The most recent `days` points, newest first.
    pub fn query(&self, instrument: InstrumentId, days: usize) -> Vec<PricePoint> {
        match self.series.get(&instrument) {
            Some(entry) => entry
                .iter()
                .rev()
                .take(days)
                .map(|(&date, &price)| PricePoint { date, price })
                .collect(),
            None => Vec::new(),
        }
    }

    /// The most recent `days` closes, oldest to newest — the shape every
    /// indicator consumes.
    pub fn closes(&self, instrument: InstrumentId, days: usize) -> Vec<f64> {
        let mut points = self.query(instrument, days);
        points.reverse();
        points.into_iter().map(|point| point.price).collect()
    }

    /// Number of recorded days for an instrument.
    pub fn len(&self, instrument: InstrumentId) -> usize {
        self.series
            .get(&instrument)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Whether the instrument has no recorded days.
    pub fn is_empty(&self, instrument: InstrumentId) -> bool {
        self.len(instrument) == 0
    }
}
