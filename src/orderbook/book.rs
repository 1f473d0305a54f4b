//! Per-instrument order container.
//!
//! One `InstrumentBook` holds every order ever placed against an instrument
//! plus its trade log. The exchange wraps each book in a mutex, so all
//! mutation here happens under per-instrument exclusion; the book itself is
//! plain data with price-time selection logic.

use super::order::{Order, OrderId, Side, Trade};
use crate::market::InstrumentId;
use std::collections::HashMap;

#[derive(Debug)]
pub(crate) struct InstrumentBook {
    pub(crate) instrument: InstrumentId,
    orders: HashMap<OrderId, Order>,
    trades: Vec<Trade>,
    next_seq: u64,
}

impl InstrumentBook {
    pub(crate) fn new(instrument: InstrumentId) -> Self {
        Self {
            instrument,
            orders: HashMap::new(),
            trades: Vec::new(),
            next_seq: 0,
        }
    }

    /// Allocate the next time-priority sequence number.
    pub(crate) fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub(crate) fn insert(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub(crate) fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub(crate) fn order_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&id)
    }

    /// Best active order on `side` under price-time priority: highest price
    /// first for bids, lowest first for asks, earlier arrival winning ties.
    pub(crate) fn best_active(&self, side: Side) -> Option<OrderId> {
        self.orders
            .values()
            .filter(|order| order.is_active() && order.side == side)
            .max_by(|a, b| {
                let by_price = match side {
                    Side::Buy => a.limit_price.total_cmp(&b.limit_price),
                    Side::Sell => b.limit_price.total_cmp(&a.limit_price),
                };
                by_price.then(b.seq.cmp(&a.seq))
            })
            .map(|order| order.id)
    }

    /// Active orders of one side, best first.
    pub(crate) fn active_orders(&self, side: Side) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .values()
            .filter(|order| order.is_active() && order.side == side)
            .collect();
        orders.sort_by(|a, b| {
            let by_price = match side {
                Side::Buy => b.limit_price.total_cmp(&a.limit_price),
                Side::Sell => a.limit_price.total_cmp(&b.limit_price),
            };
            by_price.then(a.seq.cmp(&b.seq))
        });
        orders
    }

    /// Every order in the book, any status.
    pub(crate) fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub(crate) fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Most recent trades, newest first.
    pub(crate) fn recent_trades(&self, limit: usize) -> Vec<Trade> {
        self.trades.iter().rev().take(limit).cloned().collect()
    }

    /// Cash still escrowed by active buy orders.
    pub(crate) fn escrowed_cash(&self) -> i64 {
        self.orders
            .values()
            .filter(|order| order.is_active())
            .map(|order| order.escrow_remaining)
            .sum()
    }

    /// Shares still reserved by active sell orders.
    pub(crate) fn reserved_shares(&self) -> u64 {
        self.orders
            .values()
            .filter(|order| order.is_active())
            .map(|order| order.reserved_shares)
            .sum()
    }
}
