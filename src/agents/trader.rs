//! Simple virtual traders and their manager.

use super::error::AgentError;
use super::strategy::{TradeAction, TradeContext, TraderStrategy};
use crate::ledger::AccountId;
use crate::orderbook::{Exchange, Side};
use crate::utils::current_time_millis;
use dashmap::DashMap;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Agent ledger accounts live above this floor, well clear of both small
/// hand-picked ids and chat-platform snowflakes.
const TRADER_ACCOUNT_BASE: u64 = 1 << 56;

/// Identifier of a virtual trader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraderId(pub u64);

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A simple autonomous trader. Its cash lives in its own ledger account
/// and its positions in the shared holdings store, so every invariant that
/// binds human accounts binds traders too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualTrader {
    pub id: TraderId,
    pub name: String,
    pub account: AccountId,
    pub strategy: TraderStrategy,
    /// Risk appetite in (0, 1], scales buy sizing
    pub risk_level: f64,
    pub active: bool,
    /// Milliseconds since UNIX epoch of the last submitted order
    pub last_trade_time: Option<u64>,
}

/// Aggregate statistics over all traders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraderStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Trader count per strategy name
    pub strategies: HashMap<String, usize>,
    /// Combined cash across trader accounts
    pub total_cash: i64,
    /// Combined market value of trader holdings
    pub total_holdings_value: f64,
}

/// Creates traders, owns their records and drives their trading cycles.
pub struct VirtualTraderManager {
    exchange: Arc<Exchange>,
    traders: DashMap<TraderId, VirtualTrader>,
    next_id: AtomicU64,
}

impl VirtualTraderManager {
    /// Create a manager trading on `exchange`.
    pub fn new(exchange: Arc<Exchange>) -> Self {
        Self {
            exchange,
            traders: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a trader. Unspecified strategy and risk are randomized; an
    /// unspecified balance uses the configured seed. The seed is credited
    /// to the trader's fresh ledger account.
    pub fn create_trader<R: Rng>(
        &self,
        name: &str,
        balance: Option<i64>,
        strategy: Option<TraderStrategy>,
        risk_level: Option<f64>,
        rng: &mut R,
    ) -> TraderId {
        let id = TraderId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let account = AccountId(TRADER_ACCOUNT_BASE + id.0);
        let balance = balance.unwrap_or(self.exchange.config().trader_seed_balance);
        let strategy = strategy.unwrap_or_else(|| TraderStrategy::random(rng));
        let risk_level = risk_level.unwrap_or_else(|| rng.random_range(0.1..=1.0));

        // A positive delta cannot fail.
        let _ = self.exchange.ledger().apply_delta(
            account,
            balance.max(0),
            format!("Seed balance for virtual trader {}", name),
        );

        self.traders.insert(
            id,
            VirtualTrader {
                id,
                name: name.to_string(),
                account,
                strategy,
                risk_level,
                active: true,
                last_trade_time: None,
            },
        );
        debug!("Created virtual trader {} ({}) with {}", id, name, balance);
        id
    }

    /// All traders ordered by id.
    pub fn traders(&self) -> Vec<VirtualTrader> {
        let mut rows: Vec<VirtualTrader> = self
            .traders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|trader| trader.id);
        rows
    }

    /// One trader by id.
    pub fn trader(&self, id: TraderId) -> Option<VirtualTrader> {
        self.traders.get(&id).map(|entry| entry.value().clone())
    }

    /// Flip a trader's active flag; returns the new state.
    pub fn toggle_active(&self, id: TraderId) -> Result<bool, AgentError> {
        let mut entry = self
            .traders
            .get_mut(&id)
            .ok_or(AgentError::UnknownTrader(id))?;
        entry.active = !entry.active;
        Ok(entry.active)
    }

    /// Replace a trader's strategy.
    pub fn set_strategy(&self, id: TraderId, strategy: TraderStrategy) -> Result<(), AgentError> {
        let mut entry = self
            .traders
            .get_mut(&id)
            .ok_or(AgentError::UnknownTrader(id))?;
        entry.strategy = strategy;
        Ok(())
    }

    /// Spendable cash of one trader.
    pub fn balance_of(&self, id: TraderId) -> Result<i64, AgentError> {
        let trader = self.trader(id).ok_or(AgentError::UnknownTrader(id))?;
        Ok(self.exchange.ledger().balance(trader.account))
    }

    /// Aggregate counts, cash and holdings value across all traders.
    pub fn stats(&self) -> TraderStats {
        let mut stats = TraderStats::default();
        for entry in self.traders.iter() {
            let trader = entry.value();
            stats.total += 1;
            if trader.active {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            *stats
                .strategies
                .entry(trader.strategy.to_string())
                .or_insert(0) += 1;
            stats.total_cash += self.exchange.ledger().balance(trader.account);
            stats.total_holdings_value += self.exchange.registry().portfolio_value(trader.account);
        }
        stats
    }

    /// Run one trading cycle: a random subset of between 1 and a third of
    /// the active traders each analyses one random instrument and may
    /// submit an order. One trader's failure is logged and skipped, never
    /// aborting the cycle. Invoked by the external scheduler.
    pub fn run_cycle<R: Rng>(&self, rng: &mut R) {
        let mut active: Vec<TraderId> = self
            .traders
            .iter()
            .filter(|entry| entry.value().active)
            .map(|entry| *entry.key())
            .collect();
        if active.is_empty() {
            return;
        }

        let take = rng.random_range(1..=(active.len() / 3).max(1));
        active.shuffle(rng);
        active.truncate(take);

        for id in active {
            if let Err(err) = self.run_trader(id, rng) {
                warn!("Virtual trader {} skipped this cycle: {}", id, err);
            }
        }
    }

    /// One trader's turn: pick an instrument, consult the strategy, submit.
    fn run_trader<R: Rng>(&self, id: TraderId, rng: &mut R) -> Result<(), AgentError> {
        let trader = self.trader(id).ok_or(AgentError::UnknownTrader(id))?;

        let instruments = self.exchange.registry().all();
        let Some(instrument) = instruments.choose(rng) else {
            return Ok(()); // nothing listed yet
        };

        let closes = self.exchange.history().closes(instrument.id, 30);
        let ctx = TradeContext {
            price: instrument.price,
            total_shares: instrument.total_shares,
            closes: &closes,
            held_shares: self.exchange.holdings().shares(trader.account, instrument.id),
            balance: self.exchange.ledger().balance(trader.account),
            risk_level: trader.risk_level,
            max_float_fraction: self.exchange.config().trader_buy_float_cap,
        };

        let action = trader.strategy.decide(&ctx, rng);
        let (side, shares, price) = match action {
            TradeAction::Hold => return Ok(()),
            TradeAction::Buy { shares, price } => (Side::Buy, shares, price),
            TradeAction::Sell { shares, price } => (Side::Sell, shares, price),
        };
        if shares == 0 {
            return Ok(());
        }

        // Escrow and refunds are entirely the order book's business: a
        // rejected placement leaves the trader's cash and shares untouched.
        let placement =
            self.exchange
                .place_order(trader.account, &instrument.ticker, side, shares, price)?;
        debug!("Virtual trader {} ({}): {}", id, trader.name, placement);

        if let Some(mut entry) = self.traders.get_mut(&id) {
            entry.last_trade_time = Some(current_time_millis());
        }
        Ok(())
    }
}
