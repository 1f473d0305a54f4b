//! The exchange facade: the one object callers hold.
//!
//! Owns the ledger, registry, holdings, price history and dividend
//! distributor, plus one book per instrument. Place-order-then-match runs
//! under that instrument's mutex, so two orders against the same instrument
//! can never interleave in a way that double-spends escrowed cash or
//! double-allocates shares.

use super::book::InstrumentBook;
use super::error::OrderBookError;
use super::order::{Order, OrderId, OrderStatus, Side, Trade};
use super::snapshot::{DepthLevel, DepthSnapshot};
use crate::config::MarketConfig;
use crate::ledger::{AccountId, Ledger, LedgerError};
use crate::market::{
    DividendDistributor, HoldingsStore, InstrumentId, InstrumentRegistry, MarketError,
    PriceHistory,
};
use crate::utils::{current_date, current_time_millis};
use chrono::NaiveDate;
use dashmap::DashMap;
use rand::Rng;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// Result of a successful order placement.
#[derive(Debug, Clone)]
pub struct Placement {
    pub order_id: OrderId,
    pub ticker: String,
    pub side: Side,
    /// Trades executed by the matching pass this placement triggered
    pub trades: Vec<Trade>,
    /// Unfilled shares left resting in the book
    pub remaining_shares: u64,
}

impl Placement {
    /// Whether the placement triggered at least one trade.
    pub fn matched(&self) -> bool {
        !self.trades.is_empty()
    }

    /// Shares filled by the triggered matching pass.
    pub fn filled_shares(&self) -> u64 {
        self.trades.iter().map(|trade| trade.shares).sum()
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.remaining_shares == 0 {
            write!(
                f,
                "{} order for {} fully matched ({} shares)",
                self.side,
                self.ticker,
                self.filled_shares()
            )
        } else if self.matched() {
            write!(
                f,
                "{} order for {} partially matched, {} shares waiting",
                self.side, self.ticker, self.remaining_shares
            )
        } else {
            write!(
                f,
                "{} order for {} submitted, waiting to be matched",
                self.side, self.ticker
            )
        }
    }
}

/// The virtual exchange.
pub struct Exchange {
    config: MarketConfig,
    ledger: Arc<Ledger>,
    holdings: Arc<HoldingsStore>,
    history: Arc<PriceHistory>,
    registry: Arc<InstrumentRegistry>,
    dividends: DividendDistributor,
    books: DashMap<InstrumentId, Arc<Mutex<InstrumentBook>>>,
    order_index: DashMap<OrderId, InstrumentId>,
    date_source: fn() -> NaiveDate,
}

impl Exchange {
    /// Create an exchange with fresh stores and the wall-clock trading day.
    pub fn new(config: MarketConfig) -> Self {
        Self::with_date_source(config, current_date)
    }

    /// Create an exchange whose trading day comes from `date_source`.
    /// Tests pin the date with this.
    pub fn with_date_source(config: MarketConfig, date_source: fn() -> NaiveDate) -> Self {
        let ledger = Arc::new(Ledger::new());
        let holdings = Arc::new(HoldingsStore::new());
        let history = Arc::new(PriceHistory::new());
        let registry = Arc::new(InstrumentRegistry::new(
            Arc::clone(&ledger),
            Arc::clone(&holdings),
            Arc::clone(&history),
            config,
        ));
        let dividends = DividendDistributor::new(
            Arc::clone(&ledger),
            Arc::clone(&holdings),
            Arc::clone(&registry),
        );
        Self {
            config,
            ledger,
            holdings,
            history,
            registry,
            dividends,
            books: DashMap::new(),
            order_index: DashMap::new(),
            date_source,
        }
    }

    /// The current trading day.
    pub fn today(&self) -> NaiveDate {
        (self.date_source)()
    }

    /// The ledger behind this exchange.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The holdings store behind this exchange.
    pub fn holdings(&self) -> &HoldingsStore {
        &self.holdings
    }

    /// The per-day price history behind this exchange.
    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    /// The instrument registry behind this exchange.
    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    /// The dividend distributor behind this exchange.
    pub fn dividends(&self) -> &DividendDistributor {
        &self.dividends
    }

    /// The configuration this exchange was built with.
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Issue a new instrument dated to the current trading day.
    /// See [`InstrumentRegistry::issue`] for the preconditions.
    pub fn issue(
        &self,
        issuer: AccountId,
        ticker: &str,
        name: &str,
        initial_price: f64,
        total_shares: u64,
        description: &str,
    ) -> Result<InstrumentId, MarketError> {
        self.registry.issue(
            issuer,
            ticker,
            name,
            initial_price,
            total_shares,
            description,
            self.today(),
        )
    }

    /// Apply one random-walk step to every instrument, dated today.
    pub fn run_random_walk<R: Rng>(&self, rng: &mut R) {
        self.registry.random_walk(self.today(), rng);
    }

    /// Place a limit order and immediately run a matching pass for the
    /// instrument.
    ///
    /// Buy orders escrow their full cost up front; sell orders reserve the
    /// shares out of the holding. Every precondition failure returns before
    /// any state is touched.
    pub fn place_order(
        &self,
        account: AccountId,
        ticker: &str,
        side: Side,
        shares: u64,
        limit_price: f64,
    ) -> Result<Placement, OrderBookError> {
        let instrument = self
            .registry
            .get_info(ticker)
            .ok_or_else(|| OrderBookError::UnknownInstrument(ticker.trim().to_ascii_uppercase()))?;
        if shares == 0 {
            return Err(OrderBookError::InvalidQuantity(shares));
        }
        if limit_price <= 0.0 {
            return Err(OrderBookError::InvalidPrice(limit_price));
        }

        let book_arc = self.book_for(instrument.id);
        let mut book = lock_book(&book_arc);

        // Re-read the price under the lock: matching in another thread may
        // have moved it since the ticker lookup.
        let current_price = self
            .registry
            .get(instrument.id)
            .map(|info| info.price)
            .unwrap_or(instrument.price);
        let (low, high) = self.config.band_around(current_price);
        if !self.config.within_band(current_price, limit_price) {
            return Err(OrderBookError::PriceOutsideBand {
                limit_price,
                low,
                high,
            });
        }

        let (escrow_remaining, reserved_shares) = match side {
            Side::Buy => {
                let cost = (shares as f64 * limit_price).round() as i64;
                self.ledger
                    .apply_delta(
                        account,
                        -cost,
                        format!("Escrow for buy order: {} {}", shares, instrument.ticker),
                    )
                    .map_err(|err| match err {
                        LedgerError::InsufficientFunds { balance, .. } => {
                            OrderBookError::InsufficientFunds {
                                required: cost,
                                available: balance,
                            }
                        }
                    })?;
                (cost, 0)
            }
            Side::Sell => {
                if !self.holdings.try_withdraw(account, instrument.id, shares) {
                    return Err(OrderBookError::InsufficientShares {
                        requested: shares,
                        held: self.holdings.shares(account, instrument.id),
                    });
                }
                (0, shares)
            }
        };

        let order = Order {
            id: OrderId::new(),
            account,
            instrument: instrument.id,
            side,
            shares,
            limit_price,
            created_at: current_time_millis(),
            seq: book.next_seq(),
            status: OrderStatus::Active,
            escrow_remaining,
            reserved_shares,
        };
        let order_id = order.id;
        trace!(
            "Placing {} order {}: {} {} at {} for account {}",
            side, order_id, shares, instrument.ticker, limit_price, account
        );
        book.insert(order);
        self.order_index.insert(order_id, instrument.id);

        let trades = self.run_matching(&mut book, self.today());
        let remaining_shares = book.order(order_id).map(|o| o.shares).unwrap_or(0);

        Ok(Placement {
            order_id,
            ticker: instrument.ticker,
            side,
            trades,
            remaining_shares,
        })
    }

    /// Cancel an active order owned by `account`.
    ///
    /// Buy orders get their remaining escrow refunded, sell orders their
    /// reserved shares returned. Canceling a completed or already-canceled
    /// order fails without side effects.
    pub fn cancel_order(
        &self,
        account: AccountId,
        order_id: OrderId,
    ) -> Result<Order, OrderBookError> {
        let instrument = *self
            .order_index
            .get(&order_id)
            .ok_or(OrderBookError::UnknownOrder(order_id))?;
        let book_arc = self.book_for(instrument);
        let mut book = lock_book(&book_arc);

        let (refund, reserved, snapshot) = {
            let order = book
                .order_mut(order_id)
                .ok_or(OrderBookError::UnknownOrder(order_id))?;
            if order.account != account {
                return Err(OrderBookError::NotOrderOwner(order_id));
            }
            if !order.is_active() {
                return Err(OrderBookError::OrderNotActive(order_id));
            }
            order.status = OrderStatus::Canceled;
            let refund = order.escrow_remaining;
            let reserved = order.reserved_shares;
            order.escrow_remaining = 0;
            order.reserved_shares = 0;
            (refund, reserved, order.clone())
        };

        let ticker = self
            .registry
            .get(instrument)
            .map(|info| info.ticker)
            .unwrap_or_else(|| instrument.to_string());
        if refund > 0 {
            // A positive delta cannot fail.
            let _ = self.ledger.apply_delta(
                account,
                refund,
                format!("Escrow refund for canceled {} order", ticker),
            );
        }
        if reserved > 0 {
            self.holdings.adjust(account, instrument, reserved as i64);
        }
        trace!("Canceled order {} for account {}", order_id, account);
        Ok(snapshot)
    }

    /// Orders of one account across all instruments, newest first.
    pub fn orders_for(&self, account: AccountId, active_only: bool) -> Vec<Order> {
        let mut orders = Vec::new();
        for entry in self.books.iter() {
            let book = lock_book(entry.value());
            orders.extend(
                book.orders()
                    .filter(|order| order.account == account)
                    .filter(|order| !active_only || order.is_active())
                    .cloned(),
            );
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));
        orders
    }

    /// Look up one order by id.
    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        let instrument = *self.order_index.get(&order_id)?;
        let book_arc = self.books.get(&instrument)?.value().clone();
        let book = lock_book(&book_arc);
        book.order(order_id).cloned()
    }

    /// Most recent trades of an instrument, newest first.
    pub fn recent_trades(&self, ticker: &str, limit: usize) -> Result<Vec<Trade>, OrderBookError> {
        let id = self
            .registry
            .id_of(ticker)
            .ok_or_else(|| OrderBookError::UnknownInstrument(ticker.trim().to_ascii_uppercase()))?;
        Ok(match self.books.get(&id) {
            Some(entry) => lock_book(entry.value()).recent_trades(limit),
            None => Vec::new(),
        })
    }

    /// Aggregate depth snapshot of an instrument's active orders.
    pub fn depth_snapshot(
        &self,
        ticker: &str,
        depth: usize,
    ) -> Result<DepthSnapshot, OrderBookError> {
        let instrument = self
            .registry
            .get_info(ticker)
            .ok_or_else(|| OrderBookError::UnknownInstrument(ticker.trim().to_ascii_uppercase()))?;

        let (bids, asks) = match self.books.get(&instrument.id) {
            Some(entry) => {
                let book = lock_book(entry.value());
                (
                    aggregate_levels(book.active_orders(Side::Buy), depth),
                    aggregate_levels(book.active_orders(Side::Sell), depth),
                )
            }
            None => (Vec::new(), Vec::new()),
        };

        Ok(DepthSnapshot {
            ticker: instrument.ticker,
            timestamp: current_time_millis(),
            bids,
            asks,
        })
    }

    /// Cash currently escrowed by active buy orders, across all books.
    /// `Σ balances + escrowed_cash_total` is the conserved quantity the
    /// property tests check.
    pub fn escrowed_cash_total(&self) -> i64 {
        self.books
            .iter()
            .map(|entry| lock_book(entry.value()).escrowed_cash())
            .sum()
    }

    /// Shares currently reserved by active sell orders on one instrument.
    /// `Σ holdings + reserved_shares_of` equals the instrument's total
    /// shares at all times.
    pub fn reserved_shares_of(&self, instrument: InstrumentId) -> u64 {
        match self.books.get(&instrument) {
            Some(entry) => lock_book(entry.value()).reserved_shares(),
            None => 0,
        }
    }

    fn book_for(&self, instrument: InstrumentId) -> Arc<Mutex<InstrumentBook>> {
        self.books
            .entry(instrument)
            .or_insert_with(|| Arc::new(Mutex::new(InstrumentBook::new(instrument))))
            .value()
            .clone()
    }
}

/// Lock a book, recovering the guard if a previous holder panicked.
pub(crate) fn lock_book(book: &Arc<Mutex<InstrumentBook>>) -> MutexGuard<'_, InstrumentBook> {
    book.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn aggregate_levels(orders: Vec<&Order>, depth: usize) -> Vec<DepthLevel> {
    let mut levels: Vec<DepthLevel> = Vec::new();
    for order in orders {
        match levels.last_mut() {
            Some(level) if level.price == order.limit_price => {
                level.shares += order.shares;
                level.orders += 1;
            }
            _ => levels.push(DepthLevel {
                price: order.limit_price,
                shares: order.shares,
                orders: 1,
            }),
        }
    }
    levels.truncate(depth);
    levels
}
