//! # Virtual Stock Exchange Engine
//!
//! A self-contained market engine for simulated in-community economies: a
//! fictional currency ledger, an instrument registry, an escrow-based limit
//! order book with midpoint matching, per-day price history, dividend
//! distribution, and two families of autonomous trading agents that
//! generate synthetic order flow against the same book human callers use.
//!
//! ## Key Properties
//!
//! - **Conservation by construction**: buy orders escrow their full cost at
//!   placement and sell orders reserve their shares, so coins and shares
//!   only ever move between accounts — the sum of balances plus escrowed
//!   cash, and of holdings plus reservations, is invariant across any
//!   sequence of placements, fills and cancellations.
//!
//! - **Per-instrument serialization**: the place-order-then-match sequence
//!   runs under one mutex per instrument, so concurrent orders against the
//!   same instrument can never double-spend escrow or double-allocate
//!   shares, while different instruments trade in parallel.
//!
//! - **Midpoint pricing**: crossed orders trade at `(bid + ask) / 2`, with
//!   the buyer refunded the gap between its escrowed limit and the actual
//!   trade value. This deliberately diverges from real-exchange
//!   resting-price semantics; the refund keeps the books exact.
//!
//! - **Agents are ordinary customers**: virtual traders and rarity-tiered
//!   assistants read market state through the public interfaces and submit
//!   orders through [`Exchange::place_order`] like anyone else, so no agent
//!   can violate an invariant the order book enforces.
//!
//! ## Layout
//!
//! | Module | Responsibility |
//! |---|---|
//! | [`ledger`] | integer-coin balances, overdraft guard, history |
//! | [`market`] | instruments, holdings, price history, dividends |
//! | [`orderbook`] | the exchange facade, matching and settlement |
//! | [`agents`] | virtual traders and trading assistants |
//! | [`config`] | market-wide tunables |
//!
//! ## Example
//!
//! ```
//! use exchange_rs::{AccountId, Exchange, MarketConfig, Side};
//!
//! let exchange = Exchange::new(MarketConfig::default());
//! let issuer = AccountId(1);
//! let buyer = AccountId(2);
//!
//! exchange.ledger().apply_delta(issuer, 100_000, "seed").unwrap();
//! exchange.ledger().apply_delta(buyer, 10_000, "seed").unwrap();
//!
//! exchange.issue(issuer, "ACME", "Acme Corp", 100.0, 1_000, "widgets").unwrap();
//!
//! // Buyer bids inside the ±10% daily band; the cost is escrowed now.
//! let bid = exchange.place_order(buyer, "ACME", Side::Buy, 10, 100.0).unwrap();
//! assert!(!bid.matched());
//!
//! // The issuer's ask crosses and the pair trades at the midpoint.
//! let ask = exchange.place_order(issuer, "ACME", Side::Sell, 10, 100.0).unwrap();
//! assert_eq!(ask.trades.len(), 1);
//! assert_eq!(ask.trades[0].price_per_share, 100.0);
//! ```
//!
//! ## Scheduling
//!
//! The engine is synchronous and event-driven: nothing here spawns tasks.
//! An external scheduler calls [`VirtualTraderManager::run_cycle`] every few
//! minutes, and [`AssistantManager::run_cycle`] plus
//! [`Exchange::run_random_walk`] hourly. The `demos` workspace member shows
//! a threaded driver with that cadence.
//!
//! [`Exchange::place_order`]: orderbook::Exchange::place_order
//! [`VirtualTraderManager::run_cycle`]: agents::VirtualTraderManager::run_cycle
//! [`AssistantManager::run_cycle`]: agents::AssistantManager::run_cycle
//! [`Exchange::run_random_walk`]: orderbook::Exchange::run_random_walk

pub mod agents;
pub mod config;
pub mod ledger;
pub mod market;
pub mod orderbook;

mod utils;

pub use agents::{AssistantManager, Rarity, TraderStrategy, VirtualTraderManager};
pub use config::MarketConfig;
pub use ledger::{AccountId, Ledger, LedgerError};
pub use market::{
    DividendDistributor, HoldingsStore, Instrument, InstrumentId, InstrumentRegistry, MarketError,
    PriceHistory,
};
pub use orderbook::{
    DepthSnapshot, Exchange, Order, OrderBookError, OrderId, OrderStatus, Placement, Side, Trade,
};
pub use utils::{current_date, current_time_millis};
