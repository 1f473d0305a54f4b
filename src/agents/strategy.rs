//! Virtual-trader strategies.
//!
//! The strategy set is a closed enum: every kind implements one
//! `decide(context) -> TradeAction` and is selected with a match, so a
//! malformed strategy name can only be rejected at the edge, never inside
//! a trading cycle.

use super::indicators::{period_return, sma, tail_mean};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a trader decided to do this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeAction {
    Buy { shares: u64, price: f64 },
    Sell { shares: u64, price: f64 },
    Hold,
}

/// Market view handed to a strategy: one instrument, its recent closes
/// (oldest to newest) and the trader's own position.
#[derive(Debug, Clone)]
pub struct TradeContext<'a> {
    /// Current instrument price
    pub price: f64,
    /// Total shares the instrument was issued with
    pub total_shares: u64,
    /// Recent closes, oldest to newest
    pub closes: &'a [f64],
    /// Shares the trader currently holds
    pub held_shares: u64,
    /// The trader's spendable balance
    pub balance: i64,
    /// The trader's risk appetite in (0, 1]
    pub risk_level: f64,
    /// Cap on one buy as a fraction of `total_shares`
    pub max_float_fraction: f64,
}

impl TradeContext<'_> {
    /// Largest buy this trader may attempt: bounded by spendable balance
    /// scaled by risk, and by the configured slice of the total float.
    fn max_buy_shares(&self) -> u64 {
        let by_balance = (self.balance as f64 * self.risk_level / self.price).floor();
        let by_float = (self.total_shares as f64 * self.max_float_fraction).floor();
        (by_balance.min(by_float).max(1.0)) as u64
    }
}

/// The three fixed virtual-trader strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraderStrategy {
    /// Coin-flip trading with wide price jitter
    Random,
    /// Moving-average trend following
    Trend,
    /// Contrarian: fade recent run-ups and drops
    Reverse,
}

impl TraderStrategy {
    /// Parse a strategy from its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "random" => Some(TraderStrategy::Random),
            "trend" => Some(TraderStrategy::Trend),
            "reverse" => Some(TraderStrategy::Reverse),
            _ => None,
        }
    }

    /// Pick a strategy uniformly at random.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        match rng.random_range(0..3) {
            0 => TraderStrategy::Random,
            1 => TraderStrategy::Trend,
            _ => TraderStrategy::Reverse,
        }
    }

    /// Decide an action for the given market view.
    pub fn decide<R: Rng>(&self, ctx: &TradeContext<'_>, rng: &mut R) -> TradeAction {
        match self {
            TraderStrategy::Random => decide_random(ctx, rng),
            TraderStrategy::Trend => decide_trend(ctx, rng),
            TraderStrategy::Reverse => decide_reverse(ctx, rng),
        }
    }
}

impl fmt::Display for TraderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraderStrategy::Random => write!(f, "random"),
            TraderStrategy::Trend => write!(f, "trend"),
            TraderStrategy::Reverse => write!(f, "reverse"),
        }
    }
}

fn jittered(price: f64, spread: std::ops::RangeInclusive<f64>, rng: &mut impl Rng) -> f64 {
    price * (1.0 + rng.random_range(spread))
}

fn sized_buy(ctx: &TradeContext<'_>, jitter: f64, rng: &mut impl Rng) -> TradeAction {
    let shares = rng.random_range(1..=ctx.max_buy_shares());
    TradeAction::Buy {
        shares,
        price: jittered(ctx.price, -jitter..=jitter, rng),
    }
}

fn sized_sell(ctx: &TradeContext<'_>, jitter: f64, rng: &mut impl Rng) -> TradeAction {
    let shares = rng.random_range(1..=ctx.held_shares);
    TradeAction::Sell {
        shares,
        price: jittered(ctx.price, -jitter..=jitter, rng),
    }
}

/// Weighted coin flip: buy 0.4, sell 0.4, hold 0.2. A flat trader flips a
/// sell into a buy; a broke trader holds instead of buying.
fn decide_random(ctx: &TradeContext<'_>, rng: &mut impl Rng) -> TradeAction {
    let roll = rng.random_range(0.0..1.0);
    let mut wants_buy = roll < 0.4;
    let wants_sell = !wants_buy && roll < 0.8;
    if !wants_buy && !wants_sell {
        return TradeAction::Hold;
    }

    if wants_sell && ctx.held_shares == 0 {
        wants_buy = true;
    }
    if wants_buy {
        if (ctx.balance as f64) < ctx.price {
            return TradeAction::Hold;
        }
        return sized_buy(ctx, 0.05, rng);
    }
    sized_sell(ctx, 0.05, rng)
}

/// Follow the 5-close vs 10-close moving-average spread: buy above a 2%
/// premium, sell below a 2% discount, hold in between.
fn decide_trend(ctx: &TradeContext<'_>, rng: &mut impl Rng) -> TradeAction {
    if ctx.closes.len() < 5 {
        return TradeAction::Hold;
    }
    let Some(short) = sma(ctx.closes, 5) else {
        return TradeAction::Hold;
    };
    // Until ten closes exist the long leg falls back to the current price.
    let long = tail_mean(ctx.closes, 10)
        .filter(|_| ctx.closes.len() >= 10)
        .unwrap_or(ctx.price);

    if short > long * 1.02 {
        if (ctx.balance as f64) < ctx.price {
            return TradeAction::Hold;
        }
        sized_buy(ctx, 0.02, rng)
    } else if short < long * 0.98 {
        if ctx.held_shares == 0 {
            return TradeAction::Hold;
        }
        sized_sell(ctx, 0.02, rng)
    } else {
        TradeAction::Hold
    }
}

/// Fade the 5-close move: sell into a >5% run-up, buy a >5% drop, with the
/// limit price biased against the move.
fn decide_reverse(ctx: &TradeContext<'_>, rng: &mut impl Rng) -> TradeAction {
    if ctx.closes.len() < 5 {
        return TradeAction::Hold;
    }
    let Some(change) = period_return(ctx.closes, 5) else {
        return TradeAction::Hold;
    };

    if change > 0.05 {
        if ctx.held_shares == 0 {
            return TradeAction::Hold;
        }
        let shares = rng.random_range(1..=ctx.held_shares);
        TradeAction::Sell {
            shares,
            price: jittered(ctx.price, 0.01..=0.04, rng),
        }
    } else if change < -0.05 {
        if (ctx.balance as f64) < ctx.price {
            return TradeAction::Hold;
        }
        let shares = rng.random_range(1..=ctx.max_buy_shares());
        TradeAction::Buy {
            shares,
            price: jittered(ctx.price, -0.04..=-0.01, rng),
        }
    } else {
        TradeAction::Hold
    }
}
