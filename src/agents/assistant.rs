//! Trading assistants: rarity-tiered agents owned by real accounts.
//!
//! Assistants are obtained through a paid draw, watch a rarity-bounded list
//! of instruments, and trade with their owner's account on an hourly cycle.
//! At most one assistant per owner is active at a time.

use super::error::AgentError;
use crate::ledger::AccountId;
use crate::orderbook::{Exchange, Side};
use crate::utils::current_time_millis;
use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Identifier of a trading assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssistantId(pub u64);

impl fmt::Display for AssistantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rarity tier: bounds the watch list and selects the strategy complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    N,
    R,
    SR,
    SSR,
}

impl Rarity {
    /// Maximum instruments an assistant of this rarity may monitor.
    pub fn max_watched(&self) -> usize {
        match self {
            Rarity::N => 1,
            Rarity::R => 3,
            Rarity::SR => 5,
            Rarity::SSR => 100,
        }
    }

    /// Draw odds: SSR 5%, SR 10%, R 25%, N 60%.
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        let roll = rng.random_range(0.0..100.0);
        if roll < 5.0 {
            Rarity::SSR
        } else if roll < 15.0 {
            Rarity::SR
        } else if roll < 40.0 {
            Rarity::R
        } else {
            Rarity::N
        }
    }

    fn name_prefix(&self) -> &'static str {
        match self {
            Rarity::N => "Junior Advisor",
            Rarity::R => "Professional Analyst",
            Rarity::SR => "Elite Tactician",
            Rarity::SSR => "Omniscient",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rarity::N => write!(f, "N"),
            Rarity::R => write!(f, "R"),
            Rarity::SR => write!(f, "SR"),
            Rarity::SSR => write!(f, "SSR"),
        }
    }
}

const NAME_ADJECTIVES: [&str; 10] = [
    "Keen", "Wise", "Sharp", "Careful", "Decisive", "Shrewd", "Insightful", "Calm", "Diligent",
    "Prescient",
];
const NAME_NOUNS: [&str; 10] = [
    "Falcon",
    "Cheetah",
    "Strategist",
    "Oracle",
    "Observer",
    "Handler",
    "Operator",
    "Arbiter",
    "Winner",
    "Legend",
];

/// One trading assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub id: AssistantId,
    pub owner: AccountId,
    pub name: String,
    pub rarity: Rarity,
    pub active: bool,
    /// Free-form strategy settings, parsed by the rarity's strategy
    pub settings: HashMap<String, String>,
    /// Tickers this assistant monitors, bounded by rarity
    pub watched: Vec<String>,
    /// Milliseconds since UNIX epoch of the draw
    pub obtained_at: u64,
}

/// One order the assistant submitted, with realized P&L on sells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantTrade {
    pub ticker: String,
    pub side: Side,
    pub shares: u64,
    pub price: f64,
    pub total_amount: f64,
    /// Realized profit on sells, zero on buys
    pub profit_loss: f64,
    /// Milliseconds since UNIX epoch
    pub at: u64,
}

/// Assistant plus its recent trade log and aggregate profit.
#[derive(Debug, Clone)]
pub struct AssistantDetails {
    pub assistant: Assistant,
    /// Most recent trades, newest first
    pub trades: Vec<AssistantTrade>,
    pub total_profit: f64,
}

/// Owns all assistants, their draw, configuration and trading cycles.
pub struct AssistantManager {
    exchange: Arc<Exchange>,
    assistants: DashMap<AssistantId, Assistant>,
    trade_logs: DashMap<AssistantId, Vec<AssistantTrade>>,
    next_id: AtomicU64,
}

impl AssistantManager {
    /// Create a manager trading on `exchange`.
    pub fn new(exchange: Arc<Exchange>) -> Self {
        Self {
            exchange,
            assistants: DashMap::new(),
            trade_logs: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub(super) fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    /// Draw a new assistant for `owner`, charging the configured cost.
    /// Newly drawn assistants start inactive.
    pub fn draw<R: Rng>(&self, owner: AccountId, rng: &mut R) -> Result<Assistant, AgentError> {
        let cost = self.exchange.config().assistant_draw_cost;
        self.exchange
            .ledger()
            .apply_delta(owner, -cost, "Trading assistant draw")?;

        let rarity = Rarity::roll(rng);
        let adjective = NAME_ADJECTIVES[rng.random_range(0..NAME_ADJECTIVES.len())];
        let noun = NAME_NOUNS[rng.random_range(0..NAME_NOUNS.len())];
        let name = format!("{} {} {}", rarity.name_prefix(), adjective, noun);

        let id = AssistantId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let assistant = Assistant {
            id,
            owner,
            name,
            rarity,
            active: false,
            settings: HashMap::new(),
            watched: Vec::new(),
            obtained_at: current_time_millis(),
        };
        self.assistants.insert(id, assistant.clone());
        debug!("Account {} drew {} assistant {}", owner, rarity, assistant.name);
        Ok(assistant)
    }

    /// All assistants of one owner, best rarity first, newest first within
    /// a rarity.
    pub fn assistants_of(&self, owner: AccountId) -> Vec<Assistant> {
        let mut rows: Vec<Assistant> = self
            .assistants
            .iter()
            .filter(|entry| entry.value().owner == owner)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| {
            b.rarity
                .cmp(&a.rarity)
                .then(b.obtained_at.cmp(&a.obtained_at))
        });
        rows
    }

    /// One assistant by id.
    pub fn assistant(&self, id: AssistantId) -> Option<Assistant> {
        self.assistants.get(&id).map(|entry| entry.value().clone())
    }

    /// Toggle an assistant. Activating one deactivates the owner's other
    /// assistants: at most one runs per owner.
    pub fn toggle_active(&self, id: AssistantId, owner: AccountId) -> Result<bool, AgentError> {
        let current = {
            let entry = self
                .assistants
                .get(&id)
                .ok_or(AgentError::UnknownAssistant(id))?;
            if entry.owner != owner {
                return Err(AgentError::NotAssistantOwner(id));
            }
            entry.active
        };

        if !current {
            for mut entry in self.assistants.iter_mut() {
                if entry.owner == owner && entry.active {
                    entry.active = false;
                }
            }
        }
        if let Some(mut entry) = self.assistants.get_mut(&id) {
            entry.active = !current;
        }
        Ok(!current)
    }

    /// Replace the watch list. Unknown tickers are dropped; the survivors
    /// must fit the rarity's bound.
    pub fn set_watched(
        &self,
        id: AssistantId,
        owner: AccountId,
        tickers: &[&str],
    ) -> Result<Vec<String>, AgentError> {
        let rarity = {
            let entry = self
                .assistants
                .get(&id)
                .ok_or(AgentError::UnknownAssistant(id))?;
            if entry.owner != owner {
                return Err(AgentError::NotAssistantOwner(id));
            }
            entry.rarity
        };

        let valid: Vec<String> = tickers
            .iter()
            .map(|ticker| ticker.trim().to_ascii_uppercase())
            .filter(|ticker| !ticker.is_empty())
            .filter(|ticker| self.exchange.registry().id_of(ticker).is_some())
            .collect();

        let max = rarity.max_watched();
        if valid.len() > max {
            return Err(AgentError::TooManyWatched {
                rarity,
                max,
                requested: valid.len(),
            });
        }

        if let Some(mut entry) = self.assistants.get_mut(&id) {
            entry.watched = valid.clone();
        }
        Ok(valid)
    }

    /// Replace the settings map wholesale.
    pub fn set_settings(
        &self,
        id: AssistantId,
        owner: AccountId,
        settings: HashMap<String, String>,
    ) -> Result<(), AgentError> {
        let mut entry = self
            .assistants
            .get_mut(&id)
            .ok_or(AgentError::UnknownAssistant(id))?;
        if entry.owner != owner {
            return Err(AgentError::NotAssistantOwner(id));
        }
        entry.settings = settings;
        Ok(())
    }

    /// Assistant with its trade log and total realized profit.
    pub fn details(&self, id: AssistantId) -> Option<AssistantDetails> {
        let assistant = self.assistant(id)?;
        let trades: Vec<AssistantTrade> = self
            .trade_logs
            .get(&id)
            .map(|log| log.iter().rev().take(10).cloned().collect())
            .unwrap_or_default();
        let total_profit = self
            .trade_logs
            .get(&id)
            .map(|log| log.iter().map(|trade| trade.profit_loss).sum())
            .unwrap_or(0.0);
        Some(AssistantDetails {
            assistant,
            trades,
            total_profit,
        })
    }

    /// Insert an assistant with a chosen rarity, bypassing the draw.
    #[cfg(test)]
    pub(super) fn insert_for_tests(&self, owner: AccountId, rarity: Rarity) -> AssistantId {
        let id = AssistantId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.assistants.insert(
            id,
            Assistant {
                id,
                owner,
                name: format!("{} test assistant", rarity),
                rarity,
                active: false,
                settings: HashMap::new(),
                watched: Vec::new(),
                obtained_at: current_time_millis(),
            },
        );
        id
    }

    pub(super) fn record_trade(&self, id: AssistantId, trade: AssistantTrade) {
        self.trade_logs.entry(id).or_default().push(trade);
    }

    /// Average price this assistant paid for its logged buys of `ticker`.
    pub(super) fn avg_buy_cost(&self, id: AssistantId, ticker: &str) -> Option<f64> {
        let log = self.trade_logs.get(&id)?;
        let mut shares = 0u64;
        let mut spent = 0.0;
        for trade in log.iter() {
            if trade.side == Side::Buy && trade.ticker == ticker {
                shares += trade.shares;
                spent += trade.total_amount;
            }
        }
        if shares == 0 {
            None
        } else {
            Some(spent / shares as f64)
        }
    }

    /// Run one assistant cycle: every active assistant analyses each of its
    /// watched instruments. Failures are isolated per assistant and per
    /// instrument. Invoked by the external scheduler, typically hourly.
    pub fn run_cycle<R: Rng>(&self, rng: &mut R) {
        let active: Vec<Assistant> = self
            .assistants
            .iter()
            .filter(|entry| entry.value().active)
            .map(|entry| entry.value().clone())
            .collect();

        for assistant in active {
            for ticker in assistant.watched.clone() {
                if let Err(err) = self.run_ticker(&assistant, &ticker, rng) {
                    warn!(
                        "Assistant {} ({}) skipped {}: {}",
                        assistant.id, assistant.name, ticker, err
                    );
                }
            }
        }
    }
}
