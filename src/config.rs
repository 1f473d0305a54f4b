//! Market-wide tunables.
//!
//! A single configuration value is threaded through the registry, the order
//! book and the agent managers at construction time, so there is no ambient
//! global state to reach for.

/// Tunable parameters of the exchange.
#[derive(Debug, Clone, Copy)]
pub struct MarketConfig {
    /// Daily price corridor around the current price within which limit
    /// orders must fall (0.10 = ±10%).
    pub daily_band: f64,

    /// Issuance fee charged to the issuer as a fraction of
    /// `initial_price * total_shares`.
    pub issue_fee_rate: f64,

    /// Lowest price an instrument may be issued at.
    pub min_issue_price: f64,

    /// Smallest share count an instrument may be issued with.
    pub min_issue_shares: u64,

    /// Amplitude of the periodic random walk applied to instrument prices
    /// (0.03 = moves drawn from ±3%, then clipped to the daily band).
    pub random_walk_limit: f64,

    /// Coins charged for one trading-assistant draw.
    pub assistant_draw_cost: i64,

    /// Starting ledger balance for a newly created virtual trader.
    pub trader_seed_balance: i64,

    /// Cap on a single virtual-trader buy as a fraction of an instrument's
    /// total shares.
    pub trader_buy_float_cap: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            daily_band: 0.10,
            issue_fee_rate: 0.05,
            min_issue_price: 1.0,
            min_issue_shares: 100,
            random_walk_limit: 0.03,
            assistant_draw_cost: 2_000,
            trader_seed_balance: 50_000,
            trader_buy_float_cap: 0.005,
        }
    }
}

impl MarketConfig {
    /// Lower and upper bound of the daily band around `price`.
    pub fn band_around(&self, price: f64) -> (f64, f64) {
        (price * (1.0 - self.daily_band), price * (1.0 + self.daily_band))
    }

    /// Whether `limit_price` falls inside the daily band around `price`.
    pub fn within_band(&self, price: f64, limit_price: f64) -> bool {
        let (low, high) = self.band_around(price);
        limit_price >= low && limit_price <= high
    }
}
