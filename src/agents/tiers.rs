//! Rarity-tier strategies for trading assistants.
//!
//! N reads plain price thresholds; R adds a moving-average crossover and a
//! stop-loss; SR votes RSI, MACD and reversal patterns; SSR layers market
//! cycle, anomaly detection, sentiment, portfolio rebalancing and a lucky
//! trade bonus. All four tiers buy and sell through the same two sizing
//! helpers at the bottom, which route into the shared order book.

use super::assistant::{Assistant, AssistantManager, AssistantTrade, Rarity};
use super::error::AgentError;
use super::indicators::{
    bearish_reversal, bullish_reversal, macd_histogram, realized_volatility, rsi, sma, tail_mean,
};
use crate::market::Instrument;
use crate::orderbook::Side;
use crate::utils::current_time_millis;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

fn setting_f64(
    settings: &HashMap<String, String>,
    key: &str,
    default: f64,
) -> Result<f64, AgentError> {
    match settings.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| AgentError::InvalidSetting {
            key: key.to_string(),
            value: raw.clone(),
        }),
    }
}

fn setting_usize(
    settings: &HashMap<String, String>,
    key: &str,
    default: usize,
) -> Result<usize, AgentError> {
    match settings.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| AgentError::InvalidSetting {
            key: key.to_string(),
            value: raw.clone(),
        }),
    }
}

fn setting_bool(settings: &HashMap<String, String>, key: &str, default: bool) -> bool {
    match settings.get(key) {
        None => default,
        Some(raw) => raw.trim().eq_ignore_ascii_case("true"),
    }
}

impl AssistantManager {
    /// Analyse one watched instrument with the assistant's rarity strategy.
    pub(super) fn run_ticker<R: Rng>(
        &self,
        assistant: &Assistant,
        ticker: &str,
        rng: &mut R,
    ) -> Result<(), AgentError> {
        let Some(instrument) = self.exchange().registry().get_info(ticker) else {
            return Ok(()); // delisted since it was watched
        };

        match assistant.rarity {
            Rarity::N => self.run_n(assistant, &instrument),
            Rarity::R => self.run_r(assistant, &instrument),
            Rarity::SR => self.run_sr(assistant, &instrument),
            Rarity::SSR => self.run_ssr(assistant, &instrument, rng),
        }
    }

    /// N tier: buy below a threshold, sell above one.
    fn run_n(&self, assistant: &Assistant, instrument: &Instrument) -> Result<(), AgentError> {
        let price = instrument.price;
        let buy_threshold = setting_f64(&assistant.settings, "buy_threshold", 0.0)?;
        let sell_threshold = setting_f64(&assistant.settings, "sell_threshold", f64::INFINITY)?;
        let trade_pct = setting_f64(&assistant.settings, "trade_percentage", 10.0)? / 100.0;

        if buy_threshold > 0.0 && price <= buy_threshold {
            self.execute_buy(assistant, instrument, trade_pct)?;
        }
        if sell_threshold.is_finite() && price >= sell_threshold {
            self.execute_sell(assistant, instrument, trade_pct)?;
        }
        Ok(())
    }

    /// R tier: thresholds plus a short/long moving-average crossover and a
    /// stop-loss against the assistant's own average buy cost.
    fn run_r(&self, assistant: &Assistant, instrument: &Instrument) -> Result<(), AgentError> {
        let price = instrument.price;
        let buy_threshold = setting_f64(&assistant.settings, "buy_threshold", 0.0)?;
        let sell_threshold = setting_f64(&assistant.settings, "sell_threshold", f64::INFINITY)?;
        let stop_loss = setting_f64(&assistant.settings, "stop_loss", 0.0)?;
        let ma_short = setting_usize(&assistant.settings, "ma_short", 5)?;
        let ma_long = setting_usize(&assistant.settings, "ma_long", 20)?;
        let mut trade_pct = setting_f64(&assistant.settings, "trade_percentage", 15.0)? / 100.0;

        let closes = self.exchange().history().closes(instrument.id, 30);
        if closes.len() < ma_short.max(ma_long) || closes.len() < 5 {
            return Ok(());
        }
        let (Some(short), Some(long)) = (sma(&closes, ma_short), sma(&closes, ma_long)) else {
            return Ok(());
        };
        let prev_close = closes[closes.len() - 2];
        let week_ago = closes[closes.len() - 5];

        // Crossover fires on the close that carried the short leg through
        // the long one.
        let crossover_buy = short > long && prev_close <= long;
        let crossover_sell = short < long && prev_close >= long;

        if (buy_threshold > 0.0 && price <= buy_threshold) || crossover_buy {
            if short < week_ago {
                trade_pct *= 1.5; // leaning into weakness
            }
            self.execute_buy(assistant, instrument, trade_pct)?;
        }
        if (sell_threshold.is_finite() && price >= sell_threshold) || crossover_sell {
            if short > week_ago {
                trade_pct *= 0.8;
            }
            self.execute_sell(assistant, instrument, trade_pct)?;
        }

        if stop_loss > 0.0 {
            if let Some(avg_cost) = self.avg_buy_cost(assistant.id, &instrument.ticker) {
                if price <= avg_cost * (1.0 - stop_loss / 100.0) {
                    self.execute_sell(assistant, instrument, 1.0)?;
                }
            }
        }
        Ok(())
    }

    /// SR tier: majority vote of RSI, MACD histogram and reversal patterns,
    /// with volatility damping and risk/reward sizing.
    fn run_sr(&self, assistant: &Assistant, instrument: &Instrument) -> Result<(), AgentError> {
        let use_rsi = setting_bool(&assistant.settings, "use_rsi", true);
        let use_macd = setting_bool(&assistant.settings, "use_macd", true);
        let use_pattern = setting_bool(&assistant.settings, "use_pattern", true);
        let rsi_buy = setting_f64(&assistant.settings, "rsi_buy", 30.0)?;
        let rsi_sell = setting_f64(&assistant.settings, "rsi_sell", 70.0)?;
        let risk_reward = setting_f64(&assistant.settings, "risk_reward", 2.0)?;
        let mut trade_pct = setting_f64(&assistant.settings, "trade_percentage", 20.0)? / 100.0;

        let closes = self.exchange().history().closes(instrument.id, 60);
        if closes.len() < 30 {
            return Ok(());
        }

        let mut buy_signals = 0usize;
        let mut sell_signals = 0usize;
        let mut total_signals = 0usize;

        if use_rsi {
            total_signals += 1;
            let value = rsi(&closes, 14).unwrap_or(50.0);
            if value <= rsi_buy {
                buy_signals += 1;
            } else if value >= rsi_sell {
                sell_signals += 1;
            }
        }
        if use_macd {
            total_signals += 1;
            let histogram = macd_histogram(&closes).unwrap_or(0.0);
            if histogram > 0.0 {
                buy_signals += 1;
            } else if histogram < 0.0 {
                sell_signals += 1;
            }
        }
        if use_pattern {
            total_signals += 1;
            if bullish_reversal(&closes) {
                buy_signals += 1;
            } else if bearish_reversal(&closes) {
                sell_signals += 1;
            }
        }
        if total_signals == 0 {
            return Ok(());
        }

        if realized_volatility(&closes).unwrap_or(0.0) > 0.02 {
            trade_pct *= 0.8;
        }

        let majority = total_signals as f64 / 2.0;
        if buy_signals as f64 > majority {
            let strength = buy_signals as f64 / total_signals as f64;
            self.execute_buy(assistant, instrument, trade_pct * strength * (1.0 + risk_reward))?;
        }
        if sell_signals as f64 > majority {
            let strength = sell_signals as f64 / total_signals as f64;
            self.execute_sell(assistant, instrument, trade_pct * strength)?;
        }
        Ok(())
    }

    /// SSR tier: multi-horizon trend, anomaly detection, sentiment, a lucky
    /// trade bonus and portfolio rebalancing toward a risk-scaled target.
    fn run_ssr<R: Rng>(
        &self,
        assistant: &Assistant,
        instrument: &Instrument,
        rng: &mut R,
    ) -> Result<(), AgentError> {
        let price = instrument.price;
        let strategy_type = assistant
            .settings
            .get("strategy_type")
            .map(String::as_str)
            .unwrap_or("balanced")
            .to_string();
        let mut risk_level = setting_f64(&assistant.settings, "risk_level", 0.5)?;
        let use_sentiment = setting_bool(&assistant.settings, "use_sentiment", true);
        let auto_balance = setting_bool(&assistant.settings, "auto_balance", true);
        let mut trade_pct = setting_f64(&assistant.settings, "trade_percentage", 25.0)? / 100.0;

        let closes = self.exchange().history().closes(instrument.id, 90);
        if closes.len() < 30 {
            return Ok(());
        }

        let Some(ma_short) = tail_mean(&closes, 5) else {
            return Ok(());
        };
        let Some(ma_medium) = tail_mean(&closes, 20) else {
            return Ok(());
        };
        let Some(ma_long) = tail_mean(&closes, 50) else {
            return Ok(());
        };
        let volatility = realized_volatility(&closes).unwrap_or(0.0);

        let monthly_avg = tail_mean(&closes, 30).unwrap_or(price);
        let anomaly = monthly_avg > 0.0 && ((ma_short - monthly_avg) / monthly_avg).abs() > 0.15;

        let sentiment = if use_sentiment {
            rng.random_range(-1.0..=1.0)
        } else {
            0.0
        };

        let lucky_trade = rng.random_range(0.0..1.0) < 0.05;
        let luck_bonus = if lucky_trade {
            rng.random_range(0.1..=0.5)
        } else {
            0.0
        };

        match strategy_type.as_str() {
            "aggressive" => {
                trade_pct *= 1.5;
                risk_level *= 1.3;
            }
            "conservative" => {
                trade_pct *= 0.7;
                risk_level *= 0.7;
            }
            _ => {}
        }

        let mut buy_score: f64 = 0.0;
        let mut sell_score: f64 = 0.0;

        if price < ma_short && ma_short < ma_medium {
            buy_score += 0.2;
        } else if price > ma_short && ma_short > ma_medium {
            sell_score += 0.2;
        }

        if ma_short > ma_medium && ma_medium > ma_long {
            buy_score += 0.15; // uptrend
        } else if ma_short < ma_medium && ma_medium < ma_long {
            sell_score += 0.15; // downtrend
        }

        if anomaly {
            if price < monthly_avg {
                buy_score += 0.3;
            } else {
                sell_score += 0.3;
            }
        }

        buy_score += sentiment * 0.2;
        sell_score -= sentiment * 0.2;

        if volatility > 0.03 {
            trade_pct *= (1.0 - volatility * 5.0).max(0.0);
        }

        if auto_balance {
            let portfolio = self.exchange().registry().portfolio_value(assistant.owner);
            if portfolio > 0.0 {
                let held = self
                    .exchange()
                    .holdings()
                    .shares(assistant.owner, instrument.id) as f64
                    * price;
                let target = 0.2 * risk_level;
                let weight = held / portfolio;
                if weight < target * 0.8 {
                    buy_score += 0.25;
                } else if weight > target * 1.2 {
                    sell_score += 0.25;
                }
            }
        }

        let lucky_direction = rng.random_range(0.0..1.0);
        if buy_score > 0.5 || (lucky_trade && lucky_direction < 0.7) {
            let pct = trade_pct * (1.0 + buy_score * risk_level) * (1.0 + luck_bonus);
            self.execute_buy(assistant, instrument, pct)?;
        }
        if sell_score > 0.5 || (lucky_trade && lucky_direction >= 0.7) {
            let pct = trade_pct * (1.0 + sell_score * risk_level) * (1.0 + luck_bonus);
            self.execute_sell(assistant, instrument, pct)?;
        }
        Ok(())
    }

    /// Spend `pct` of the owner's balance at the current price.
    fn execute_buy(
        &self,
        assistant: &Assistant,
        instrument: &Instrument,
        pct: f64,
    ) -> Result<(), AgentError> {
        let balance = self.exchange().ledger().balance(assistant.owner);
        if balance <= 0 {
            return Ok(());
        }
        let budget = balance as f64 * pct.clamp(0.0, 1.0);
        if budget < instrument.price {
            return Ok(()); // cannot afford one share
        }
        let shares = (budget / instrument.price).floor() as u64;
        if shares == 0 {
            return Ok(());
        }

        let placement = self.exchange().place_order(
            assistant.owner,
            &instrument.ticker,
            Side::Buy,
            shares,
            instrument.price,
        )?;
        debug!("Assistant {}: {}", assistant.id, placement);

        self.record_trade(
            assistant.id,
            AssistantTrade {
                ticker: instrument.ticker.clone(),
                side: Side::Buy,
                shares,
                price: instrument.price,
                total_amount: shares as f64 * instrument.price,
                profit_loss: 0.0,
                at: current_time_millis(),
            },
        );
        Ok(())
    }

    /// Sell `pct` of the owner's holding at the current price, at least one
    /// share.
    fn execute_sell(
        &self,
        assistant: &Assistant,
        instrument: &Instrument,
        pct: f64,
    ) -> Result<(), AgentError> {
        let held = self
            .exchange()
            .holdings()
            .shares(assistant.owner, instrument.id);
        if held == 0 {
            return Ok(());
        }
        let shares = ((held as f64 * pct.clamp(0.0, 1.0)) as u64).clamp(1, held);

        let placement = self.exchange().place_order(
            assistant.owner,
            &instrument.ticker,
            Side::Sell,
            shares,
            instrument.price,
        )?;
        debug!("Assistant {}: {}", assistant.id, placement);

        let cost_basis = self
            .avg_buy_cost(assistant.id, &instrument.ticker)
            .unwrap_or(instrument.price);
        self.record_trade(
            assistant.id,
            AssistantTrade {
                ticker: instrument.ticker.clone(),
                side: Side::Sell,
                shares,
                price: instrument.price,
                total_amount: shares as f64 * instrument.price,
                profit_loss: (instrument.price - cost_basis) * shares as f64,
                at: current_time_millis(),
            },
        );
        Ok(())
    }
}
