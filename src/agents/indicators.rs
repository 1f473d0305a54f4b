//! Indicator math shared by agent strategies.
//!
//! Every function takes closes ordered oldest to newest, the shape
//! [`PriceHistory::closes`] returns. The RSI and MACD variants are the
//! simple-average approximations the assistants are specified with, not the
//! exponentially-weighted textbook forms.
//!
//! [`PriceHistory::closes`]: crate::market::PriceHistory::closes

/// Mean of the last `period` closes. `None` when fewer are available.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    Some(closes[closes.len() - period..].iter().sum::<f64>() / period as f64)
}

/// Mean of the last `period` closes, shrinking the window to what is
/// available. `None` only when there are no closes at all.
pub fn tail_mean(closes: &[f64], period: usize) -> Option<f64> {
    if closes.is_empty() || period == 0 {
        return None;
    }
    let window = period.min(closes.len());
    Some(closes[closes.len() - window..].iter().sum::<f64>() / window as f64)
}

/// Return over the last `period` closes: `last / closes[len - period] - 1`.
pub fn period_return(closes: &[f64], period: usize) -> Option<f64> {
    if period < 2 || closes.len() < period {
        return None;
    }
    let start = closes[closes.len() - period];
    if start == 0.0 {
        return None;
    }
    Some(closes[closes.len() - 1] / start - 1.0)
}

/// Relative Strength Index over the last `period` one-day changes, using
/// plain averages of gains and losses. 100 when there are no losses.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let changes: Vec<f64> = closes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let recent = &changes[changes.len() - period..];
    let avg_gain: f64 = recent.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
    let avg_loss: f64 = -recent.iter().filter(|c| **c < 0.0).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD histogram approximation: 12-close mean minus 26-close mean, less a
/// "signal" taken as the mean of the last 9 one-day changes.
pub fn macd_histogram(closes: &[f64]) -> Option<f64> {
    if closes.len() < 26 {
        return None;
    }
    let ema12 = sma(closes, 12)?;
    let ema26 = sma(closes, 26)?;
    let macd = ema12 - ema26;

    let changes: Vec<f64> = closes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let signal = changes[changes.len() - 9..].iter().sum::<f64>() / 9.0;
    Some(macd - signal)
}

/// Mean absolute one-day move over at most the last 20 changes.
pub fn realized_volatility(closes: &[f64]) -> Option<f64> {
    if closes.len() < 2 {
        return None;
    }
    let window = closes.len().min(20);
    let tail = &closes[closes.len() - window..];
    let moves: Vec<f64> = tail
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| ((pair[1] - pair[0]) / pair[0]).abs())
        .collect();
    if moves.is_empty() {
        return None;
    }
    Some(moves.iter().sum::<f64>() / moves.len() as f64)
}

/// Three-down-then-three-up reversal: falling into a trough, now rising.
pub fn bullish_reversal(closes: &[f64]) -> bool {
    let n = closes.len();
    if n < 5 {
        return false;
    }
    closes[n - 3] < closes[n - 4]
        && closes[n - 4] < closes[n - 5]
        && closes[n - 1] > closes[n - 2]
        && closes[n - 2] > closes[n - 3]
}

/// Mirror image of [`bullish_reversal`]: rising into a peak, now falling.
pub fn bearish_reversal(closes: &[f64]) -> bool {
    let n = closes.len();
    if n < 5 {
        return false;
    }
    closes[n - 3] > closes[n - 4]
        && closes[n - 4] > closes[n - 5]
        && closes[n - 1] < closes[n - 2]
        && closes[n - 2] < closes[n - 3]
}
