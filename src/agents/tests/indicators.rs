//! Unit tests for indicator math.

use crate::agents::indicators::{
    bearish_reversal, bullish_reversal, macd_histogram, period_return, realized_volatility, rsi,
    sma, tail_mean,
};

#[test]
fn test_sma_needs_full_window() {
    let closes = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(sma(&closes, 2), Some(3.5));
    assert_eq!(sma(&closes, 4), Some(2.5));
    assert_eq!(sma(&closes, 5), None);
    assert_eq!(sma(&closes, 0), None);
}

#[test]
fn test_tail_mean_shrinks_window() {
    let closes = [2.0, 4.0];
    assert_eq!(tail_mean(&closes, 10), Some(3.0));
    assert_eq!(tail_mean(&closes, 1), Some(4.0));
    assert_eq!(tail_mean(&[], 5), None);
}

#[test]
fn test_period_return() {
    let closes = [100.0, 101.0, 99.0, 102.0, 106.0];
    // last / first-of-window - 1 over 5 closes.
    let change = period_return(&closes, 5).unwrap();
    assert!((change - 0.06).abs() < 1e-12, "got {}", change);
    assert_eq!(period_return(&closes, 6), None);
}

#[test]
fn test_rsi_extremes() {
    // Monotonic rise: no losses, RSI pegs at 100.
    let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    assert_eq!(rsi(&rising, 14), Some(100.0));

    // Monotonic fall: no gains, RSI is 0.
    let falling: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
    assert_eq!(rsi(&falling, 14), Some(0.0));

    assert_eq!(rsi(&rising[..10], 14), None);
}

#[test]
fn test_rsi_balanced_is_midscale() {
    // Alternating equal up/down moves: average gain equals average loss.
    let mut closes = vec![100.0];
    for i in 0..20 {
        let last = *closes.last().unwrap();
        closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
    }
    let value = rsi(&closes, 14).unwrap();
    assert!((value - 50.0).abs() < 4.0, "got {}", value);
}

#[test]
fn test_macd_histogram_sign_follows_momentum() {
    // Accelerating rise: short mean above long mean.
    let rising: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    let histogram = macd_histogram(&rising).unwrap();
    let short = sma(&rising, 12).unwrap();
    let long = sma(&rising, 26).unwrap();
    assert!(short > long);
    // Histogram is macd minus the mean recent change.
    let expected_macd = short - long;
    assert!(histogram < expected_macd);

    assert_eq!(macd_histogram(&rising[..20]), None);
}

#[test]
fn test_realized_volatility() {
    let flat = [100.0; 10];
    assert_eq!(realized_volatility(&flat), Some(0.0));

    // ±2% alternating moves — mean absolute move about 2%.
    let mut choppy = vec![100.0];
    for i in 0..10 {
        let last = *choppy.last().unwrap();
        choppy.push(if i % 2 == 0 { last * 1.02 } else { last * 0.98 });
    }
    let vol = realized_volatility(&choppy).unwrap();
    assert!((vol - 0.02).abs() < 0.001, "got {}", vol);

    assert_eq!(realized_volatility(&[100.0]), None);
}

#[test]
fn test_reversal_patterns() {
    // Three falling closes then a two-step recovery.
    let trough = [105.0, 104.0, 103.0, 104.5, 106.0];
    assert!(bullish_reversal(&trough));
    assert!(!bearish_reversal(&trough));

    let peak = [95.0, 96.0, 97.0, 95.5, 94.0];
    assert!(bearish_reversal(&peak));
    assert!(!bullish_reversal(&peak));

    assert!(!bullish_reversal(&[1.0, 2.0, 3.0]));
}
