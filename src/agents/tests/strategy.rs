//! Unit tests for the virtual-trader strategies.

use crate::agents::{TradeAction, TradeContext, TraderStrategy};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn ctx<'a>(closes: &'a [f64], price: f64, held: u64, balance: i64) -> TradeContext<'a> {
    TradeContext {
        price,
        total_shares: 1_000,
        closes,
        held_shares: held,
        balance,
        risk_level: 0.5,
        max_float_fraction: 0.005,
    }
}

#[test]
fn test_from_name() {
    assert_eq!(TraderStrategy::from_name("random"), Some(TraderStrategy::Random));
    assert_eq!(TraderStrategy::from_name(" TREND "), Some(TraderStrategy::Trend));
    assert_eq!(TraderStrategy::from_name("reverse"), Some(TraderStrategy::Reverse));
    assert_eq!(TraderStrategy::from_name("martingale"), None);
}

#[test]
fn test_trend_needs_history() {
    let mut rng = StdRng::seed_from_u64(1);
    let closes = [100.0, 101.0, 102.0, 103.0];
    let action = TraderStrategy::Trend.decide(&ctx(&closes, 103.0, 10, 100_000), &mut rng);
    assert_eq!(action, TradeAction::Hold);
}

#[test]
fn test_trend_buys_rising_market() {
    let mut rng = StdRng::seed_from_u64(1);
    // Short mean 116 vs long mean 108: comfortably past the 2% premium.
    let closes = [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 120.0, 120.0, 120.0, 120.0];

    for _ in 0..50 {
        let action = TraderStrategy::Trend.decide(&ctx(&closes, 120.0, 0, 100_000), &mut rng);
        match action {
            TradeAction::Buy { shares, price } => {
                // Float cap: 0.5% of 1000 shares.
                assert!(shares >= 1 && shares <= 5);
                assert!((price - 120.0).abs() <= 120.0 * 0.02 + 1e-9);
            }
            other => panic!("expected a buy, got {:?}", other),
        }
    }
}

#[test]
fn test_trend_sells_falling_market_only_with_holdings() {
    let mut rng = StdRng::seed_from_u64(2);
    let closes = [120.0, 120.0, 120.0, 120.0, 120.0, 120.0, 100.0, 100.0, 100.0, 100.0];

    for _ in 0..50 {
        let action = TraderStrategy::Trend.decide(&ctx(&closes, 100.0, 10, 100_000), &mut rng);
        match action {
            TradeAction::Sell { shares, price } => {
                assert!(shares >= 1 && shares <= 10);
                assert!((price - 100.0).abs() <= 100.0 * 0.02 + 1e-9);
            }
            other => panic!("expected a sell, got {:?}", other),
        }
    }

    // Flat trader cannot sell.
    let action = TraderStrategy::Trend.decide(&ctx(&closes, 100.0, 0, 100_000), &mut rng);
    assert_eq!(action, TradeAction::Hold);
}

#[test]
fn test_trend_holds_sideways_market() {
    let mut rng = StdRng::seed_from_u64(3);
    let closes = [100.0; 10];
    let action = TraderStrategy::Trend.decide(&ctx(&closes, 100.0, 10, 100_000), &mut rng);
    assert_eq!(action, TradeAction::Hold);
}

#[test]
fn test_reverse_fades_runup() {
    let mut rng = StdRng::seed_from_u64(4);
    // +6% over the 5-close window triggers a contrarian sell.
    let closes = [100.0, 101.0, 103.0, 105.0, 106.0];

    for _ in 0..50 {
        let action = TraderStrategy::Reverse.decide(&ctx(&closes, 106.0, 10, 100_000), &mut rng);
        match action {
            TradeAction::Sell { price, .. } => {
                // Sell offers are priced above the market.
                assert!(price >= 106.0 * 1.01 - 1e-9);
                assert!(price <= 106.0 * 1.04 + 1e-9);
            }
            other => panic!("expected a sell, got {:?}", other),
        }
    }
}

#[test]
fn test_reverse_buys_drop() {
    let mut rng = StdRng::seed_from_u64(5);
    let closes = [100.0, 99.0, 97.0, 95.0, 94.0];

    for _ in 0..50 {
        let action = TraderStrategy::Reverse.decide(&ctx(&closes, 94.0, 0, 100_000), &mut rng);
        match action {
            TradeAction::Buy { price, .. } => {
                // Buy bids are priced below the market.
                assert!(price <= 94.0 * 0.99 + 1e-9);
                assert!(price >= 94.0 * 0.96 - 1e-9);
            }
            other => panic!("expected a buy, got {:?}", other),
        }
    }
}

#[test]
fn test_reverse_holds_quiet_market() {
    let mut rng = StdRng::seed_from_u64(6);
    let closes = [100.0, 100.5, 101.0, 100.5, 101.5];
    let action = TraderStrategy::Reverse.decide(&ctx(&closes, 101.5, 10, 100_000), &mut rng);
    assert_eq!(action, TradeAction::Hold);
}

#[test]
fn test_random_respects_position_and_balance() {
    let mut rng = StdRng::seed_from_u64(7);
    let closes = [100.0; 5];

    // A flat trader never sells: sells flip into buys.
    for _ in 0..200 {
        let action = TraderStrategy::Random.decide(&ctx(&closes, 100.0, 0, 100_000), &mut rng);
        assert!(!matches!(action, TradeAction::Sell { .. }));
    }

    // A broke trader never buys.
    for _ in 0..200 {
        let action = TraderStrategy::Random.decide(&ctx(&closes, 100.0, 10, 50), &mut rng);
        assert!(!matches!(action, TradeAction::Buy { .. }));
    }
}

#[test]
fn test_random_buy_sizing_respects_caps() {
    let mut rng = StdRng::seed_from_u64(8);
    let closes = [100.0; 5];

    for _ in 0..200 {
        let action = TraderStrategy::Random.decide(&ctx(&closes, 100.0, 0, 100_000), &mut rng);
        if let TradeAction::Buy { shares, price } = action {
            assert!(shares >= 1 && shares <= 5); // float cap binds at 5
            assert!((price - 100.0).abs() <= 100.0 * 0.05 + 1e-9);
        }
    }
}

#[test]
fn test_random_strategy_assignment_is_uniformish() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut counts = [0usize; 3];
    for _ in 0..300 {
        match TraderStrategy::random(&mut rng) {
            TraderStrategy::Random => counts[0] += 1,
            TraderStrategy::Trend => counts[1] += 1,
            TraderStrategy::Reverse => counts[2] += 1,
        }
    }
    for count in counts {
        assert!(count > 50, "distribution skewed: {:?}", counts);
    }
}
