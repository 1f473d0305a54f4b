//! Agent families driven end-to-end against a live market.

use exchange_rs::agents::{AssistantManager, VirtualTraderManager};
use exchange_rs::{AccountId, Exchange, MarketConfig, TraderStrategy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

const ISSUER: AccountId = AccountId(100);

fn setup_market() -> Arc<Exchange> {
    let exchange = Arc::new(Exchange::new(MarketConfig::default()));
    exchange
        .ledger()
        .apply_delta(ISSUER, 10_000_000, "seed")
        .unwrap();
    for (ticker, price) in [("AAA", 50.0), ("BBB", 100.0), ("CCC", 250.0)] {
        exchange
            .issue(ISSUER, ticker, ticker, price, 10_000, "")
            .unwrap();
    }
    exchange
}

#[test]
fn virtual_traders_trade_without_breaking_invariants() {
    let exchange = setup_market();
    let manager = VirtualTraderManager::new(Arc::clone(&exchange));
    let mut rng = StdRng::seed_from_u64(11);

    for i in 0..12 {
        manager.create_trader(&format!("Bot {}", i), None, None, None, &mut rng);
    }

    let coins = exchange.ledger().total_coins() + exchange.escrowed_cash_total();
    let instruments = exchange.registry().all();

    for _ in 0..50 {
        manager.run_cycle(&mut rng);

        assert_eq!(
            exchange.ledger().total_coins() + exchange.escrowed_cash_total(),
            coins
        );
        for instrument in &instruments {
            assert_eq!(
                exchange.holdings().outstanding(instrument.id)
                    + exchange.reserved_shares_of(instrument.id),
                instrument.total_shares
            );
        }
    }

    let stats = manager.stats();
    assert_eq!(stats.total, 12);
    assert_eq!(stats.active, 12);
}

#[test]
fn traders_and_issuer_liquidity_produce_trades() {
    let exchange = setup_market();
    let manager = VirtualTraderManager::new(Arc::clone(&exchange));
    let mut rng = StdRng::seed_from_u64(13);

    // The issuer quotes asks across the book so trader bids can fill.
    for ticker in ["AAA", "BBB", "CCC"] {
        let price = exchange.registry().get_info(ticker).unwrap().price;
        exchange
            .place_order(ISSUER, ticker, exchange_rs::Side::Sell, 500, price)
            .unwrap();
    }

    for i in 0..10 {
        manager.create_trader(
            &format!("Bot {}", i),
            Some(500_000),
            Some(TraderStrategy::Random),
            Some(1.0),
            &mut rng,
        );
    }

    for _ in 0..60 {
        manager.run_cycle(&mut rng);
    }

    let trades: usize = ["AAA", "BBB", "CCC"]
        .iter()
        .map(|ticker| exchange.recent_trades(ticker, 1_000).unwrap().len())
        .sum();
    assert!(trades > 0, "no trades after 60 cycles against issuer asks");
}

#[test]
fn assistant_draw_and_cycle_through_public_api() {
    let exchange = setup_market();
    let manager = AssistantManager::new(Arc::clone(&exchange));
    let mut rng = StdRng::seed_from_u64(17);

    let owner = AccountId(500);
    exchange
        .ledger()
        .apply_delta(owner, 100_000, "seed")
        .unwrap();

    let assistant = manager.draw(owner, &mut rng).unwrap();
    assert_eq!(exchange.ledger().balance(owner), 98_000);

    // One watched ticker fits every rarity's bound.
    manager.set_watched(assistant.id, owner, &["BBB"]).unwrap();
    let mut settings = std::collections::HashMap::new();
    settings.insert("buy_threshold".to_string(), "150".to_string());
    settings.insert("trade_percentage".to_string(), "10".to_string());
    manager.set_settings(assistant.id, owner, settings).unwrap();
    manager.toggle_active(assistant.id, owner).unwrap();

    let coins = exchange.ledger().total_coins() + exchange.escrowed_cash_total();
    for _ in 0..5 {
        manager.run_cycle(&mut rng);
        assert_eq!(
            exchange.ledger().total_coins() + exchange.escrowed_cash_total(),
            coins
        );
    }
}
