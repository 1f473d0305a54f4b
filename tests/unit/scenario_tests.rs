//! End-to-end scenarios through the public API.

use exchange_rs::{AccountId, Exchange, MarketConfig, OrderStatus, Side};

const ISSUER: AccountId = AccountId(100);
const BUYER: AccountId = AccountId(200);

fn setup_market() -> Exchange {
    let exchange = Exchange::new(MarketConfig::default());
    exchange
        .ledger()
        .apply_delta(ISSUER, 100_000, "seed")
        .unwrap();
    exchange
        .ledger()
        .apply_delta(BUYER, 10_000, "seed")
        .unwrap();
    exchange
        .issue(ISSUER, "ACME", "Acme Corp", 100.0, 1_000, "widgets")
        .unwrap();
    exchange
}

#[test]
fn scenario_escrow_then_full_match() {
    let exchange = setup_market();

    // Buy 10 @ 100: 1000 escrowed immediately.
    let buy = exchange
        .place_order(BUYER, "ACME", Side::Buy, 10, 100.0)
        .unwrap();
    assert_eq!(exchange.ledger().balance(BUYER), 9_000);

    // Issuer sells 10 @ 100: trade at 100, both orders complete.
    let sell = exchange
        .place_order(ISSUER, "ACME", Side::Sell, 10, 100.0)
        .unwrap();
    assert_eq!(sell.trades.len(), 1);
    assert_eq!(sell.trades[0].price_per_share, 100.0);

    let acme = exchange.registry().get_info("ACME").unwrap();
    assert_eq!(exchange.holdings().shares(BUYER, acme.id), 10);
    assert_eq!(exchange.holdings().shares(ISSUER, acme.id), 990);
    assert_eq!(acme.price, 100.0);
    assert_eq!(
        exchange.order(buy.order_id).unwrap().status,
        OrderStatus::Completed
    );

    // The issuer received the proceeds: 95 000 after the issue fee + 1000.
    assert_eq!(exchange.ledger().balance(ISSUER), 96_000);
}

#[test]
fn scenario_midpoint_trade_with_refund() {
    let exchange = setup_market();

    exchange
        .place_order(ISSUER, "ACME", Side::Sell, 5, 96.0)
        .unwrap();
    let buy = exchange
        .place_order(BUYER, "ACME", Side::Buy, 5, 104.0)
        .unwrap();

    // Midpoint of 104 and 96 is 100; the buyer recovers 5 x (104 - 100).
    assert_eq!(buy.trades[0].price_per_share, 100.0);
    assert_eq!(exchange.ledger().balance(BUYER), 10_000 - 500);
    assert_eq!(exchange.registry().get_info("ACME").unwrap().price, 100.0);
}

#[test]
fn scenario_dividend_pro_rata() {
    let exchange = setup_market();
    let acme = exchange.registry().get_info("ACME").unwrap();

    // Move 300 + 100 shares to two outside holders via the book.
    let carol = AccountId(300);
    exchange.ledger().apply_delta(carol, 50_000, "seed").unwrap();
    exchange
        .place_order(BUYER, "ACME", Side::Buy, 30, 100.0)
        .unwrap();
    exchange
        .place_order(carol, "ACME", Side::Buy, 10, 100.0)
        .unwrap();
    exchange
        .place_order(ISSUER, "ACME", Side::Sell, 40, 100.0)
        .unwrap();

    assert_eq!(exchange.holdings().shares(BUYER, acme.id), 30);
    assert_eq!(exchange.holdings().shares(carol, acme.id), 10);

    let buyer_before = exchange.ledger().balance(BUYER);
    let carol_before = exchange.ledger().balance(carol);
    let issuer_before = exchange.ledger().balance(ISSUER);

    let record = exchange.dividends().pay(ISSUER, "ACME", 1.0).unwrap();
    assert_eq!(record.total_paid, 1_000);

    assert_eq!(exchange.ledger().balance(BUYER), buyer_before + 30);
    assert_eq!(exchange.ledger().balance(carol), carol_before + 10);
    // Issuer pays 1000 and collects 960 on its retained shares.
    assert_eq!(exchange.ledger().balance(ISSUER), issuer_before - 1_000 + 960);
}

#[test]
fn scenario_cancel_is_terminal() {
    let exchange = setup_market();

    let buy = exchange
        .place_order(BUYER, "ACME", Side::Buy, 10, 95.0)
        .unwrap();
    exchange.cancel_order(BUYER, buy.order_id).unwrap();
    assert_eq!(exchange.ledger().balance(BUYER), 10_000);

    // Second cancel fails with no further refund.
    assert!(exchange.cancel_order(BUYER, buy.order_id).is_err());
    assert_eq!(exchange.ledger().balance(BUYER), 10_000);

    // The canceled order no longer matches.
    let sell = exchange
        .place_order(ISSUER, "ACME", Side::Sell, 10, 95.0)
        .unwrap();
    assert!(!sell.matched());
}

#[test]
fn scenario_band_rejection_has_no_side_effects() {
    let exchange = setup_market();

    let result = exchange.place_order(BUYER, "ACME", Side::Buy, 5, 111.0);
    assert!(result.is_err());
    assert_eq!(exchange.ledger().balance(BUYER), 10_000);
    assert!(exchange.orders_for(BUYER, false).is_empty());
    assert_eq!(exchange.escrowed_cash_total(), 0);
}

#[test]
fn scenario_market_data_surfaces() {
    let exchange = setup_market();

    exchange
        .place_order(BUYER, "ACME", Side::Buy, 10, 98.0)
        .unwrap();
    exchange
        .place_order(ISSUER, "ACME", Side::Sell, 10, 104.0)
        .unwrap();

    let snapshot = exchange.depth_snapshot("ACME", 5).unwrap();
    assert_eq!(snapshot.best_bid(), Some((98.0, 10)));
    assert_eq!(snapshot.best_ask(), Some((104.0, 10)));
    assert_eq!(snapshot.mid_price(), Some(101.0));

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"ACME\""));

    // One listed instrument, no movers until a price change lands.
    assert_eq!(exchange.registry().list(0, 10).len(), 1);
    let movers = exchange.registry().top_movers(10);
    assert_eq!(movers.len(), 1);
}

#[test]
fn scenario_trade_history_is_recorded() {
    let exchange = setup_market();

    exchange
        .place_order(BUYER, "ACME", Side::Buy, 10, 100.0)
        .unwrap();
    exchange
        .place_order(ISSUER, "ACME", Side::Sell, 4, 100.0)
        .unwrap();
    exchange
        .place_order(ISSUER, "ACME", Side::Sell, 6, 100.0)
        .unwrap();

    let trades = exchange.recent_trades("ACME", 10).unwrap();
    assert_eq!(trades.len(), 2);
    // Newest first.
    assert_eq!(trades[0].shares, 6);
    assert_eq!(trades[1].shares, 4);
    assert!(trades.iter().all(|t| t.seller == ISSUER && t.buyer == BUYER));
}
