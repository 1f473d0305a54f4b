//! Randomized conservation properties: no operation sequence may create or
//! destroy coins or shares once the market is set up.

use exchange_rs::{AccountId, Exchange, MarketConfig, OrderId, Side};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

const ISSUER: AccountId = AccountId(100);
const TRADERS: [AccountId; 3] = [AccountId(201), AccountId(202), AccountId(203)];

fn setup_market() -> Exchange {
    let exchange = Exchange::new(MarketConfig::default());
    exchange
        .ledger()
        .apply_delta(ISSUER, 1_000_000, "seed")
        .unwrap();
    for trader in TRADERS {
        exchange
            .ledger()
            .apply_delta(trader, 100_000, "seed")
            .unwrap();
    }
    exchange
        .issue(ISSUER, "AAA", "Alpha", 50.0, 2_000, "")
        .unwrap();
    exchange
        .issue(ISSUER, "BBB", "Beta", 120.0, 1_000, "")
        .unwrap();
    exchange
}

#[test]
fn random_order_flow_conserves_coins_and_shares() {
    let exchange = setup_market();
    let mut rng = StdRng::seed_from_u64(99);

    let accounts: Vec<AccountId> = TRADERS.iter().copied().chain([ISSUER]).collect();
    let tickers = ["AAA", "BBB"];
    let mut open_orders: Vec<(AccountId, OrderId)> = Vec::new();

    let coins_baseline = exchange.ledger().total_coins() + exchange.escrowed_cash_total();

    for step in 0..600 {
        let account = *accounts.choose(&mut rng).unwrap();
        let ticker = *tickers.choose(&mut rng).unwrap();
        let instrument = exchange.registry().get_info(ticker).unwrap();

        match rng.random_range(0..10) {
            // Mostly order placement, both sides, limits inside the band.
            0..=6 => {
                let side = if rng.random_bool(0.5) {
                    Side::Buy
                } else {
                    Side::Sell
                };
                let shares = rng.random_range(1..=25);
                let limit = instrument.price * rng.random_range(0.92..=1.08);
                if let Ok(placement) = exchange.place_order(account, ticker, side, shares, limit) {
                    if placement.remaining_shares > 0 {
                        open_orders.push((account, placement.order_id));
                    }
                }
            }
            // Sometimes cancel a remembered order (it may have completed
            // since — both outcomes are legal).
            7..=8 => {
                if !open_orders.is_empty() {
                    let index = rng.random_range(0..open_orders.len());
                    let (owner, order_id) = open_orders.swap_remove(index);
                    let _ = exchange.cancel_order(owner, order_id);
                }
            }
            // Occasionally the issuer pays a dividend.
            _ => {
                let _ = exchange.dividends().pay(ISSUER, ticker, 0.5);
            }
        }

        let coins_now = exchange.ledger().total_coins() + exchange.escrowed_cash_total();
        assert_eq!(coins_now, coins_baseline, "coin conservation broke at step {}", step);

        for ticker in tickers {
            let info = exchange.registry().get_info(ticker).unwrap();
            let shares_now =
                exchange.holdings().outstanding(info.id) + exchange.reserved_shares_of(info.id);
            assert_eq!(
                shares_now, info.total_shares,
                "share conservation broke at step {}",
                step
            );
        }

        // Balances can never go negative.
        for account in &accounts {
            assert!(exchange.ledger().balance(*account) >= 0);
        }
    }

    // The run actually exercised the market.
    let traded: usize = tickers
        .iter()
        .map(|ticker| exchange.recent_trades(ticker, 10_000).unwrap().len())
        .sum();
    assert!(traded > 0, "600 random steps produced no trades");
}

#[test]
fn escrow_never_leaks_after_everything_is_canceled() {
    let exchange = setup_market();
    let mut rng = StdRng::seed_from_u64(7);
    let mut placed: Vec<(AccountId, OrderId)> = Vec::new();

    for _ in 0..50 {
        let account = TRADERS[rng.random_range(0..TRADERS.len())];
        let instrument = exchange.registry().get_info("AAA").unwrap();
        // Bids far below the market never match, so they all rest.
        let limit = instrument.price * rng.random_range(0.90..=0.95);
        let shares = rng.random_range(1..=10);
        if let Ok(placement) = exchange.place_order(account, "AAA", Side::Buy, shares, limit) {
            placed.push((account, placement.order_id));
        }
    }
    assert!(exchange.escrowed_cash_total() > 0);

    for (owner, order_id) in placed {
        exchange.cancel_order(owner, order_id).unwrap();
    }

    // Every escrowed coin came back.
    assert_eq!(exchange.escrowed_cash_total(), 0);
    for trader in TRADERS {
        assert_eq!(exchange.ledger().balance(trader), 100_000);
    }
}
