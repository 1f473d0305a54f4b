// demos/src/bin/market_simulation.rs
//
// A compressed day on the exchange: virtual traders poll every few
// "minutes", assistants and the price random walk tick every "hour", all
// against one shared exchange. Wall-clock time is scaled down so the whole
// run takes a few seconds.

use exchange_rs::agents::{AssistantManager, VirtualTraderManager};
use exchange_rs::{AccountId, Exchange, MarketConfig, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::info;

const ISSUER: AccountId = AccountId(1001);
const PLAYER: AccountId = AccountId(1002);

/// One simulated minute of market time.
const SIM_MINUTE: Duration = Duration::from_millis(10);
const SIM_HOURS: u64 = 8;

fn main() {
    tracing_subscriber::fmt::init();
    info!("Market simulation: {} simulated hours", SIM_HOURS);

    let exchange = Arc::new(Exchange::new(MarketConfig::default()));
    setup_market(&exchange);

    let traders = Arc::new(VirtualTraderManager::new(Arc::clone(&exchange)));
    let assistants = Arc::new(AssistantManager::new(Arc::clone(&exchange)));
    seed_agents(&traders, &assistants);

    let stop = Arc::new(AtomicBool::new(false));

    // Virtual traders poll on a randomized 3-10 minute interval.
    let trader_handle = {
        let traders = Arc::clone(&traders);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut rng = StdRng::from_os_rng();
            while !stop.load(Ordering::Relaxed) {
                traders.run_cycle(&mut rng);
                let minutes = rng.random_range(3..=10);
                thread::sleep(SIM_MINUTE * minutes);
            }
        })
    };

    // Assistants and the price random walk tick hourly.
    let hourly_handle = {
        let exchange = Arc::clone(&exchange);
        let assistants = Arc::clone(&assistants);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut rng = StdRng::from_os_rng();
            while !stop.load(Ordering::Relaxed) {
                thread::sleep(SIM_MINUTE * 60);
                exchange.run_random_walk(&mut rng);
                assistants.run_cycle(&mut rng);
            }
        })
    };

    thread::sleep(SIM_MINUTE * 60 * SIM_HOURS as u32);
    stop.store(true, Ordering::Relaxed);
    let _ = trader_handle.join();
    let _ = hourly_handle.join();

    report(&exchange, &traders);
}

fn setup_market(exchange: &Exchange) {
    let _ = exchange
        .ledger()
        .apply_delta(ISSUER, 10_000_000, "Opening balance");
    let _ = exchange
        .ledger()
        .apply_delta(PLAYER, 200_000, "Opening balance");

    for (ticker, name, price, shares) in [
        ("ACME", "Acme Corp", 100.0, 50_000),
        ("GLOB", "Globex", 40.0, 100_000),
        ("INIT", "Initech", 250.0, 20_000),
    ] {
        match exchange.issue(ISSUER, ticker, name, price, shares, "") {
            Ok(_) => info!("Listed {} at {}", ticker, price),
            Err(e) => info!("Listing {} failed: {}", ticker, e),
        }
    }

    // The issuer quotes asks so agents have liquidity to trade against.
    for ticker in ["ACME", "GLOB", "INIT"] {
        if let Some(info) = exchange.registry().get_info(ticker) {
            let _ = exchange.place_order(ISSUER, ticker, Side::Sell, 5_000, info.price);
        }
    }
}

fn seed_agents(traders: &VirtualTraderManager, assistants: &AssistantManager) {
    let mut rng = StdRng::from_os_rng();

    for i in 1..=15 {
        traders.create_trader(&format!("Virtual trader {:04}", i), None, None, None, &mut rng);
    }
    info!("Created {} virtual traders", traders.traders().len());

    match assistants.draw(PLAYER, &mut rng) {
        Ok(assistant) => {
            info!(
                "Player drew a {} assistant: {}",
                assistant.rarity, assistant.name
            );
            let _ = assistants.set_watched(assistant.id, PLAYER, &["ACME"]);
            let mut settings = std::collections::HashMap::new();
            settings.insert("buy_threshold".to_string(), "102".to_string());
            settings.insert("sell_threshold".to_string(), "118".to_string());
            let _ = assistants.set_settings(assistant.id, PLAYER, settings);
            let _ = assistants.toggle_active(assistant.id, PLAYER);
        }
        Err(e) => info!("Assistant draw failed: {}", e),
    }
}

fn report(exchange: &Exchange, traders: &VirtualTraderManager) {
    info!("\nSimulation finished.");

    for instrument in exchange.registry().list(0, 10) {
        let trades = exchange
            .recent_trades(&instrument.ticker, 10_000)
            .map(|t| t.len())
            .unwrap_or(0);
        info!(
            "{}: price {:.2} ({:+.2}% since issue), {} trades",
            instrument.ticker,
            instrument.price,
            instrument.change_since_issue() * 100.0,
            trades
        );
    }

    let stats = traders.stats();
    info!(
        "Traders: {} active, {} cash, {:.0} in holdings",
        stats.active, stats.total_cash, stats.total_holdings_value
    );

    info!(
        "Conservation check: {} coins in accounts + {} escrowed",
        exchange.ledger().total_coins(),
        exchange.escrowed_cash_total()
    );
}
