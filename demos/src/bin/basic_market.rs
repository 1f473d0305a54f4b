// demos/src/bin/basic_market.rs

use exchange_rs::{AccountId, Exchange, MarketConfig, Side};
use tracing::info;

const ALICE: AccountId = AccountId(1001);
const BOB: AccountId = AccountId(1002);

fn main() {
    tracing_subscriber::fmt::init();
    info!("Basic Market Example");

    let exchange = Exchange::new(MarketConfig::default());

    // Seed two accounts with spending money.
    seed_accounts(&exchange);

    // Alice issues an instrument and pays the 5% fee.
    issue_instrument(&exchange);

    // Orders: escrow, resting, matching at the midpoint.
    demo_order_flow(&exchange);

    // Cancellation returns escrow.
    demo_cancellation(&exchange);

    // Dividends reach every holder pro rata.
    demo_dividend(&exchange);

    // Market data: depth snapshot, movers, trade tape.
    display_market_state(&exchange);
}

fn seed_accounts(exchange: &Exchange) {
    for (account, amount) in [(ALICE, 500_000), (BOB, 100_000)] {
        match exchange.ledger().apply_delta(account, amount, "Opening balance") {
            Ok(balance) => info!("Seeded account {} with {}", account, balance),
            Err(e) => info!("Failed to seed account {}: {}", account, e),
        }
    }
}

fn issue_instrument(exchange: &Exchange) {
    match exchange.issue(ALICE, "ACME", "Acme Corp", 100.0, 10_000, "Widgets and anvils") {
        Ok(id) => info!("Issued ACME as instrument {}", id),
        Err(e) => info!("Issue failed: {}", e),
    }
    info!(
        "Alice's balance after the issue fee: {}",
        exchange.ledger().balance(ALICE)
    );
}

fn demo_order_flow(exchange: &Exchange) {
    info!("\nPlacing orders...");

    // Bob bids above the market, Alice asks below it: they cross and the
    // trade prints at the midpoint, refunding Bob the difference.
    match exchange.place_order(BOB, "ACME", Side::Buy, 100, 104.0) {
        Ok(placement) => info!("Bob: {}", placement),
        Err(e) => info!("Bob's bid failed: {}", e),
    }
    match exchange.place_order(ALICE, "ACME", Side::Sell, 100, 96.0) {
        Ok(placement) => {
            info!("Alice: {}", placement);
            for trade in &placement.trades {
                info!(
                    "  trade: {} shares at {:.2} ({} coins to the seller)",
                    trade.shares, trade.price_per_share, trade.total_amount
                );
            }
        }
        Err(e) => info!("Alice's ask failed: {}", e),
    }

    info!(
        "Bob now holds {} ACME and {} coins",
        holdings_of(exchange, BOB),
        exchange.ledger().balance(BOB)
    );
}

fn demo_cancellation(exchange: &Exchange) {
    info!("\nCancellation...");

    let placement = match exchange.place_order(BOB, "ACME", Side::Buy, 50, 95.0) {
        Ok(placement) => placement,
        Err(e) => {
            info!("Placement failed: {}", e);
            return;
        }
    };
    info!("Bob rests a bid, escrowed: {}", exchange.escrowed_cash_total());

    match exchange.cancel_order(BOB, placement.order_id) {
        Ok(order) => info!("Canceled order {}, escrow returned", order.id),
        Err(e) => info!("Cancel failed: {}", e),
    }
    info!("Escrow outstanding: {}", exchange.escrowed_cash_total());
}

fn demo_dividend(exchange: &Exchange) {
    info!("\nDividend...");
    match exchange.dividends().pay(ALICE, "ACME", 0.5) {
        Ok(record) => info!(
            "Paid {} per share, {} coins total",
            record.amount_per_share, record.total_paid
        ),
        Err(e) => info!("Dividend failed: {}", e),
    }
}

fn display_market_state(exchange: &Exchange) {
    info!("\nMarket state:");

    match exchange.depth_snapshot("ACME", 5) {
        Ok(snapshot) => {
            info!("Best bid: {:?}", snapshot.best_bid());
            info!("Best ask: {:?}", snapshot.best_ask());
            match snapshot.to_json() {
                Ok(json) => info!("Snapshot: {}", json),
                Err(e) => info!("Snapshot serialization failed: {}", e),
            }
        }
        Err(e) => info!("Snapshot failed: {}", e),
    }

    for instrument in exchange.registry().top_movers(5) {
        info!(
            "Mover {}: {:.2} ({:+.2}% vs last)",
            instrument.ticker,
            instrument.price,
            instrument.change_ratio().unwrap_or(0.0) * 100.0
        );
    }

    match exchange.recent_trades("ACME", 5) {
        Ok(trades) => info!("Recent trades: {}", trades.len()),
        Err(e) => info!("Trade tape failed: {}", e),
    }
}

fn holdings_of(exchange: &Exchange, account: AccountId) -> u64 {
    exchange
        .registry()
        .get_info("ACME")
        .map(|info| exchange.holdings().shares(account, info.id))
        .unwrap_or(0)
}
