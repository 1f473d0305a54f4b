//! Unit tests for price-time priority selection inside a book.

use crate::ledger::AccountId;
use crate::market::InstrumentId;
use crate::orderbook::book::InstrumentBook;
use crate::orderbook::{Order, OrderId, OrderStatus, Side};

const ACME: InstrumentId = InstrumentId(1);

fn setup_book() -> InstrumentBook {
    InstrumentBook::new(ACME)
}

fn add_order(book: &mut InstrumentBook, side: Side, price: f64, shares: u64) -> OrderId {
    let seq = book.next_seq();
    let order = Order {
        id: OrderId::new(),
        account: AccountId(1),
        instrument: ACME,
        side,
        shares,
        limit_price: price,
        created_at: 0,
        seq,
        status: OrderStatus::Active,
        escrow_remaining: 0,
        reserved_shares: 0,
    };
    let id = order.id;
    book.insert(order);
    id
}

#[test]
fn test_best_bid_is_highest_price() {
    let mut book = setup_book();
    add_order(&mut book, Side::Buy, 98.0, 10);
    let best = add_order(&mut book, Side::Buy, 102.0, 10);
    add_order(&mut book, Side::Buy, 100.0, 10);

    assert_eq!(book.best_active(Side::Buy), Some(best));
}

#[test]
fn test_best_ask_is_lowest_price() {
    let mut book = setup_book();
    add_order(&mut book, Side::Sell, 98.0, 10);
    let best = add_order(&mut book, Side::Sell, 96.0, 10);
    add_order(&mut book, Side::Sell, 100.0, 10);

    assert_eq!(book.best_active(Side::Sell), Some(best));
}

#[test]
fn test_same_price_prefers_earlier_arrival() {
    let mut book = setup_book();
    let first = add_order(&mut book, Side::Buy, 100.0, 10);
    add_order(&mut book, Side::Buy, 100.0, 10);

    assert_eq!(book.best_active(Side::Buy), Some(first));

    let mut book = setup_book();
    let first = add_order(&mut book, Side::Sell, 100.0, 10);
    add_order(&mut book, Side::Sell, 100.0, 10);

    assert_eq!(book.best_active(Side::Sell), Some(first));
}

#[test]
fn test_terminal_orders_are_ignored() {
    let mut book = setup_book();
    let completed = add_order(&mut book, Side::Buy, 110.0, 10);
    let canceled = add_order(&mut book, Side::Buy, 105.0, 10);
    let active = add_order(&mut book, Side::Buy, 100.0, 10);

    book.order_mut(completed).unwrap().status = OrderStatus::Completed;
    book.order_mut(canceled).unwrap().status = OrderStatus::Canceled;

    assert_eq!(book.best_active(Side::Buy), Some(active));
}

#[test]
fn test_empty_side_has_no_best() {
    let mut book = setup_book();
    add_order(&mut book, Side::Buy, 100.0, 10);
    assert_eq!(book.best_active(Side::Sell), None);
}

#[test]
fn test_active_orders_sorted_best_first() {
    let mut book = setup_book();
    let mid = add_order(&mut book, Side::Sell, 98.0, 10);
    let best = add_order(&mut book, Side::Sell, 96.0, 10);
    let worst = add_order(&mut book, Side::Sell, 100.0, 10);

    let sorted: Vec<_> = book
        .active_orders(Side::Sell)
        .iter()
        .map(|order| order.id)
        .collect();
    assert_eq!(sorted, vec![best, mid, worst]);
}
