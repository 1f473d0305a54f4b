//! The matching pass: pairing crossed orders and settling them.
//!
//! Midpoint pricing rule: a matched pair trades at `(bid + ask) / 2`, not at
//! the resting order's price. This is a deliberate simplification carried
//! over from the system this engine models — do not "fix" it to standard
//! exchange semantics without revisiting the documented scenarios.

use super::book::InstrumentBook;
use super::error::OrderBookError;
use super::exchange::Exchange;
use super::order::{OrderId, OrderStatus, Side, Trade, TradeId};
use crate::utils::current_time_millis;
use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::{error, trace};

impl Exchange {
    /// Run one matching pass over a book: repeatedly pair the best bid with
    /// the best ask while they cross, settling each pair as it matches.
    ///
    /// The caller holds the book's mutex, so the pass sees a frozen set of
    /// competing orders. A settlement failure ends the pass; pairs settled
    /// earlier in the pass stand, and the unmatched remainder stays active.
    pub(crate) fn run_matching(&self, book: &mut InstrumentBook, today: NaiveDate) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let Some(bid_id) = book.best_active(Side::Buy) else {
                break;
            };
            let Some(ask_id) = book.best_active(Side::Sell) else {
                break;
            };

            let crossed = match (book.order(bid_id), book.order(ask_id)) {
                (Some(bid), Some(ask)) => {
                    bid.limit_price.total_cmp(&ask.limit_price) != Ordering::Less
                }
                _ => false,
            };
            if !crossed {
                break;
            }

            match self.settle_pair(book, bid_id, ask_id, today) {
                Ok(trade) => trades.push(trade),
                Err(err) => {
                    // Settled pairs stand; the rest of the pass is abandoned
                    // rather than retried against the same failing pair.
                    error!(
                        "Matching on instrument {} failed pairing {} / {}: {}",
                        book.instrument, bid_id, ask_id, err
                    );
                    break;
                }
            }
        }

        trades
    }

    /// Settle one crossed pair: move cash and shares, reduce both orders,
    /// record the trade and update the instrument price.
    fn settle_pair(
        &self,
        book: &mut InstrumentBook,
        bid_id: OrderId,
        ask_id: OrderId,
        today: NaiveDate,
    ) -> Result<Trade, OrderBookError> {
        let instrument_id = book.instrument;
        let instrument = self
            .registry()
            .get(instrument_id)
            .ok_or(OrderBookError::Market(
                crate::market::MarketError::UnknownInstrumentId(instrument_id),
            ))?;

        let (buyer, bid_limit, bid_shares, bid_escrow) = {
            let bid = book
                .order(bid_id)
                .ok_or(OrderBookError::UnknownOrder(bid_id))?;
            (bid.account, bid.limit_price, bid.shares, bid.escrow_remaining)
        };
        let (seller, ask_limit, ask_shares) = {
            let ask = book
                .order(ask_id)
                .ok_or(OrderBookError::UnknownOrder(ask_id))?;
            (ask.account, ask.limit_price, ask.shares)
        };

        let quantity = bid_shares.min(ask_shares);
        let trade_price = (bid_limit + ask_limit) / 2.0;

        // The escrow was sized to the bid limit. Release the slice covering
        // this fill — all of it on the fill that completes the order, so
        // rounding can never strand a coin — then split the release between
        // the seller's proceeds and the buyer's refund.
        let release = if quantity == bid_shares {
            bid_escrow
        } else {
            ((quantity as f64 * bid_limit).round() as i64).min(bid_escrow)
        };
        let seller_credit = ((quantity as f64 * trade_price).round() as i64).clamp(0, release);
        let buyer_refund = release - seller_credit;

        self.ledger().apply_delta(
            seller,
            seller_credit,
            format!("Sold {} {} at {:.2}", quantity, instrument.ticker, trade_price),
        )?;
        if buyer_refund > 0 {
            self.ledger().apply_delta(
                buyer,
                buyer_refund,
                format!("Escrow refund on {} trade", instrument.ticker),
            )?;
        }

        // Shares come out of the seller's reservation, not the holding.
        self.holdings().adjust(buyer, instrument_id, quantity as i64);

        {
            let bid = book
                .order_mut(bid_id)
                .ok_or(OrderBookError::UnknownOrder(bid_id))?;
            bid.shares -= quantity;
            bid.escrow_remaining -= release;
            if bid.shares == 0 {
                bid.status = OrderStatus::Completed;
            }
        }
        {
            let ask = book
                .order_mut(ask_id)
                .ok_or(OrderBookError::UnknownOrder(ask_id))?;
            ask.shares -= quantity;
            ask.reserved_shares -= quantity;
            if ask.shares == 0 {
                ask.status = OrderStatus::Completed;
            }
        }

        // Track the float when the issuer is on either side.
        if seller == instrument.issuer {
            self.registry().adjust_available(instrument_id, quantity as i64);
        } else if buyer == instrument.issuer {
            self.registry()
                .adjust_available(instrument_id, -(quantity as i64));
        }

        self.registry().apply_price(instrument_id, trade_price, today)?;

        let trade = Trade {
            id: TradeId::new(),
            instrument: instrument_id,
            seller,
            buyer,
            shares: quantity,
            price_per_share: trade_price,
            total_amount: seller_credit,
            timestamp: current_time_millis(),
        };
        trace!(
            "Trade on {}: {} shares at {:.2}, seller {} buyer {}",
            instrument.ticker, quantity, trade_price, seller, buyer
        );
        book.record_trade(trade.clone());
        Ok(trade)
    }
}
