//! FIFO lot matching.
//!
//! The core state machine: per (identifier, currency) group, an ordered queue
//! of open buy lots is consumed front-first by incoming sells. A sell that
//! needs less than the front lot holds splits it in place; a sell that
//! outruns the whole queue records its unmatched remainder as a single lot of
//! unknown origin.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::transaction::{Transaction, TxKind};

/// The unconsumed remainder of one buy.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenLot {
    /// Strictly positive while the lot sits in a queue.
    pub remaining_quantity: f64,
    pub unit_price: f64,
    /// `None` when the buy row's date failed to parse.
    pub acquisition_date: Option<NaiveDateTime>,
}

/// One consumption step recorded while satisfying a sell.
///
/// `cost_basis`, `acquisition_date` and `gain` travel together: all present
/// when the quantity came out of an open lot, all absent when the queue was
/// already empty and the origin is unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedLot {
    pub used_quantity: f64,
    pub cost_basis: Option<f64>,
    pub acquisition_date: Option<NaiveDateTime>,
    pub sale_price: f64,
    /// `used_quantity * (sale_price - cost_basis)`, rounded per configuration
    /// before being recorded. `None` when the cost basis is unknown.
    pub gain: Option<f64>,
}

/// One sell transaction's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleResult {
    pub date: Option<NaiveDateTime>,
    pub identifier: String,
    pub currency: String,
    pub sale_price: f64,
    pub sale_quantity: f64,
    /// Sum of the defined per-lot gains. Unknown-origin lots contribute
    /// nothing, so the total is always numeric.
    pub total_gain: f64,
    /// Matched lots in consumption order; unknown-origin quantity only ever
    /// appears as a single trailing entry.
    pub lots: Vec<MatchedLot>,
    pub extra: Vec<(String, Value)>,
}

/// Round a per-lot gain to cents, half away from zero.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-group matcher state: open lots in acquisition order.
struct LotQueue {
    round_gains: bool,
    lots: VecDeque<OpenLot>,
}

impl LotQueue {
    fn new(round_gains: bool) -> Self {
        Self {
            round_gains,
            lots: VecDeque::new(),
        }
    }

    fn buy(&mut self, tx: &Transaction) {
        self.lots.push_back(OpenLot {
            remaining_quantity: tx.quantity,
            unit_price: tx.price,
            acquisition_date: tx.date,
        });
    }

    fn sell(&mut self, tx: &Transaction) -> SaleResult {
        let mut remaining = tx.quantity;
        let mut matched: Vec<MatchedLot> = Vec::new();
        let mut total_gain = 0.0;

        while remaining > 0.0 {
            let lot = match self.lots.front_mut() {
                Some(lot) => lot,
                None => {
                    // Nothing left to draw from: the whole remainder is one
                    // matched lot of unknown origin, excluded from the total.
                    matched.push(MatchedLot {
                        used_quantity: remaining,
                        cost_basis: None,
                        acquisition_date: None,
                        sale_price: tx.price,
                        gain: None,
                    });
                    break;
                }
            };

            let used = remaining.min(lot.remaining_quantity);
            let mut gain = used * (tx.price - lot.unit_price);
            if self.round_gains {
                gain = round_cents(gain);
            }
            total_gain += gain;

            matched.push(MatchedLot {
                used_quantity: used,
                cost_basis: Some(lot.unit_price),
                acquisition_date: lot.acquisition_date,
                sale_price: tx.price,
                gain: Some(gain),
            });

            lot.remaining_quantity -= used;
            remaining -= used;

            // `used` is the min of the two, so the subtraction is exact and
            // an emptied lot lands on 0.0 rather than near it.
            if lot.remaining_quantity <= 0.0 {
                self.lots.pop_front();
            }
        }

        SaleResult {
            date: tx.date,
            identifier: tx.identifier.clone(),
            currency: tx.currency.clone(),
            sale_price: tx.price,
            sale_quantity: tx.quantity,
            total_gain,
            lots: matched,
            extra: tx.extra.clone(),
        }
    }
}

/// Run the FIFO matcher over one group's transactions, already sorted by
/// date. Returns one `SaleResult` per sell, in processing order.
pub fn match_group(transactions: &[Transaction], round_gains: bool) -> Vec<SaleResult> {
    let mut queue = LotQueue::new(round_gains);
    let mut sales: Vec<SaleResult> = Vec::new();

    for tx in transactions {
        match tx.kind {
            TxKind::Buy => queue.buy(tx),
            TxKind::Sell => sales.push(queue.sell(tx)),
            TxKind::Other => {}
        }
    }

    debug!(
        "matched {} sale(s), {} lot(s) left open",
        sales.len(),
        queue.lots.len()
    );
    sales
}
