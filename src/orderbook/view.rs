//! Display aggregation
//!
//! Derives render-ready depth rows from a book at read time: optional
//! integer-floor price grouping and cumulative price×size totals. Pure
//! functions of the current ledger state; nothing here mutates a book.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Level, OrderBook, Side};

/// One display row: a level plus the running total through it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthRow {
    pub price: Decimal,
    pub size: Decimal,
    /// Cumulative price×size from the best level through this row. Asks are
    /// listed best-first too, so a mirrored display reads the same way from
    /// the worst displayed ask toward the best.
    pub total: Decimal,
}

/// Snapshot of both sides of one token's book, ready for the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthView {
    pub asset_id: String,
    pub timestamp: String,
    /// Best first (descending by price)
    pub bids: Vec<DepthRow>,
    /// Best first (ascending by price)
    pub asks: Vec<DepthRow>,
}

impl DepthView {
    /// Build a view of `book` showing at most `rows` levels per side.
    /// With `grouped`, levels are bucketed by the integer floor of their
    /// price, sizes summed per bucket. An empty book yields zero rows.
    pub fn of(book: &OrderBook, rows: usize, grouped: bool) -> Self {
        let mut bids = book.bids();
        let mut asks = book.asks();

        if grouped {
            bids = group_levels(bids, Side::Bid);
            asks = group_levels(asks, Side::Ask);
        }

        bids.truncate(rows);
        asks.truncate(rows);

        Self {
            asset_id: book.asset_id().to_string(),
            timestamp: book.last_timestamp().to_string(),
            bids: with_totals(&bids),
            asks: with_totals(&asks),
        }
    }
}

/// Bucket levels by the integer floor of their price, summing sizes. Each
/// bucket keeps the highest price that fell into it; output is re-sorted by
/// bucket price, best first for the given side.
fn group_levels(levels: Vec<Level>, side: Side) -> Vec<Level> {
    // Feed each bucket its highest price first. Bids already arrive
    // descending; asks arrive ascending and need flipping.
    let mut levels = levels;
    if side == Side::Ask {
        levels.reverse();
    }

    let mut buckets: BTreeMap<Decimal, Level> = BTreeMap::new();
    for level in levels {
        buckets
            .entry(level.price.floor())
            .and_modify(|bucket| bucket.size += level.size)
            .or_insert(level);
    }

    let grouped = buckets.into_values();
    match side {
        Side::Bid => grouped.rev().collect(),
        Side::Ask => grouped.collect(),
    }
}

/// Attach cumulative price×size totals over the displayed rows, best first
fn with_totals(levels: &[Level]) -> Vec<DepthRow> {
    let mut total = Decimal::ZERO;
    levels
        .iter()
        .map(|level| {
            total += level.price * level.size;
            DepthRow {
                price: level.price,
                size: level.size,
                total,
            }
        })
        .collect()
}
