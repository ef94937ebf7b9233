//! Core order book implementation
//!
//! Uses BTreeMap for sorted price level management. Price keys compare by
//! numeric value, so "0.4" and "0.40" on the wire land on the same level.

use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::collections::VecDeque;

use super::{Level, Side};
use crate::parser::{BookEvent, PriceChangeEvent, WireLevel};

/// Deltas received before the first snapshot are held here until a snapshot
/// supersedes them. The book is never synthesized from deltas alone.
const PENDING_DELTA_CAP: usize = 256;

/// Order book for a single outcome token
#[derive(Debug)]
pub struct OrderBook {
    asset_id: String,
    /// Bids sorted by price descending (highest first)
    bids: BTreeMap<Reverse<Decimal>, Decimal>,
    /// Asks sorted by price ascending (lowest first)
    asks: BTreeMap<Decimal, Decimal>,
    /// Whether a snapshot has been applied yet
    initialized: bool,
    /// Deltas that arrived ahead of the first snapshot
    pending: VecDeque<PriceChangeEvent>,
    /// Timestamp of the last applied event, as carried on the wire
    last_timestamp: String,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(asset_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            initialized: false,
            pending: VecDeque::new(),
            last_timestamp: String::new(),
        }
    }

    /// Replace the size at `price`, inserting the level if absent.
    /// A size of exactly zero removes the level instead; zero is never stored.
    pub fn upsert(&mut self, side: Side, price: Decimal, size: Decimal) {
        if size == Decimal::ZERO {
            self.remove(side, price);
            return;
        }
        match side {
            Side::Bid => {
                self.bids.insert(Reverse(price), size);
            }
            Side::Ask => {
                self.asks.insert(price, size);
            }
        }
    }

    /// Remove the level at `price` if present
    pub fn remove(&mut self, side: Side, price: Decimal) {
        match side {
            Side::Bid => {
                self.bids.remove(&Reverse(price));
            }
            Side::Ask => {
                self.asks.remove(&price);
            }
        }
    }

    /// Drop all levels on one side and install `levels` in their place
    pub fn replace_all(&mut self, side: Side, levels: &[WireLevel]) {
        match side {
            Side::Bid => {
                self.bids.clear();
                for level in levels {
                    if level.size > Decimal::ZERO {
                        self.bids.insert(Reverse(level.price), level.size);
                    }
                }
            }
            Side::Ask => {
                self.asks.clear();
                for level in levels {
                    if level.size > Decimal::ZERO {
                        self.asks.insert(level.price, level.size);
                    }
                }
            }
        }
    }

    /// Apply a full snapshot. Supersedes all prior state for this token and
    /// drops any deltas buffered ahead of it; applying the same snapshot twice
    /// yields the same book.
    pub fn apply_book(&mut self, event: &BookEvent) {
        self.replace_all(Side::Bid, &event.bids);
        self.replace_all(Side::Ask, &event.asks);
        self.last_timestamp = event.timestamp.clone();
        self.initialized = true;
        self.pending.clear();
    }

    /// Apply an ordered delta. Changes run sequentially, so a later change to
    /// the same price within one message wins.
    ///
    /// Returns false when no snapshot has arrived yet; the delta is buffered
    /// and the book stays empty until a snapshot makes it authoritative.
    pub fn apply_changes(&mut self, event: &PriceChangeEvent) -> bool {
        if !self.initialized {
            if self.pending.len() == PENDING_DELTA_CAP {
                self.pending.pop_front();
            }
            self.pending.push_back(event.clone());
            return false;
        }

        for change in &event.changes {
            self.upsert(change.side.book_side(), change.price, change.size);
        }
        self.last_timestamp = event.timestamp.clone();
        true
    }

    /// Best bid as (price, size)
    pub fn best_bid(&self) -> Option<(Decimal, Decimal)> {
        self.bids.first_key_value().map(|(Reverse(p), s)| (*p, *s))
    }

    /// Best ask as (price, size)
    pub fn best_ask(&self) -> Option<(Decimal, Decimal)> {
        self.asks.first_key_value().map(|(p, s)| (*p, *s))
    }

    /// Bid levels, best first
    pub fn bids(&self) -> Vec<Level> {
        self.bids
            .iter()
            .map(|(Reverse(price), size)| Level {
                price: *price,
                size: *size,
            })
            .collect()
    }

    /// Ask levels, best first
    pub fn asks(&self) -> Vec<Level> {
        self.asks
            .iter()
            .map(|(price, size)| Level {
                price: *price,
                size: *size,
            })
            .collect()
    }

    /// Whether a snapshot has been applied
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// True when neither side has a level. An empty book is a valid state.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn last_timestamp(&self) -> &str {
        &self.last_timestamp
    }
}
