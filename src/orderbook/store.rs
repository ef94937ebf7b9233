//! Keyed book store
//!
//! Holds one order book per outcome token and dispatches feed events by
//! their own `asset_id`, never assuming a wire batch is homogeneous.

use std::collections::HashMap;

use super::OrderBook;
use crate::parser::{BookEvent, PriceChangeEvent};

/// token id → order book
#[derive(Debug, Default)]
pub struct BookStore {
    books: HashMap<String, OrderBook>,
}

impl BookStore {
    pub fn new() -> Self {
        Self {
            books: HashMap::new(),
        }
    }

    /// Register a token, creating an empty book for it if absent. An empty
    /// book is a valid display state before the first snapshot lands.
    pub fn track(&mut self, asset_id: &str) {
        self.books
            .entry(asset_id.to_string())
            .or_insert_with(|| OrderBook::new(asset_id));
    }

    /// Drop a token's book; used when its group's panel is torn down
    pub fn untrack(&mut self, asset_id: &str) {
        self.books.remove(asset_id);
    }

    /// Apply a snapshot to the book named by the event's asset_id
    pub fn apply_book(&mut self, event: &BookEvent) {
        self.books
            .entry(event.asset_id.clone())
            .or_insert_with(|| OrderBook::new(&event.asset_id))
            .apply_book(event);
    }

    /// Apply a delta to the book named by the event's asset_id.
    /// Returns true if the delta took effect (a snapshot had arrived).
    pub fn apply_changes(&mut self, event: &PriceChangeEvent) -> bool {
        self.books
            .entry(event.asset_id.clone())
            .or_insert_with(|| OrderBook::new(&event.asset_id))
            .apply_changes(event)
    }

    pub fn get(&self, asset_id: &str) -> Option<&OrderBook> {
        self.books.get(asset_id)
    }

    pub fn asset_ids(&self) -> Vec<String> {
        self.books.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
