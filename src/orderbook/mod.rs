//! Order book module
//!
//! Maintains per-token order book state reconstructed from CLOB snapshot and
//! delta events.

mod book;
mod store;
mod view;

pub use book::OrderBook;
pub use store::BookStore;
pub use view::{DepthRow, DepthView};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

/// A single level in the order book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub price: Decimal,
    pub size: Decimal,
}
