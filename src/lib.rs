//! PolyPro market-data core
//!
//! Reconstructs live per-token limit order books from the Polymarket CLOB
//! market feed, overlays the viewer's own resting orders from the user
//! channel, and publishes rendered depth panels to the UI process.

use std::sync::Arc;
use tokio::sync::RwLock;

pub mod config;
pub mod error;
pub mod metrics;
pub mod orderbook;
pub mod orders;
pub mod parser;
pub mod publisher;
pub mod rest;
pub mod subscription;
pub mod websocket;

pub use config::Config;
pub use error::{FeedError, Result};
pub use orderbook::{BookStore, DepthRow, DepthView, OrderBook};
pub use orders::{OwnOrder, OwnOrderLedger};
pub use parser::{parse_feed_message, FeedEvent};
pub use publisher::Publisher;
pub use rest::GatewayClient;
pub use subscription::{InstrumentGroup, SubscriptionCoordinator};
pub use websocket::{ConnectionState, FeedChannel, FeedConnection};

/// Application state shared across components.
///
/// The book store and own-order ledger each have a single writer (the feed
/// connection that owns their channel); readers take point-in-time snapshots
/// through the locks.
pub struct AppState {
    pub books: Arc<RwLock<BookStore>>,
    pub orders: Arc<RwLock<OwnOrderLedger>>,
    pub publisher: Arc<Publisher>,
    pub config: Arc<Config>,
}
