//! WebSocket module for CLOB feed connection management

mod client;
mod manager;

pub use client::WebSocketClient;
pub use manager::{ConnectionState, FeedChannel, FeedConnection};
