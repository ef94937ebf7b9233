//! Error types for the market data core

use thiserror::Error;

/// Market data core errors
///
/// Transport and timeout errors are recovered locally by the connection
/// manager's reconnect path; parse errors drop a single message; gateway
/// errors carry the human-readable reason for the viewer. None of these
/// terminate the process.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("WebSocket connection error: {0}")]
    Connection(String),

    #[error("WebSocket message error: {0}")]
    Message(String),

    #[error("Failed to parse feed event: {0}")]
    Parse(String),

    #[error("Trading gateway error: {0}")]
    Gateway(String),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection timeout")]
    ConnectTimeout,
}

impl From<tokio_tungstenite::tungstenite::Error> for FeedError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        FeedError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Gateway(err.to_string())
    }
}

impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::Ipc(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
