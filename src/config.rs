//! Configuration module for the market data core

use serde::Deserialize;
use std::env;

use crate::subscription::InstrumentGroup;

/// Opaque API credentials for the user channel subscription.
///
/// Credential generation and session handling live in the trading gateway;
/// these strings are passed through verbatim in the subscribe message.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Instrument groups to subscribe to at startup; each group is the two
    /// outcome token ids of one market, colon-separated
    pub groups: Vec<InstrumentGroup>,

    /// WebSocket endpoint for the CLOB market channel
    pub market_ws_endpoint: String,

    /// WebSocket endpoint for the CLOB user channel (own-order lifecycle)
    pub user_ws_endpoint: String,

    /// Trading gateway base URL for order placement/cancellation
    pub gateway_endpoint: String,

    /// IPC socket path for publishing depth views to the UI process
    pub ipc_socket_path: String,

    /// Rows per side in the rendered depth view
    pub display_rows: usize,

    /// Keepalive period while subscribed, in seconds
    pub keepalive_secs: u64,

    /// Delay before re-entering CONNECTING after an unexpected close
    pub reconnect_delay_ms: u64,

    /// Bound on the CONNECTING phase; exceeding it follows the reconnect path
    pub connect_timeout_secs: u64,

    /// Port for the health/metrics HTTP server
    pub health_port: u16,

    /// User-channel credentials; the user feed is skipped when absent
    pub api_credentials: Option<ApiCredentials>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let groups = env::var("GROUPS")
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| InstrumentGroup::new(s.trim().split(':').map(str::to_string).collect()))
            .collect();

        let api_credentials = match (
            env::var("POLY_API_KEY"),
            env::var("POLY_SECRET"),
            env::var("POLY_PASSPHRASE"),
        ) {
            (Ok(key), Ok(secret), Ok(passphrase)) => Some(ApiCredentials {
                key,
                secret,
                passphrase,
            }),
            _ => None,
        };

        Ok(Self {
            groups,
            market_ws_endpoint: env::var("MARKET_WS_ENDPOINT").unwrap_or_else(|_| {
                "wss://ws-subscriptions-clob.polymarket.com/ws/market".to_string()
            }),
            user_ws_endpoint: env::var("USER_WS_ENDPOINT").unwrap_or_else(|_| {
                "wss://ws-subscriptions-clob.polymarket.com/ws/user".to_string()
            }),
            gateway_endpoint: env::var("GATEWAY_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            ipc_socket_path: env::var("IPC_SOCKET_PATH")
                .unwrap_or_else(|_| "/tmp/polypro.sock".to_string()),
            display_rows: env::var("DISPLAY_ROWS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap_or(7),
            keepalive_secs: env::var("KEEPALIVE_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            reconnect_delay_ms: env::var("RECONNECT_DELAY_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap_or(2000),
            connect_timeout_secs: env::var("CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            health_port: env::var("HEALTH_PORT")
                .unwrap_or_else(|_| "9090".to_string())
                .parse()
                .unwrap_or(9090),
            api_credentials,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            market_ws_endpoint: "wss://ws-subscriptions-clob.polymarket.com/ws/market".to_string(),
            user_ws_endpoint: "wss://ws-subscriptions-clob.polymarket.com/ws/user".to_string(),
            gateway_endpoint: "http://localhost:8000".to_string(),
            ipc_socket_path: "/tmp/polypro.sock".to_string(),
            display_rows: 7,
            keepalive_secs: 30,
            reconnect_delay_ms: 2000,
            connect_timeout_secs: 10,
            health_port: 9090,
            api_credentials: None,
        }
    }
}
