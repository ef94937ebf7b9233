//! Feed connection manager
//!
//! One instance per subscribed channel: drives the connection state machine,
//! keepalive, fixed-delay reconnect, and dispatch of parsed events into the
//! book store and own-order ledger. A shut-down instance is terminal; the
//! subscription coordinator builds a fresh one for any resubscription.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use super::WebSocketClient;
use crate::config::ApiCredentials;
use crate::error::FeedError;
use crate::metrics;
use crate::orderbook::DepthView;
use crate::parser::{parse_feed_message, FeedEvent};
use crate::publisher::PanelUpdate;
use crate::AppState;

/// Connection lifecycle state, surfaced to the viewer as the connectivity
/// indicator for its group
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Subscribed,
    Closing,
}

/// Which CLOB channel this connection serves
#[derive(Debug, Clone)]
pub enum FeedChannel {
    /// Book snapshots and deltas for one instrument group's token set
    Market { assets_ids: Vec<String> },
    /// Own-order lifecycle events; credentials are passed through opaquely
    User { auth: ApiCredentials },
}

impl FeedChannel {
    pub fn label(&self) -> &'static str {
        match self {
            FeedChannel::Market { .. } => "market",
            FeedChannel::User { .. } => "user",
        }
    }

    fn subscribe_message(&self) -> serde_json::Value {
        match self {
            FeedChannel::Market { assets_ids } => serde_json::json!({
                "assets_ids": assets_ids,
                "sequence_number": 0,
            }),
            FeedChannel::User { auth } => serde_json::json!({
                "type": "subscribe",
                "channel": "user",
                "auth": {
                    "apiKey": auth.key,
                    "secret": auth.secret,
                    "passphrase": auth.passphrase,
                },
            }),
        }
    }
}

enum Flow {
    Shutdown,
    Reconnect,
}

/// Manages one WebSocket connection with automatic reconnection
pub struct FeedConnection {
    state: Arc<AppState>,
    channel: FeedChannel,
    client: WebSocketClient,
    status_tx: watch::Sender<ConnectionState>,
    shutdown: watch::Receiver<bool>,
}

impl FeedConnection {
    /// Create a manager for `channel`. Returns the instance and a receiver
    /// observing its connection state.
    pub fn new(
        state: Arc<AppState>,
        channel: FeedChannel,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, watch::Receiver<ConnectionState>) {
        let endpoint = match &channel {
            FeedChannel::Market { .. } => &state.config.market_ws_endpoint,
            FeedChannel::User { .. } => &state.config.user_ws_endpoint,
        };
        let client = WebSocketClient::new(endpoint);
        let (status_tx, status_rx) = watch::channel(ConnectionState::Disconnected);

        (
            Self {
                state,
                channel,
                client,
                status_tx,
                shutdown,
            },
            status_rx,
        )
    }

    /// Run until asked to shut down. Transport errors, unexpected closes,
    /// and connect timeouts all take the same fixed-delay reconnect path;
    /// deliberate shutdown closes with the normal code and never reconnects.
    pub async fn run(mut self) {
        let label = self.channel.label();
        let mut shutdown = self.shutdown.clone();
        let connect_timeout = Duration::from_secs(self.state.config.connect_timeout_secs);
        let reconnect_delay = Duration::from_millis(self.state.config.reconnect_delay_ms);

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.set_state(ConnectionState::Connecting);
            let connected = {
                let attempt = timeout(connect_timeout, self.connect_and_subscribe());
                tokio::pin!(attempt);
                tokio::select! {
                    res = &mut attempt => Some(res),
                    _ = shutdown.changed() => None,
                }
            };

            let result = match connected {
                None => break,
                Some(Ok(res)) => res,
                Some(Err(_)) => Err(FeedError::ConnectTimeout),
            };

            match result {
                Ok(()) => {
                    self.set_state(ConnectionState::Subscribed);
                    info!(channel = label, "Feed subscribed");
                    match self.process_messages().await {
                        Flow::Shutdown => break,
                        Flow::Reconnect => {}
                    }
                }
                Err(e) => {
                    warn!(channel = label, error = %e, "Connect failed");
                }
            }

            self.set_state(ConnectionState::Disconnected);
            metrics::reconnects_total().inc();
            debug!(
                channel = label,
                delay_ms = reconnect_delay.as_millis() as u64,
                "Reconnect scheduled"
            );

            // The reconnect timer lives in this select; teardown wins the
            // race and the timer can never fire after it.
            tokio::select! {
                _ = sleep(reconnect_delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.set_state(ConnectionState::Closing);
        self.client.close_normal().await;
        info!(channel = label, "Feed connection closed");
    }

    fn set_state(&self, state: ConnectionState) {
        let _ = self.status_tx.send(state);
    }

    async fn connect_and_subscribe(&mut self) -> crate::error::Result<()> {
        self.client.connect().await?;
        self.client
            .send_json(&self.channel.subscribe_message())
            .await
    }

    /// Pump messages while subscribed, sending a keepalive on a fixed period
    async fn process_messages(&mut self) -> Flow {
        let mut shutdown = self.shutdown.clone();
        let period = Duration::from_secs(self.state.config.keepalive_secs);
        let mut next_keepalive = Instant::now() + period;

        loop {
            let until = next_keepalive.saturating_duration_since(Instant::now());
            let received = {
                let recv = timeout(until, self.client.recv());
                tokio::pin!(recv);
                tokio::select! {
                    res = &mut recv => res,
                    _ = shutdown.changed() => return Flow::Shutdown,
                }
            };

            match received {
                Err(_) => {
                    if let Err(e) = self
                        .client
                        .send_json(&serde_json::json!({"type": "keepalive"}))
                        .await
                    {
                        warn!(channel = self.channel.label(), error = %e, "Keepalive send failed");
                        return Flow::Reconnect;
                    }
                    debug!(channel = self.channel.label(), "Sent keepalive");
                    next_keepalive = Instant::now() + period;
                }
                Ok(Ok(Some(text))) => {
                    self.handle_message(&text).await;
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    warn!(channel = self.channel.label(), error = %e, "Connection lost");
                    return Flow::Reconnect;
                }
            }
        }
    }

    /// Parse and apply one wire message, returning how many events took
    /// effect. A malformed message is logged and dropped whole; nothing from
    /// it reaches the ledgers. A delta that was only buffered ahead of its
    /// first snapshot does not count as applied.
    async fn handle_message(&self, raw: &str) -> usize {
        let events = match parse_feed_message(raw) {
            Ok(events) => events,
            Err(e) => {
                metrics::parse_failures_total().inc();
                warn!(channel = self.channel.label(), error = %e, "Dropping malformed feed message");
                return 0;
            }
        };
        if events.is_empty() {
            debug!(channel = self.channel.label(), "Liveness reply");
            return 0;
        }

        let mut applied = 0;
        let mut touched: Vec<String> = Vec::new();

        if events.iter().any(|e| !matches!(e, FeedEvent::Order(_))) {
            // All book mutations from one wire message happen under a single
            // write guard, so readers never observe a half-applied message.
            let mut books = self.state.books.write().await;
            for event in &events {
                match event {
                    FeedEvent::Book(e) => {
                        books.apply_book(e);
                        touched.push(e.asset_id.clone());
                        applied += 1;
                    }
                    FeedEvent::Changes(e) => {
                        if books.apply_changes(e) {
                            touched.push(e.asset_id.clone());
                            applied += 1;
                        } else {
                            debug!(asset_id = %e.asset_id, "Delta ahead of first snapshot, buffered");
                        }
                    }
                    FeedEvent::Order(_) => {}
                }
            }
        }

        if events.iter().any(|e| matches!(e, FeedEvent::Order(_))) {
            let mut orders = self.state.orders.write().await;
            for event in &events {
                if let FeedEvent::Order(e) = event {
                    orders.apply(e);
                    touched.push(e.asset_id.clone());
                    applied += 1;
                }
            }
        }

        metrics::events_applied_total().inc_by(applied as u64);

        touched.sort();
        touched.dedup();
        for asset_id in &touched {
            self.publish_panel(asset_id).await;
        }

        applied
    }

    /// Push a fresh depth view for `asset_id` to the UI process, with the
    /// viewer's open orders joined in at read time
    async fn publish_panel(&self, asset_id: &str) {
        let view = {
            let books = self.state.books.read().await;
            match books.get(asset_id) {
                Some(book) => DepthView::of(book, self.state.config.display_rows, false),
                // No panel is tracking this token.
                None => return,
            }
        };
        let own_orders = self.state.orders.read().await.open_orders(asset_id);

        let update = PanelUpdate { view, own_orders };
        if let Err(e) = self.state.publisher.publish(&update).await {
            debug!(error = %e, "Panel publish failed");
        }
    }
}
