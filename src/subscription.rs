//! Subscription coordinator
//!
//! Maps the set of instrument groups the viewer has open to live feed
//! connections, at most one per group. Opening a panel spawns a fresh
//! connection manager; closing it signals shutdown, waits for the manager
//! to finish, and releases the group's books.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::websocket::{ConnectionState, FeedChannel, FeedConnection};
use crate::AppState;

/// One tradable market's token set: its two outcome tokens share a single
/// feed subscription but keep independent books
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstrumentGroup {
    pub token_ids: Vec<String>,
}

impl InstrumentGroup {
    pub fn new(token_ids: Vec<String>) -> Self {
        Self { token_ids }
    }

    /// Stable map key for this group
    pub fn key(&self) -> String {
        self.token_ids.join(":")
    }
}

struct FeedHandle {
    group: InstrumentGroup,
    shutdown_tx: watch::Sender<bool>,
    status_rx: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

/// Owns the live feed connections, keyed by instrument group
pub struct SubscriptionCoordinator {
    state: Arc<AppState>,
    feeds: HashMap<String, FeedHandle>,
}

impl SubscriptionCoordinator {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            feeds: HashMap::new(),
        }
    }

    /// Open a subscription for `group`. A group that is already live keeps
    /// its existing connection; there is never more than one per group.
    pub async fn subscribe(&mut self, group: InstrumentGroup) {
        let key = group.key();
        if self.feeds.contains_key(&key) {
            return;
        }

        {
            let mut books = self.state.books.write().await;
            for token in &group.token_ids {
                books.track(token);
            }
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (connection, status_rx) = FeedConnection::new(
            self.state.clone(),
            FeedChannel::Market {
                assets_ids: group.token_ids.clone(),
            },
            shutdown_rx,
        );
        let task = tokio::spawn(connection.run());

        info!(group = %key, "Subscribed instrument group");
        self.feeds.insert(
            key,
            FeedHandle {
                group,
                shutdown_tx,
                status_rx,
                task,
            },
        );
    }

    /// Tear down the subscription for `key`: signal shutdown, wait for the
    /// manager to close (cancelling any pending reconnect timer), then drop
    /// the group's books. No mutation of that state happens afterwards.
    pub async fn unsubscribe(&mut self, key: &str) {
        let Some(handle) = self.feeds.remove(key) else {
            return;
        };

        let _ = handle.shutdown_tx.send(true);
        if let Err(e) = handle.task.await {
            warn!(group = %key, error = %e, "Feed task ended abnormally");
        }

        let mut books = self.state.books.write().await;
        for token in &handle.group.token_ids {
            books.untrack(token);
        }
        info!(group = %key, "Unsubscribed instrument group");
    }

    /// Reconcile the live connection set with the viewer's current selection
    pub async fn sync_selection(&mut self, selection: Vec<InstrumentGroup>) {
        let desired: Vec<String> = selection.iter().map(InstrumentGroup::key).collect();

        let stale: Vec<String> = self
            .feeds
            .keys()
            .filter(|key| !desired.contains(key))
            .cloned()
            .collect();
        for key in stale {
            self.unsubscribe(&key).await;
        }

        for group in selection {
            self.subscribe(group).await;
        }
    }

    /// Current connection state per group, for the connectivity indicator
    pub fn statuses(&self) -> Vec<(String, ConnectionState)> {
        let mut statuses: Vec<(String, ConnectionState)> = self
            .feeds
            .iter()
            .map(|(key, handle)| (key.clone(), *handle.status_rx.borrow()))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Tear down every live subscription
    pub async fn shutdown(&mut self) {
        let keys: Vec<String> = self.feeds.keys().cloned().collect();
        for key in keys {
            self.unsubscribe(&key).await;
        }
    }
}
