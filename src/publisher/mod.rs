//! Publisher module for the UI boundary
//!
//! Pushes rendered depth panels to the UI process over a Unix socket as
//! length-prefixed MessagePack frames. Rendering itself happens elsewhere;
//! this is the transport seam only.

use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};
use crate::orderbook::DepthView;
use crate::orders::OwnOrder;

/// One panel refresh: the depth view for a token with the viewer's open
/// orders joined in for row highlighting
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PanelUpdate {
    pub view: DepthView,
    pub own_orders: Vec<OwnOrder>,
}

/// Publisher for sending panel updates via Unix socket
pub struct Publisher {
    socket_path: String,
    stream: Mutex<Option<UnixStream>>,
}

impl Publisher {
    /// Create a new publisher
    pub async fn new(socket_path: &str) -> Result<Self> {
        let publisher = Self {
            socket_path: socket_path.to_string(),
            stream: Mutex::new(None),
        };

        // The UI process may not be up yet; retry on publish.
        if let Err(e) = publisher.connect().await {
            warn!(error = %e, "Initial IPC connection failed, will retry on publish");
        }

        Ok(publisher)
    }

    /// Connect to the Unix socket
    async fn connect(&self) -> Result<()> {
        let path = Path::new(&self.socket_path);

        if !path.exists() {
            return Err(FeedError::Ipc(format!(
                "Socket path does not exist: {}",
                self.socket_path
            )));
        }

        let stream = UnixStream::connect(path).await.map_err(|e| {
            FeedError::Ipc(format!("Failed to connect to {}: {}", self.socket_path, e))
        })?;

        let mut guard = self.stream.lock().await;
        *guard = Some(stream);

        info!(path = %self.socket_path, "Connected to IPC socket");
        Ok(())
    }

    /// Publish one panel update. A missing or broken UI connection is not an
    /// error for the feed; the frame is dropped and the next publish retries.
    pub async fn publish(&self, update: &PanelUpdate) -> Result<()> {
        let data = rmp_serde::to_vec(update)
            .map_err(|e| FeedError::Serialization(format!("Failed to serialize: {}", e)))?;

        let len = (data.len() as u32).to_be_bytes();
        let mut message = Vec::with_capacity(4 + data.len());
        message.extend_from_slice(&len);
        message.extend_from_slice(&data);

        let mut guard = self.stream.lock().await;

        if guard.is_none() {
            drop(guard);
            if let Err(e) = self.connect().await {
                debug!(error = %e, "Failed to reconnect to IPC socket");
                return Ok(());
            }
            guard = self.stream.lock().await;
        }

        if let Some(stream) = guard.as_mut() {
            match stream.write_all(&message).await {
                Ok(_) => {
                    debug!(
                        asset_id = %update.view.asset_id,
                        bids = update.view.bids.len(),
                        asks = update.view.asks.len(),
                        "Published panel update"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Failed to write to IPC socket");
                    *guard = None;
                }
            }
        }

        Ok(())
    }
}
