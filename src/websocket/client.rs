//! WebSocket client for the CLOB feed
//!
//! Owns one transport connection: connect, send, receive, close. Channel
//! semantics (subscribe payloads, keepalive, reconnect) live in the
//! connection manager.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::{frame::coding::CloseCode, CloseFrame, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, warn};

use crate::error::{FeedError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A single WebSocket connection to one CLOB channel endpoint
pub struct WebSocketClient {
    stream: Option<WsStream>,
    endpoint: String,
}

impl WebSocketClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            stream: None,
            endpoint: endpoint.to_string(),
        }
    }

    /// Open the transport
    pub async fn connect(&mut self) -> Result<()> {
        debug!(endpoint = %self.endpoint, "Opening WebSocket connection");

        let (ws_stream, response) = connect_async(&self.endpoint)
            .await
            .map_err(|e| FeedError::Connection(format!("Failed to connect: {}", e)))?;

        debug!(status = ?response.status(), "WebSocket connected");
        self.stream = Some(ws_stream);

        Ok(())
    }

    /// Send a JSON payload as a text frame
    pub async fn send_json(&mut self, payload: &serde_json::Value) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| FeedError::Connection("Not connected".to_string()))?;

        stream
            .send(Message::Text(payload.to_string()))
            .await
            .map_err(|e| FeedError::Message(e.to_string()))
    }

    /// Receive the next text payload.
    ///
    /// Protocol-level pings are answered and, like pongs, yield `None`.
    /// A close frame or transport error drops the stream and returns the
    /// error so the caller can take the reconnect path.
    pub async fn recv(&mut self) -> Result<Option<String>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| FeedError::Connection("Not connected".to_string()))?;

        match stream.next().await {
            Some(Ok(Message::Text(text))) => Ok(Some(text)),
            Some(Ok(Message::Binary(data))) => {
                Ok(Some(String::from_utf8_lossy(&data).to_string()))
            }
            Some(Ok(Message::Ping(data))) => {
                debug!("Received ping, sending pong");
                if let Some(stream) = self.stream.as_mut() {
                    let _ = stream.send(Message::Pong(data)).await;
                }
                Ok(None)
            }
            Some(Ok(Message::Pong(_))) => Ok(None),
            Some(Ok(Message::Close(frame))) => {
                warn!(frame = ?frame, "Received close frame");
                self.stream = None;
                Err(FeedError::Connection("Connection closed".to_string()))
            }
            Some(Ok(Message::Frame(_))) => Ok(None),
            Some(Err(e)) => {
                error!(error = %e, "WebSocket error");
                self.stream = None;
                Err(FeedError::Message(e.to_string()))
            }
            None => {
                warn!("WebSocket stream ended");
                self.stream = None;
                Err(FeedError::Connection("Stream ended".to_string()))
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Close deliberately with the normal close code and release the stream
    pub async fn close_normal(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream
                .close(Some(CloseFrame {
                    code: CloseCode::Normal,
                    reason: "subscription closed".into(),
                }))
                .await;
        }
    }
}
