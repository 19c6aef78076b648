//! Deals WebSocket Client
//!
//! Maintains one streaming session for a symbol's deal channel: connect,
//! send the one-shot subscription request, then decode push frames into
//! normalized records until the connection drops or the client is cancelled.
//!
//! # Stream URL
//!
//! - Production: `wss://wbs.mexc.com/ws`
//!
//! # Protocol
//!
//! The client sends a single JSON subscription request after connect and
//! receives JSON push frames; the server acknowledges the subscription with
//! an ack frame that is logged and otherwise ignored.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::domain::deal::DealRecord;
use crate::domain::symbol::Symbol;

use super::codec::{DealsCodec, MexcMessage};
use super::messages::SubscriptionRequest;
use super::reconnect::{ReconnectConfig, ReconnectPolicy};

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur in the deals client.
#[derive(Debug, thiserror::Error)]
pub enum DealsClientError {
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    ConnectionFailed(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Maximum reconnection attempts exceeded.
    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectAttemptsExceeded,

    /// Connection closed by the server.
    #[error("connection closed")]
    ConnectionClosed,
}

// =============================================================================
// Client Events
// =============================================================================

/// Events emitted by the deals client.
#[derive(Debug, Clone)]
pub enum DealsEvent {
    /// Connected and subscribed.
    Connected,
    /// Disconnected from the server.
    Disconnected,
    /// Reconnecting to the server.
    Reconnecting {
        /// Reconnection attempt number.
        attempt: u32,
    },
    /// Received one normalized deal.
    Deal(DealRecord),
    /// Error reported mid-stream.
    Error(String),
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for one deals client.
#[derive(Debug, Clone)]
pub struct DealsClientConfig {
    /// WebSocket URL.
    pub url: String,
    /// Channel parameters named in the subscription request.
    pub channels: Vec<String>,
    /// Reconnection policy.
    pub reconnect: ReconnectConfig,
}

impl DealsClientConfig {
    /// Create a configuration subscribing to one symbol's deal stream.
    #[must_use]
    pub fn for_symbol(url: String, symbol: &Symbol, reconnect: ReconnectConfig) -> Self {
        Self {
            url,
            channels: vec![symbol.deals_channel()],
            reconnect,
        }
    }
}

// =============================================================================
// Deals Client
// =============================================================================

/// WebSocket client for one symbol's deal stream.
///
/// Manages the connection lifecycle:
/// - One-shot subscription request on open
/// - Frame decoding with per-message error isolation
/// - Reconnection per the configured policy (off = close permanently)
pub struct DealsClient {
    config: DealsClientConfig,
    codec: DealsCodec,
    event_tx: mpsc::Sender<DealsEvent>,
    cancel: CancellationToken,
}

impl DealsClient {
    /// Create a new deals client.
    #[must_use]
    pub fn new(
        config: DealsClientConfig,
        event_tx: mpsc::Sender<DealsEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            codec: DealsCodec::new(),
            event_tx,
            cancel,
        }
    }

    /// Run the connection loop.
    ///
    /// Connects, subscribes, and processes frames until cancelled. On a
    /// drop, reconnects per the configured policy; with reconnection
    /// disabled the first drop is terminal and the underlying error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the terminal connection error, or
    /// `MaxReconnectAttemptsExceeded` when the attempt budget runs out.
    pub async fn run(self) -> Result<(), DealsClientError> {
        let mut reconnect_policy = ReconnectPolicy::new(self.config.reconnect.clone());

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("deals client cancelled");
                return Ok(());
            }

            match self.connect_and_stream(&mut reconnect_policy).await {
                Ok(()) => {
                    tracing::info!("deals connection closed gracefully");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "deals connection error");

                    let _ = self.event_tx.send(DealsEvent::Disconnected).await;

                    if let Some(delay) = reconnect_policy.next_delay() {
                        let attempt = reconnect_policy.attempt_count();
                        tracing::info!(
                            attempt,
                            delay_ms = delay.as_millis(),
                            "reconnecting to deals stream"
                        );

                        let _ = self
                            .event_tx
                            .send(DealsEvent::Reconnecting { attempt })
                            .await;

                        tokio::select! {
                            () = self.cancel.cancelled() => {
                                tracing::info!("deals client cancelled during reconnect delay");
                                return Ok(());
                            }
                            () = tokio::time::sleep(delay) => {}
                        }
                    } else if self.config.reconnect.enabled {
                        return Err(DealsClientError::MaxReconnectAttemptsExceeded);
                    } else {
                        // Reconnection disabled: the drop is terminal.
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Connect, subscribe, and stream until an error or cancellation.
    async fn connect_and_stream(
        &self,
        reconnect_policy: &mut ReconnectPolicy,
    ) -> Result<(), DealsClientError> {
        tracing::info!(
            url = %self.config.url,
            channels = ?self.config.channels,
            "connecting to deals stream"
        );

        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.config.url).await?;

        let (mut write, mut read) = ws_stream.split();

        // One-shot subscription handshake, before any frame is read.
        let request = SubscriptionRequest::subscribe(self.config.channels.clone());
        let json = self.codec.encode(&request).map_err(|e| {
            DealsClientError::ConnectionFailed(format!("failed to serialize subscription: {e}"))
        })?;
        write.send(Message::Text(json.into())).await?;

        reconnect_policy.reset();
        let _ = self.event_tx.send(DealsEvent::Connected).await;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(&text).await;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("server sent close frame");
                            return Err(DealsClientError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {
                            // Ignore other message types
                        }
                        Some(Err(e)) => {
                            return Err(e.into());
                        }
                        None => {
                            tracing::info!("WebSocket stream ended");
                            return Err(DealsClientError::ConnectionClosed);
                        }
                    }
                }
            }
        }
    }

    /// Decode one frame and forward its record.
    ///
    /// A frame that fails to decode is logged and skipped; one bad message
    /// never takes the connection down.
    async fn handle_frame(&self, text: &str) {
        match self.codec.decode(text) {
            Ok(MexcMessage::Deals(message)) => match message.to_record() {
                Some(record) => {
                    let _ = self.event_tx.send(DealsEvent::Deal(record)).await;
                }
                None => {
                    tracing::warn!(
                        symbol = %message.symbol,
                        "deals frame with unrepresentable timestamp"
                    );
                }
            },
            Ok(MexcMessage::Ack(ack)) => {
                if ack.code == 0 {
                    tracing::debug!(msg = %ack.msg, "subscription acknowledged");
                } else {
                    tracing::error!(code = ack.code, msg = %ack.msg, "subscription rejected");
                    let _ = self.event_tx.send(DealsEvent::Error(ack.msg)).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "dropping undecodable frame");
            }
        }
    }
}
