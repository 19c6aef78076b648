//! Application Services
//!
//! Stream supervision: one websocket client task and one sink-writer task per
//! symbol, with every task handle retained so shutdown can cancel and join
//! the whole group instead of abandoning it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::DealSink;
use crate::domain::symbol::SymbolRegistry;
use crate::infrastructure::mexc::{
    DealsClient, DealsClientConfig, DealsEvent, ReconnectConfig,
};

/// Settings shared by every supervised stream.
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// Feed endpoint URL.
    pub ws_url: String,
    /// Bound of each per-symbol event channel.
    pub channel_capacity: usize,
    /// Reconnection policy applied to every connection.
    pub reconnect: ReconnectConfig,
}

/// Supervises the per-symbol stream tasks.
///
/// Tasks are independent: one symbol's connection failing or exhausting its
/// reconnect budget is logged and does not affect its siblings.
pub struct StreamSupervisor {
    handles: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl StreamSupervisor {
    /// Spawn one client task and one writer task per registry symbol.
    #[must_use]
    pub fn spawn(
        registry: &SymbolRegistry,
        sink: Arc<dyn DealSink>,
        settings: &SupervisorSettings,
        cancel: CancellationToken,
    ) -> Self {
        let mut handles = Vec::with_capacity(registry.len() * 2);

        for symbol in registry.iter() {
            let (event_tx, event_rx) = mpsc::channel::<DealsEvent>(settings.channel_capacity);

            let config = DealsClientConfig::for_symbol(
                settings.ws_url.clone(),
                symbol,
                settings.reconnect.clone(),
            );
            let client = DealsClient::new(config, event_tx, cancel.clone());

            let wire = symbol.as_wire().to_string();
            handles.push(tokio::spawn(async move {
                if let Err(e) = client.run().await {
                    tracing::error!(symbol = %wire, error = %e, "deals client stopped");
                }
            }));

            handles.push(tokio::spawn(write_events(
                symbol.as_wire().to_string(),
                event_rx,
                Arc::clone(&sink),
            )));
        }

        Self { handles, cancel }
    }

    /// Number of supervised tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Cancel every task and wait for the group to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await
                && !e.is_cancelled()
            {
                tracing::error!(error = %e, "supervised task panicked");
            }
        }
    }
}

/// Forward events from one stream to the shared sink.
///
/// Deal records are written one at a time, awaited per record, so rows land
/// in frame-arrival order for this symbol. A failed write is logged and the
/// loop continues with the next event.
async fn write_events(
    symbol: String,
    mut event_rx: mpsc::Receiver<DealsEvent>,
    sink: Arc<dyn DealSink>,
) {
    while let Some(event) = event_rx.recv().await {
        match event {
            DealsEvent::Connected => {
                tracing::info!(symbol = %symbol, "deals stream connected");
            }
            DealsEvent::Disconnected => {
                tracing::warn!(symbol = %symbol, "deals stream disconnected");
            }
            DealsEvent::Reconnecting { attempt } => {
                tracing::info!(symbol = %symbol, attempt, "deals stream reconnecting");
            }
            DealsEvent::Deal(record) => {
                if let Err(e) = sink.insert_deal(&record).await {
                    tracing::error!(symbol = %symbol, error = %e, "failed to persist deal");
                }
            }
            DealsEvent::Error(msg) => {
                tracing::error!(symbol = %symbol, error = %msg, "deals stream error");
            }
        }
    }
}
