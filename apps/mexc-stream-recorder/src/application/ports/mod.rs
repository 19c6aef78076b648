//! Port Interfaces
//!
//! Interfaces (ports) for external systems following the Hexagonal
//! Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - `DealSink`: the persistence boundary for deal records and the symbol
//!   catalog. Stream tasks depend on this capability, never on a concrete
//!   store handle, and every task may write concurrently.

use async_trait::async_trait;

use crate::domain::deal::DealRecord;

/// Errors surfaced by sink implementations.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The underlying store rejected or failed the operation.
    #[error("database error: {0}")]
    Database(String),
}

/// The persistence boundary for deal records.
///
/// Implementations must tolerate concurrent, uncoordinated writers: one
/// writer task per symbol calls `insert_deal` with no application-level
/// locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DealSink: Send + Sync {
    /// Register a symbol in the catalog. Idempotent: re-registering an
    /// existing symbol must not create a duplicate row.
    async fn upsert_symbol(&self, symbol: &str) -> Result<(), SinkError>;

    /// Append one deal row.
    async fn insert_deal(&self, deal: &DealRecord) -> Result<(), SinkError>;
}
