#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access
    )
)]

//! MEXC Stream Recorder - Deals Ingestion Service
//!
//! Maintains one long-lived websocket subscription per configured symbol on
//! MEXC's spot deals feed and persists every decoded trade event as a row in
//! PostgreSQL.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core data types and normalization rules
//!   - `deal`: Normalized deal records, side mapping, timestamp rules
//!   - `symbol`: Symbol registry and channel parameter rendering
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: The `DealSink` capability shared by all stream tasks
//!   - `services`: Stream supervision and the per-symbol writer loop
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `mexc`: WebSocket client, wire types, codec, reconnect policy
//!   - `postgres`: Connection-pooled sink adapter
//!   - `config`: Environment-based configuration
//!   - `telemetry`: Tracing initialization
//!
//! # Data Flow
//!
//! ```text
//! MEXC deals WS (symbol 1) ──┐
//!                            │    ┌──────────────┐     ┌────────────┐
//! MEXC deals WS (symbol 2) ──┼───►│  Per-symbol  │────►│  Postgres  │
//!                            │    │ writer tasks │     │    sink    │
//! MEXC deals WS (symbol N) ──┘    └──────────────┘     └────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core data types with no external integrations.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::deal::{DealRecord, Side};
pub use domain::symbol::{Symbol, SymbolRegistry};

// Application ports and services
pub use application::ports::{DealSink, SinkError};
pub use application::services::{StreamSupervisor, SupervisorSettings};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, DatabaseSettings, RecorderConfig, StreamSettings,
};

// MEXC stream client (for integration tests)
pub use infrastructure::mexc::{
    AckMessage, DealItem, DealsClient, DealsClientConfig, DealsClientError, DealsCodec,
    DealsData, DealsEvent, DealsMessage, DecodeError, MexcMessage, ReconnectConfig,
    ReconnectPolicy, SubscriptionRequest,
};

// Postgres sink
pub use infrastructure::postgres::{PgDealStore, StoreError};

// Telemetry
pub use infrastructure::telemetry;
