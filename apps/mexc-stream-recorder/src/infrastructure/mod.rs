//! Infrastructure Layer
//!
//! Adapters and external integrations: the MEXC websocket client, the
//! Postgres sink, configuration, and telemetry.

pub mod config;
pub mod mexc;
pub mod postgres;
pub mod telemetry;
