//! MEXC WebSocket Adapter
//!
//! Client for MEXC's spot deals stream:
//!
//! - `messages`: wire types for the subscription request and push frames
//! - `codec`: frame decoding with per-message error isolation
//! - `reconnect`: exponential backoff policy with an off switch
//! - `deals`: the per-symbol connection lifecycle

pub mod codec;
pub mod deals;
pub mod messages;
pub mod reconnect;

pub use codec::{DealsCodec, DecodeError, MexcMessage};
pub use deals::{DealsClient, DealsClientConfig, DealsClientError, DealsEvent};
pub use messages::{AckMessage, DealItem, DealsData, DealsMessage, SubscriptionRequest};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
