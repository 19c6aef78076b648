//! MEXC WebSocket Message Types
//!
//! Wire format types for the spot deals stream. The client sends one
//! subscription request after connect and receives JSON push frames plus
//! subscription acks.
//!
//! # Wire Formats
//!
//! Subscription request:
//! ```json
//! {"method": "SUBSCRIPTION", "params": ["spot@public.deals.v3.api@BTC_USDT"]}
//! ```
//!
//! Push frame (only the first element of `deals` is consumed):
//! ```json
//! {"s": "BTC_USDT", "d": {"deals": [{"t": 1700000000000, "S": 1, "p": "65000.5", "v": "0.01"}]}}
//! ```
//!
//! Ack:
//! ```json
//! {"id": 0, "code": 0, "msg": "spot@public.deals.v3.api@BTC_USDT"}
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::deal::{DealRecord, Side, catalog_key, timestamp_from_millis};

/// Method tag of the one-shot subscription request.
const SUBSCRIPTION_METHOD: &str = "SUBSCRIPTION";

// =============================================================================
// Outbound
// =============================================================================

/// Subscription request sent exactly once after the socket opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Method tag (always `SUBSCRIPTION`).
    pub method: String,
    /// Channel parameters naming the streams to receive.
    pub params: Vec<String>,
}

impl SubscriptionRequest {
    /// Create a subscription request for the given channel parameters.
    #[must_use]
    pub fn subscribe(params: Vec<String>) -> Self {
        Self {
            method: SUBSCRIPTION_METHOD.to_string(),
            params,
        }
    }
}

// =============================================================================
// Inbound
// =============================================================================

/// Server reply to a subscription request.
///
/// A nonzero `code` means the server rejected the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    /// Request id echoed by the server.
    #[serde(default)]
    pub id: i64,
    /// Result code (0 = accepted).
    pub code: i64,
    /// Human-readable detail, usually the channel string.
    #[serde(default)]
    pub msg: String,
}

/// Envelope of a deals push frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealsMessage {
    /// Channel the push belongs to.
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Wire symbol tag, e.g. `BTC_USDT`.
    #[serde(rename = "s")]
    pub symbol: String,
    /// Payload under the fixed `d` key.
    #[serde(rename = "d")]
    pub data: DealsData,
}

/// Payload of a deals push frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealsData {
    /// Executed trades carried by this frame.
    pub deals: Vec<DealItem>,
}

/// One executed trade inside a push frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealItem {
    /// Execution time, milliseconds since epoch.
    #[serde(rename = "t")]
    pub time_ms: i64,
    /// Side code: 1 buy, 2 sell.
    #[serde(rename = "S")]
    pub side_code: i64,
    /// Price as a decimal string.
    #[serde(rename = "p", with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Quantity as a decimal string.
    #[serde(rename = "v", with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
}

impl DealsMessage {
    /// Project the first deal of the frame into a persistable record.
    ///
    /// Only the first element of `deals` is consumed per frame. Returns
    /// `None` when the frame carries no deals or the timestamp is outside
    /// the representable range.
    #[must_use]
    pub fn to_record(&self) -> Option<DealRecord> {
        let deal = self.data.deals.first()?;
        let executed_at = timestamp_from_millis(deal.time_ms)?;

        Some(DealRecord {
            symbol: catalog_key(&self.symbol),
            executed_at,
            side: Side::from_wire_code(deal.side_code),
            price: deal.price,
            quantity: deal.quantity,
        })
    }
}
