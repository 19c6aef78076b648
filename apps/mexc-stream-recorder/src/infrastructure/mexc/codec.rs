//! Stream Codec
//!
//! Decodes inbound text frames from the deals stream into typed messages.
//! Every decode failure is a named error isolated to its frame: the caller
//! logs and skips the frame instead of tearing down the connection.

use crate::infrastructure::mexc::messages::{AckMessage, DealsMessage};

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// JSON parsing or shape mismatch.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed deals frame with an empty deals array.
    #[error("deals frame carries no deals")]
    EmptyDeals,

    /// Frame matched neither a deals push nor an ack.
    #[error("unrecognized frame: {0}")]
    UnrecognizedFrame(String),
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MexcMessage {
    /// Subscription ack or other control reply.
    Ack(AckMessage),
    /// Deals push frame.
    Deals(DealsMessage),
}

/// JSON codec for the deals stream.
#[derive(Debug, Default, Clone)]
pub struct DealsCodec;

impl DealsCodec {
    /// Create a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode one text frame.
    ///
    /// Frames carrying the `s`/`d` envelope are deals pushes; frames
    /// carrying a `code` are acks. Anything else is rejected with the start
    /// of the offending payload.
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` naming what went wrong with this frame.
    pub fn decode(&self, text: &str) -> Result<MexcMessage, DecodeError> {
        let value: serde_json::Value = serde_json::from_str(text)?;

        if value.get("s").is_some() && value.get("d").is_some() {
            let message: DealsMessage = serde_json::from_value(value)?;
            if message.data.deals.is_empty() {
                return Err(DecodeError::EmptyDeals);
            }
            return Ok(MexcMessage::Deals(message));
        }

        if value.get("code").is_some() {
            let ack: AckMessage = serde_json::from_value(value)?;
            return Ok(MexcMessage::Ack(ack));
        }

        Err(DecodeError::UnrecognizedFrame(
            text.trim().chars().take(80).collect(),
        ))
    }

    /// Encode a value to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode<T: serde::Serialize>(&self, value: &T) -> Result<String, DecodeError> {
        Ok(serde_json::to_string(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deal::Side;
    use crate::infrastructure::mexc::messages::SubscriptionRequest;

    #[test]
    fn decode_deals_frame() {
        let codec = DealsCodec::new();
        let frame = r#"{"s":"BTC_USDT","d":{"deals":[{"t":1700000000000,"S":2,"p":"65000.5","v":"0.01"}]}}"#;

        match codec.decode(frame).unwrap() {
            MexcMessage::Deals(message) => {
                assert_eq!(message.symbol, "BTC_USDT");
                assert_eq!(message.to_record().unwrap().side, Side::Sell);
            }
            MexcMessage::Ack(_) => panic!("expected Deals message"),
        }
    }

    #[test]
    fn decode_ack_frame() {
        let codec = DealsCodec::new();
        let frame = r#"{"id":0,"code":0,"msg":"spot@public.deals.v3.api@BTC_USDT"}"#;

        match codec.decode(frame).unwrap() {
            MexcMessage::Ack(ack) => {
                assert_eq!(ack.code, 0);
                assert_eq!(ack.msg, "spot@public.deals.v3.api@BTC_USDT");
            }
            MexcMessage::Deals(_) => panic!("expected Ack message"),
        }
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let codec = DealsCodec::new();
        assert!(matches!(
            codec.decode("not json"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_deal_fields() {
        let codec = DealsCodec::new();
        // Deal item without a price.
        let frame = r#"{"s":"BTC_USDT","d":{"deals":[{"t":1700000000000,"S":1,"v":"0.01"}]}}"#;
        assert!(matches!(codec.decode(frame), Err(DecodeError::Json(_))));
    }

    #[test]
    fn decode_rejects_non_numeric_price() {
        let codec = DealsCodec::new();
        let frame = r#"{"s":"BTC_USDT","d":{"deals":[{"t":1700000000000,"S":1,"p":"abc","v":"0.01"}]}}"#;
        assert!(matches!(codec.decode(frame), Err(DecodeError::Json(_))));
    }

    #[test]
    fn decode_rejects_empty_deals_array() {
        let codec = DealsCodec::new();
        let frame = r#"{"s":"BTC_USDT","d":{"deals":[]}}"#;
        assert!(matches!(codec.decode(frame), Err(DecodeError::EmptyDeals)));
    }

    #[test]
    fn decode_rejects_unrecognized_frame() {
        let codec = DealsCodec::new();
        assert!(matches!(
            codec.decode(r#"{"hello":"world"}"#),
            Err(DecodeError::UnrecognizedFrame(_))
        ));
    }

    #[test]
    fn encode_subscription_request() {
        let codec = DealsCodec::new();
        let request = SubscriptionRequest::subscribe(vec![
            "spot@public.deals.v3.api@ETH_USDT".to_string(),
        ]);
        let json = codec.encode(&request).unwrap();
        assert!(json.contains(r#""method":"SUBSCRIPTION""#));
        assert!(json.contains("spot@public.deals.v3.api@ETH_USDT"));
    }
}
