//! Wire events pushed by the price feed
//!
//! The feed delivers JSON text frames shaped as:
//!
//! ```text
//! { "type": "priceUpdate", "itemId": "...", "itemName": "...", "price": 123.45 }
//! ```
//!
//! Events carry no sequence number or timestamp; the last event applied wins
//! and delivery order is whatever the transport produced.

use serde::Deserialize;
use wirefeed::WirefeedError;

/// A price change for a single item
///
/// `itemName` is only used for the transient notification. Some feed builds
/// omit it, so it defaults to empty and the display falls back to the id.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdateEvent {
    pub item_id: String,
    #[serde(default)]
    pub item_name: String,
    pub price: f64,
}

impl PriceUpdateEvent {
    /// Label to show in a notification: the item name, or the id when the
    /// feed did not send a name
    pub fn display_label(&self) -> &str {
        if self.item_name.is_empty() {
            &self.item_id
        } else {
            &self.item_name
        }
    }
}

/// A parsed feed frame
#[derive(Debug)]
pub enum FeedMessage {
    /// A well-formed price update to apply to the page
    PriceUpdate(PriceUpdateEvent),
    /// A well-formed frame with a `type` we do not act on (carried for
    /// logging; dropped silently by the handler)
    Ignored(String),
}

/// Route keys for the feed
///
/// Everything rides one route: per-item ordering is exactly delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedRoute {
    Updates,
}

/// Decode a feed frame
///
/// Unknown `type` values produce `FeedMessage::Ignored`; they are not an
/// error. Anything that is not a JSON object with a string `type`, or a
/// `priceUpdate` missing its fields, is a parse error and the frame is
/// dropped upstream.
pub fn decode_frame(text: &str) -> Result<FeedMessage, WirefeedError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| WirefeedError::Parse(e.to_string()))?;

    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| WirefeedError::Parse("missing \"type\" field".into()))?;

    if kind != "priceUpdate" {
        return Ok(FeedMessage::Ignored(kind.to_string()));
    }

    let event: PriceUpdateEvent =
        serde_json::from_value(value).map_err(|e| WirefeedError::Parse(e.to_string()))?;

    Ok(FeedMessage::PriceUpdate(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_price_update() {
        let frame = r#"{"type":"priceUpdate","itemId":"vinyl-042","itemName":"Signed LP","price":149.99}"#;
        match decode_frame(frame).unwrap() {
            FeedMessage::PriceUpdate(event) => {
                assert_eq!(event.item_id, "vinyl-042");
                assert_eq!(event.item_name, "Signed LP");
                assert_eq!(event.price, 149.99);
                assert_eq!(event.display_label(), "Signed LP");
            }
            other => panic!("expected PriceUpdate, got {:?}", other),
        }
    }

    #[test]
    fn item_name_defaults_to_empty() {
        let frame = r#"{"type":"priceUpdate","itemId":"vinyl-042","price":10.0}"#;
        match decode_frame(frame).unwrap() {
            FeedMessage::PriceUpdate(event) => {
                assert_eq!(event.item_name, "");
                assert_eq!(event.display_label(), "vinyl-042");
            }
            other => panic!("expected PriceUpdate, got {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_ignored_not_an_error() {
        let frame = r#"{"type":"auctionClosed","itemId":"vinyl-042"}"#;
        match decode_frame(frame).unwrap() {
            FeedMessage::Ignored(kind) => assert_eq!(kind, "auctionClosed"),
            other => panic!("expected Ignored, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(decode_frame("not json at all").is_err());
        assert!(decode_frame(r#"{"itemId":"x"}"#).is_err());
    }

    #[test]
    fn price_update_missing_fields_is_a_parse_error() {
        let frame = r#"{"type":"priceUpdate","itemName":"No id or price"}"#;
        assert!(decode_frame(frame).is_err());
    }
}
