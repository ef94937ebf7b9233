//! Parser module for CLOB WebSocket messages
//!
//! Handles deserialization of book snapshots, price-change deltas, and
//! own-order lifecycle events. Every event carries its own `asset_id`; a
//! single wire message may be one event or a list mixing event kinds and
//! tokens, so dispatch happens per event, never per batch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Wire-level order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

/// A price level as it appears on the wire (decimal strings)
#[derive(Debug, Clone, Deserialize)]
pub struct WireLevel {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
}

/// Full book snapshot for one token; supersedes all prior state
#[derive(Debug, Clone, Deserialize)]
pub struct BookEvent {
    pub asset_id: String,
    pub market: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub timestamp: String,
    pub bids: Vec<WireLevel>,
    pub asks: Vec<WireLevel>,
}

/// One incremental change within a delta message
#[derive(Debug, Clone, Deserialize)]
pub struct PriceChange {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub side: OrderSide,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
}

/// Ordered delta for one token; changes apply sequentially, later entries
/// for the same price win
#[derive(Debug, Clone, Deserialize)]
pub struct PriceChangeEvent {
    pub asset_id: String,
    pub market: String,
    #[serde(default)]
    pub timestamp: String,
    pub changes: Vec<PriceChange>,
}

/// Own-order lifecycle kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LifecycleKind {
    #[serde(rename = "PLACEMENT")]
    Placement,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "CANCELLATION")]
    Cancellation,
}

/// Own-order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "LIVE")]
    Live,
    #[serde(rename = "MATCHED")]
    Matched,
    #[serde(rename = "CANCELED")]
    Canceled,
}

/// Own-order lifecycle event from the user channel
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEvent {
    #[serde(rename = "type")]
    pub kind: LifecycleKind,
    pub id: String,
    pub asset_id: String,
    pub side: OrderSide,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub original_size: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub size_matched: Decimal,
    pub status: OrderStatus,
}

/// A feed event, discriminated once at parse time by its `event_type` tag.
/// Payloads matching no known tag are a parse error.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event_type")]
pub enum FeedEvent {
    #[serde(rename = "book")]
    Book(BookEvent),
    #[serde(rename = "changes")]
    Changes(PriceChangeEvent),
    #[serde(rename = "order")]
    Order(OrderEvent),
}

impl FeedEvent {
    /// Token this event belongs to
    pub fn asset_id(&self) -> &str {
        match self {
            FeedEvent::Book(e) => &e.asset_id,
            FeedEvent::Changes(e) => &e.asset_id,
            FeedEvent::Order(e) => &e.asset_id,
        }
    }
}

/// Parse a raw WebSocket payload into zero or more feed events.
///
/// The literal `"PONG"` liveness reply yields an empty batch. A payload that
/// fails to parse fails as a whole: no event from it is ever applied, which
/// keeps per-message application all-or-nothing.
pub fn parse_feed_message(raw: &str) -> Result<Vec<FeedEvent>> {
    if raw == "PONG" {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

impl OrderSide {
    /// Map the wire side to a book side: BUY hits bids, SELL hits asks
    pub fn book_side(self) -> crate::orderbook::Side {
        match self {
            OrderSide::Buy => crate::orderbook::Side::Bid,
            OrderSide::Sell => crate::orderbook::Side::Ask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_book_event() {
        let raw = r#"{
            "event_type": "book",
            "asset_id": "token-yes",
            "market": "0xabc",
            "hash": "deadbeef",
            "timestamp": "1700000000000",
            "bids": [{"price": "0.40", "size": "100"}, {"price": "0.35", "size": "50"}],
            "asks": [{"price": "0.45", "size": "80"}]
        }"#;

        let events = parse_feed_message(raw).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            FeedEvent::Book(book) => {
                assert_eq!(book.asset_id, "token-yes");
                assert_eq!(book.bids.len(), 2);
                assert_eq!(book.bids[0].price, dec!(0.40));
                assert_eq!(book.asks[0].size, dec!(80));
            }
            other => panic!("expected book event, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_changes_event() {
        let raw = r#"{
            "event_type": "changes",
            "asset_id": "token-yes",
            "market": "0xabc",
            "timestamp": "1700000000001",
            "changes": [
                {"price": "0.40", "side": "BUY", "size": "0"},
                {"price": "0.46", "side": "SELL", "size": "20"}
            ]
        }"#;

        let events = parse_feed_message(raw).unwrap();
        match &events[0] {
            FeedEvent::Changes(delta) => {
                assert_eq!(delta.changes.len(), 2);
                assert_eq!(delta.changes[0].side, OrderSide::Buy);
                assert_eq!(delta.changes[0].size, Decimal::ZERO);
                assert_eq!(delta.changes[1].side, OrderSide::Sell);
            }
            other => panic!("expected changes event, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_order_event() {
        let raw = r#"{
            "event_type": "order",
            "type": "PLACEMENT",
            "id": "order-1",
            "asset_id": "token-yes",
            "side": "BUY",
            "price": "0.40",
            "original_size": "1000",
            "size_matched": "0",
            "status": "LIVE"
        }"#;

        let events = parse_feed_message(raw).unwrap();
        match &events[0] {
            FeedEvent::Order(order) => {
                assert_eq!(order.kind, LifecycleKind::Placement);
                assert_eq!(order.status, OrderStatus::Live);
                assert_eq!(order.price, dec!(0.40));
            }
            other => panic!("expected order event, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_mixed_batch_across_tokens() {
        let raw = r#"[
            {"event_type": "book", "asset_id": "token-yes", "market": "0xabc",
             "bids": [], "asks": []},
            {"event_type": "changes", "asset_id": "token-no", "market": "0xabc",
             "changes": [{"price": "0.60", "side": "SELL", "size": "5"}]}
        ]"#;

        let events = parse_feed_message(raw).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].asset_id(), "token-yes");
        assert_eq!(events[1].asset_id(), "token-no");
    }

    #[test]
    fn test_pong_is_discarded_before_json_parse() {
        let events = parse_feed_message("PONG").unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_unknown_event_type_is_parse_error() {
        let raw = r#"{"event_type": "tick_size_change", "asset_id": "t"}"#;
        assert!(matches!(
            parse_feed_message(raw),
            Err(FeedError::Parse(_))
        ));
    }

    #[test]
    fn test_malformed_payload_is_parse_error() {
        assert!(matches!(
            parse_feed_message("{not json"),
            Err(FeedError::Parse(_))
        ));
    }

    #[test]
    fn test_bad_element_fails_whole_batch() {
        // One good event plus one with a non-decimal size: nothing parses.
        let raw = r#"[
            {"event_type": "book", "asset_id": "t", "market": "m", "bids": [], "asks": []},
            {"event_type": "changes", "asset_id": "t", "market": "m",
             "changes": [{"price": "0.40", "side": "BUY", "size": "abc"}]}
        ]"#;
        assert!(parse_feed_message(raw).is_err());
    }

    #[test]
    fn test_decimal_formatting_variants_compare_equal() {
        let a = parse_feed_message(
            r#"{"event_type": "book", "asset_id": "t", "market": "m",
                "bids": [{"price": "0.4", "size": "1"}], "asks": []}"#,
        )
        .unwrap();
        let b = parse_feed_message(
            r#"{"event_type": "book", "asset_id": "t", "market": "m",
                "bids": [{"price": "0.40", "size": "1"}], "asks": []}"#,
        )
        .unwrap();

        let (FeedEvent::Book(a), FeedEvent::Book(b)) = (&a[0], &b[0]) else {
            panic!("expected book events");
        };
        assert_eq!(a.bids[0].price, b.bids[0].price);
    }
}
