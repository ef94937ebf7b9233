//! Own-order ledger
//!
//! Tracks the viewer's resting orders from the user-channel lifecycle
//! stream. This state lives beside the order books and is only ever joined
//! against them at display time by token id; it is never written into a book.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::parser::{LifecycleKind, OrderEvent, OrderSide, OrderStatus};

/// One resting order owned by the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnOrder {
    pub id: String,
    pub asset_id: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub original_size: Decimal,
    pub size_matched: Decimal,
    pub status: OrderStatus,
}

impl OwnOrder {
    /// Live and not yet fully matched: the only orders worth overlaying
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Live && self.size_matched != self.original_size
    }
}

/// Ledger of the viewer's resting orders, keyed by order id
#[derive(Debug, Default)]
pub struct OwnOrderLedger {
    orders: HashMap<String, OwnOrder>,
}

impl OwnOrderLedger {
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
        }
    }

    /// Apply one lifecycle event.
    ///
    /// Duplicate PLACEMENTs are idempotent no-ops. UPDATEs for unknown ids
    /// are ignored: they may refer to an order placed before a reconnect gap
    /// and are benign staleness, not errors. Fully matched orders are not
    /// retained. CANCELLATION of an absent id is a no-op.
    pub fn apply(&mut self, event: &OrderEvent) {
        match event.kind {
            LifecycleKind::Placement => {
                self.orders
                    .entry(event.id.clone())
                    .or_insert_with(|| OwnOrder {
                        id: event.id.clone(),
                        asset_id: event.asset_id.clone(),
                        side: event.side,
                        price: event.price,
                        original_size: event.original_size,
                        size_matched: event.size_matched,
                        status: event.status,
                    });
            }
            LifecycleKind::Update => {
                if let Some(order) = self.orders.get_mut(&event.id) {
                    order.size_matched = event.size_matched;
                    order.status = event.status;
                    if order.size_matched == order.original_size {
                        self.orders.remove(&event.id);
                    }
                }
            }
            LifecycleKind::Cancellation => {
                self.orders.remove(&event.id);
            }
        }
    }

    /// Live, not-fully-matched orders resting on token `asset_id`
    pub fn open_orders(&self, asset_id: &str) -> Vec<OwnOrder> {
        let mut open: Vec<OwnOrder> = self
            .orders
            .values()
            .filter(|order| order.asset_id == asset_id && order.is_open())
            .cloned()
            .collect();
        open.sort_by(|a, b| a.id.cmp(&b.id));
        open
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn placement(id: &str, asset_id: &str) -> OrderEvent {
        OrderEvent {
            kind: LifecycleKind::Placement,
            id: id.to_string(),
            asset_id: asset_id.to_string(),
            side: OrderSide::Buy,
            price: dec!(0.40),
            original_size: dec!(1000),
            size_matched: Decimal::ZERO,
            status: OrderStatus::Live,
        }
    }

    fn update(id: &str, matched: Decimal, status: OrderStatus) -> OrderEvent {
        OrderEvent {
            kind: LifecycleKind::Update,
            size_matched: matched,
            status,
            ..placement(id, "token-yes")
        }
    }

    #[test]
    fn test_placement_then_partial_fill() {
        let mut ledger = OwnOrderLedger::new();
        ledger.apply(&placement("o1", "token-yes"));
        ledger.apply(&update("o1", dec!(400), OrderStatus::Live));

        let open = ledger.open_orders("token-yes");
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].size_matched, dec!(400));
    }

    #[test]
    fn test_duplicate_placement_is_idempotent() {
        let mut ledger = OwnOrderLedger::new();
        ledger.apply(&placement("o1", "token-yes"));
        ledger.apply(&update("o1", dec!(400), OrderStatus::Live));
        ledger.apply(&placement("o1", "token-yes"));

        // The second placement does not reset the matched size.
        assert_eq!(ledger.open_orders("token-yes")[0].size_matched, dec!(400));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_fully_matched_order_is_dropped() {
        let mut ledger = OwnOrderLedger::new();
        ledger.apply(&placement("o1", "token-yes"));
        ledger.apply(&update("o1", dec!(1000), OrderStatus::Matched));

        assert!(ledger.open_orders("token-yes").is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_update_for_unknown_id_is_ignored() {
        let mut ledger = OwnOrderLedger::new();
        ledger.apply(&update("ghost", dec!(10), OrderStatus::Live));

        assert!(ledger.is_empty());
    }

    #[test]
    fn test_cancellation_removes_and_absent_is_noop() {
        let mut ledger = OwnOrderLedger::new();
        ledger.apply(&placement("o1", "token-yes"));

        let cancel = OrderEvent {
            kind: LifecycleKind::Cancellation,
            ..placement("o1", "token-yes")
        };
        ledger.apply(&cancel);
        assert!(ledger.is_empty());

        // Cancelling again raises nothing.
        ledger.apply(&cancel);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_open_orders_filtered_by_token() {
        let mut ledger = OwnOrderLedger::new();
        ledger.apply(&placement("o1", "token-yes"));
        ledger.apply(&placement("o2", "token-no"));

        assert_eq!(ledger.open_orders("token-yes").len(), 1);
        assert_eq!(ledger.open_orders("token-no").len(), 1);
        assert!(ledger.open_orders("token-other").is_empty());
    }
}
