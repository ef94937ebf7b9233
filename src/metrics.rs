//! Prometheus counters for the feed core
//!
//! Registered against the default registry and exposed by the health
//! server's `/metrics` endpoint.

use prometheus::{register_int_counter, IntCounter};
use std::sync::OnceLock;

static RECONNECTS: OnceLock<IntCounter> = OnceLock::new();
static PARSE_FAILURES: OnceLock<IntCounter> = OnceLock::new();
static EVENTS_APPLIED: OnceLock<IntCounter> = OnceLock::new();

/// Reconnect attempts scheduled after transport errors or unexpected closes
pub fn reconnects_total() -> &'static IntCounter {
    RECONNECTS.get_or_init(|| {
        register_int_counter!(
            "polypro_feed_reconnects_total",
            "Feed connection reconnect attempts"
        )
        .unwrap()
    })
}

/// Wire messages dropped because they failed to parse
pub fn parse_failures_total() -> &'static IntCounter {
    PARSE_FAILURES.get_or_init(|| {
        register_int_counter!(
            "polypro_feed_parse_failures_total",
            "Feed messages dropped due to parse errors"
        )
        .unwrap()
    })
}

/// Feed events applied to book or own-order state
pub fn events_applied_total() -> &'static IntCounter {
    EVENTS_APPLIED.get_or_init(|| {
        register_int_counter!(
            "polypro_feed_events_applied_total",
            "Feed events applied to ledger state"
        )
        .unwrap()
    })
}
