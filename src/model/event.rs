//! Event base type and the closed dispatch-key enum for the fabric hot path
//!
//! Grounded on the original `trading::Event` base class: every event carries
//! a timestamp, a source tag, and a producer id used for `ignore_self`
//! loop-suppression. The C++ source dispatches by `typeid(*event)` (an
//! open-set `std::type_index` table); per the REDESIGN FLAGS this is
//! replaced on the hot path by a closed `EventKind` discriminant, with the
//! open-set table reserved for rich extension events.

use std::sync::Arc;
use std::time::{ SystemTime, UNIX_EPOCH };

/// Closed set of dispatch keys for events that flow through the fabric's
/// hot path. Extension events (adapter status, diagnostics, opaque
/// account-update payloads) are dispatched through the open-set name table
/// instead of this enum, see `fabric::EventFabric::register_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ticker,
    Trade,
    Kline,
    OrderBook,
    MarkPrice,
    OrderReport,
    AdapterStatus,
    AccountUpdate,
}

/// Monotonic nanosecond timestamp since the Unix epoch.
pub fn now_ns() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

/// Rich, reference-counted event envelope used on the EventFabric side of
/// the boundary (as opposed to the flat POD `MarketEvent` that lives on the
/// ring). `payload` carries the actual event body; `kind` is the dispatch
/// key matched against registered listeners.
#[derive(Debug, Clone)]
pub struct FabricEvent<T> {
    pub kind: EventKind,
    /// Nanosecond timestamp; 0 until the fabric stamps it on `put`.
    pub ts_ns: i64,
    /// Id of the listener that produced this event, for `ignore_self`.
    pub producer_id: u64,
    pub payload: Arc<T>,
}

impl<T> FabricEvent<T> {
    pub fn new(kind: EventKind, payload: T) -> Self {
        Self {
            kind,
            ts_ns: 0,
            producer_id: 0,
            payload: Arc::new(payload),
        }
    }

    /// Derive a new event from this one with timestamp/producer cleared,
    /// mirroring `Event::derive()` in the source.
    pub fn derive(&self) -> Self {
        Self {
            kind: self.kind,
            ts_ns: 0,
            producer_id: 0,
            payload: self.payload.clone(),
        }
    }
}
