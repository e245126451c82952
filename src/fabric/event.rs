//! Event payload catalog and the `Listener` trait
//!
//! `GatewayEvent` reuses the rich `model::event::FabricEvent` envelope,
//! fixing its payload to the closed `EventPayload` sum type so a single
//! dispatcher can hold heterogeneous events behind one listener trait.

use crate::model::event::FabricEvent;
use crate::model::market_data::{ Kline, Ticker, Trade };
use crate::model::market_event::MarkPricePayload;
use crate::model::order::Order;
use crate::model::symbol::VenueId;

/// Concrete payload carried by a `GatewayEvent`. Market-data and order
/// variants mirror the rich, non-ring types in `model`; `AdapterStatus` and
/// `AccountUpdate` are extension events that never touch the ring at all.
#[derive(Debug, Clone)]
pub enum EventPayload {
    Ticker(Ticker),
    Trade(Trade),
    OrderBook(crate::model::market_data::OrderBook),
    Kline(Kline),
    MarkPrice(MarkPricePayload),
    OrderReport(Order),
    AdapterStatus { venue: VenueId, kind: AdapterStatusKind, detail: String },
    /// Opaque pass-through for `ACCOUNT_UPDATE` user-data-stream payloads,
    /// per the binding decision to carry the exchange's JSON unparsed
    /// rather than model every balance/position field up front.
    AccountUpdate(serde_json::Value),
}

/// Lifecycle transitions an adapter reports about its own connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterStatusKind {
    Connecting,
    Connected,
    Disconnected,
    Reconnecting,
    SubscriptionReplayed,
    RateLimited,
}

/// A fully typed event flowing through the fabric. Built with
/// `GatewayEvent::new(kind, payload)` (the generic constructor on
/// `FabricEvent`); `ts_ns` is left at 0 for the fabric to stamp.
pub type GatewayEvent = FabricEvent<EventPayload>;

/// Receiver of dispatched `GatewayEvent`s. `id` identifies the listener for
/// `ignore_self` suppression (and, for strategies that are themselves
/// producers, should match the `producer_id` they pass to `put`).
pub trait Listener: Send + Sync {
    fn id(&self) -> u64;
    fn on_event(&self, event: &GatewayEvent);
}

/// Convenience alias for a closure-backed listener, mirroring the trait's
/// shape so call sites can use either a type or a closure without
/// additional plumbing.
pub type ListenerFn = Box<dyn Fn(&GatewayEvent) + Send + Sync>;

/// Wraps a plain closure as a `Listener` with a caller-supplied id.
pub struct FnListener {
    id: u64,
    f: ListenerFn,
}

impl FnListener {
    pub fn new(id: u64, f: impl Fn(&GatewayEvent) + Send + Sync + 'static) -> Self {
        Self { id, f: Box::new(f) }
    }
}

impl Listener for FnListener {
    fn id(&self) -> u64 {
        self.id
    }

    fn on_event(&self, event: &GatewayEvent) {
        (self.f)(event)
    }
}
