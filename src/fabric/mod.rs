//! Typed in-process event bus
//!
//! Dispatches `GatewayEvent`s to registered listeners in a fixed order.
//! Grounded on the original `event_engine.h`'s
//! `register_listener`/`put`/`inject`/`call` surface, with the dispatch key
//! realized as the closed `EventKind` enum instead of the source's open
//! `std::type_index` table. The open-set table survives narrowed to the
//! name-indexed callable registry and to extension events (`AdapterStatus`,
//! pass-through `AccountUpdate`) that don't fit a closed variant set.

mod event;
mod registry;

pub use event::{ AdapterStatusKind, EventPayload, GatewayEvent, Listener, ListenerFn };

use crate::error::{ GatewayError, Result };
use crate::model::event::{ now_ns, EventKind };
use parking_lot::{ Mutex, RwLock };
use registry::CallableRegistry;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::atomic::{ AtomicBool, AtomicI64, Ordering };
use std::sync::Arc;

struct Registration {
    listener: Arc<dyn Listener>,
    ignore_self: bool,
}

#[derive(Default)]
struct ListenerTable {
    by_kind: std::collections::HashMap<EventKind, Vec<Registration>>,
    senior_global: Vec<Registration>,
    junior_global: Vec<Registration>,
}

/// Typed event dispatcher. Cheap to clone (internally `Arc`-backed state
/// would be added by a caller wrapping it); construct one per process.
pub struct EventFabric {
    listeners: RwLock<ListenerTable>,
    queue: Mutex<VecDeque<GatewayEvent>>,
    /// Set for the duration of a `put`-triggered drain; registration calls
    /// fail fast while this is true.
    dispatching: AtomicBool,
    /// Elects a single drainer among concurrent `put` callers.
    draining: AtomicBool,
    /// Fabric's own monotonic clock, advanced by `put` per the timestamp
    /// discipline (stamp zero timestamps, never move backwards).
    clock_ns: AtomicI64,
    callables: CallableRegistry,
}

impl Default for EventFabric {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFabric {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(ListenerTable::default()),
            queue: Mutex::new(VecDeque::new()),
            dispatching: AtomicBool::new(false),
            draining: AtomicBool::new(false),
            clock_ns: AtomicI64::new(0),
            callables: CallableRegistry::new(),
        }
    }

    fn guard_quiescent(&self) -> Result<()> {
        if self.dispatching.load(Ordering::Acquire) {
            return Err(GatewayError::FabricBusy);
        }
        Ok(())
    }

    /// Register a listener for a single event kind. Fails if the fabric is
    /// mid-dispatch.
    pub fn register_listener(&self, kind: EventKind, listener: Arc<dyn Listener>, ignore_self: bool) -> Result<()> {
        self.guard_quiescent()?;
        self.listeners.write().by_kind.entry(kind).or_default().push(Registration { listener, ignore_self });
        Ok(())
    }

    /// Register a global listener. Senior listeners run before
    /// type-specific ones for every event; junior ones run after.
    pub fn register_global_listener(&self, listener: Arc<dyn Listener>, is_senior: bool, ignore_self: bool) -> Result<()> {
        self.guard_quiescent()?;
        let mut table = self.listeners.write();
        let reg = Registration { listener, ignore_self };
        if is_senior {
            table.senior_global.push(reg);
        } else {
            table.junior_global.push(reg);
        }
        Ok(())
    }

    /// Stamp and advance the fabric's clock per the timestamp discipline:
    /// zero timestamps get the fabric's current clock; timestamps ahead of
    /// the fabric's clock advance it (the clock is monotonic
    /// non-decreasing, never stepped backwards by a late event).
    fn stamp(&self, event: &mut GatewayEvent) {
        if event.ts_ns == 0 {
            event.ts_ns = now_ns().max(self.clock_ns.load(Ordering::Acquire));
        }
        let mut observed = self.clock_ns.load(Ordering::Acquire);
        while event.ts_ns > observed {
            match self.clock_ns.compare_exchange_weak(observed, event.ts_ns, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => break,
                Err(actual) => observed = actual,
            }
        }
    }

    /// Enqueue an event from `producer_id`. If no other thread is
    /// currently draining, this call becomes the drainer and processes the
    /// queue (including anything enqueued by other threads mid-drain)
    /// until empty.
    pub fn put(&self, mut event: GatewayEvent, producer_id: u64) {
        event.producer_id = producer_id;
        self.stamp(&mut event);
        self.queue.lock().push_back(event);

        if self.draining.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            self.dispatching.store(true, Ordering::Release);
            loop {
                let next = self.queue.lock().pop_front();
                match next {
                    Some(event) => self.dispatch_one(&event),
                    None => break,
                }
            }
            self.dispatching.store(false, Ordering::Release);
            self.draining.store(false, Ordering::Release);
        }
    }

    fn invoke(listener: &Registration, event: &GatewayEvent) {
        if listener.ignore_self && event.producer_id == listener.listener.id() {
            return;
        }
        // An exception inside a listener must not abort dispatch: it is
        // logged and the next listener continues.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            listener.listener.on_event(event);
        }));
        if let Err(panic) = result {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "listener panicked".to_string());
            tracing::error!(listener_id = listener.listener.id(), error = %message, "event listener panicked; continuing dispatch");
        }
    }

    fn dispatch_one(&self, event: &GatewayEvent) {
        let table = self.listeners.read();
        for listener in &table.senior_global {
            Self::invoke(listener, event);
        }
        if let Some(list) = table.by_kind.get(&event.kind) {
            for listener in list {
                Self::invoke(listener, event);
            }
        }
        for listener in &table.junior_global {
            Self::invoke(listener, event);
        }
    }

    /// Register a name-indexed callable, invoked without a compile-time
    /// dependency on its implementation (e.g. a strategy asking the
    /// account manager for a snapshot).
    pub fn inject<F>(&self, name: impl Into<String>, f: F) where F: Fn() -> Box<dyn Any + Send> + Send + Sync + 'static {
        self.callables.inject(name, f);
    }

    /// Invoke a previously injected callable and downcast its result.
    /// Returns `None` if no callable is registered under `name` or the
    /// result type does not match `R`.
    pub fn call<R: 'static>(&self, name: &str) -> Option<R> {
        self.callables.call(name)
    }

    pub fn current_clock_ns(&self) -> i64 {
        self.clock_ns.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingListener {
        id: u64,
        count: Arc<AtomicUsize>,
    }

    impl Listener for CountingListener {
        fn id(&self) -> u64 {
            self.id
        }
        fn on_event(&self, _event: &GatewayEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct OrderRecordingListener {
        order: Arc<Mutex<Vec<&'static str>>>,
        tag: &'static str,
    }

    impl Listener for OrderRecordingListener {
        fn id(&self) -> u64 {
            0
        }
        fn on_event(&self, _event: &GatewayEvent) {
            self.order.lock().push(self.tag);
        }
    }

    struct PanickingListener;
    impl Listener for PanickingListener {
        fn id(&self) -> u64 {
            99
        }
        fn on_event(&self, _event: &GatewayEvent) {
            panic!("boom");
        }
    }

    fn ticker_event() -> GatewayEvent {
        GatewayEvent::new(EventKind::Ticker, EventPayload::Ticker(crate::model::market_data::Ticker::default()))
    }

    fn trade_event() -> GatewayEvent {
        GatewayEvent::new(EventKind::Trade, EventPayload::Trade(crate::model::market_data::Trade::default()))
    }

    #[test]
    fn test_type_listener_invoked_once_per_matching_event() {
        let fabric = EventFabric::new();
        let count = Arc::new(AtomicUsize::new(0));
        fabric
            .register_listener(EventKind::Ticker, Arc::new(CountingListener { id: 1, count: count.clone() }), true)
            .unwrap();
        fabric.put(ticker_event(), 0);
        fabric.put(trade_event(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_listener_order_senior_then_type_then_junior() {
        let fabric = EventFabric::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        fabric
            .register_global_listener(Arc::new(OrderRecordingListener { order: order.clone(), tag: "senior" }), true, false)
            .unwrap();
        fabric
            .register_listener(EventKind::Ticker, Arc::new(OrderRecordingListener { order: order.clone(), tag: "typed" }), false)
            .unwrap();
        fabric
            .register_global_listener(Arc::new(OrderRecordingListener { order: order.clone(), tag: "junior" }), false, false)
            .unwrap();

        fabric.put(ticker_event(), 0);
        assert_eq!(*order.lock(), vec!["senior", "typed", "junior"]);
    }

    #[test]
    fn test_ignore_self_suppresses_self_produced_event() {
        let fabric = EventFabric::new();
        let count = Arc::new(AtomicUsize::new(0));
        fabric
            .register_listener(EventKind::Ticker, Arc::new(CountingListener { id: 42, count: count.clone() }), true)
            .unwrap();
        fabric.put(ticker_event(), 42);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        fabric.put(ticker_event(), 7);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_in_listener_does_not_abort_dispatch() {
        let fabric = EventFabric::new();
        let count = Arc::new(AtomicUsize::new(0));
        fabric.register_listener(EventKind::Ticker, Arc::new(PanickingListener), false).unwrap();
        fabric
            .register_listener(EventKind::Ticker, Arc::new(CountingListener { id: 2, count: count.clone() }), false)
            .unwrap();
        fabric.put(ticker_event(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registration_while_dispatching_fails_fast() {
        struct RegisteringListener {
            fabric: *const EventFabric,
        }
        // SAFETY: test confines the raw pointer to the fabric's own stack
        // frame and never dereferences it outside `on_event`.
        unsafe impl Send for RegisteringListener {}
        unsafe impl Sync for RegisteringListener {}
        impl Listener for RegisteringListener {
            fn id(&self) -> u64 {
                0
            }
            fn on_event(&self, _event: &GatewayEvent) {
                let fabric = unsafe { &*self.fabric };
                let result = fabric.register_listener(EventKind::Trade, Arc::new(PanickingListener), false);
                assert!(result.is_err());
            }
        }

        let fabric = EventFabric::new();
        let fabric_ptr: *const EventFabric = &fabric;
        fabric.register_listener(EventKind::Ticker, Arc::new(RegisteringListener { fabric: fabric_ptr }), false).unwrap();
        fabric.put(ticker_event(), 0);
    }

    #[test]
    fn test_inject_and_call_round_trip() {
        let fabric = EventFabric::new();
        fabric.inject("balance", || Box::new(123.45f64));
        let result: Option<f64> = fabric.call("balance");
        assert_eq!(result, Some(123.45));
        let missing: Option<f64> = fabric.call("unknown");
        assert_eq!(missing, None);
    }

    #[test]
    fn test_timestamp_discipline_stamps_zero_and_advances_clock() {
        let fabric = EventFabric::new();
        let mut event = ticker_event();
        event.ts_ns = 0;
        fabric.put(event, 0);
        assert!(fabric.current_clock_ns() > 0);

        let clock_before = fabric.current_clock_ns();
        let mut future_event = ticker_event();
        future_event.ts_ns = clock_before + 1_000_000_000;
        fabric.put(future_event, 0);
        assert_eq!(fabric.current_clock_ns(), clock_before + 1_000_000_000);
    }
}
