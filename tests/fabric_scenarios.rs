//! EventFabric cross-module scenarios: dispatch ordering, `ignore_self`
//! suppression, and listener panic isolation.

use parking_lot::Mutex;
use sable_gateway::fabric::{ EventFabric, EventPayload, GatewayEvent, Listener };
use sable_gateway::model::event::EventKind;
use sable_gateway::model::market_data::Ticker;
use std::sync::Arc;

struct RecordingListener {
    id: u64,
    label: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Listener for RecordingListener {
    fn id(&self) -> u64 {
        self.id
    }

    fn on_event(&self, _event: &GatewayEvent) {
        self.log.lock().push(self.label);
    }
}

struct PanickingListener {
    id: u64,
}

impl Listener for PanickingListener {
    fn id(&self) -> u64 {
        self.id
    }

    fn on_event(&self, _event: &GatewayEvent) {
        panic!("listener blew up");
    }
}

fn ticker_event() -> GatewayEvent {
    GatewayEvent::new(EventKind::Ticker, EventPayload::Ticker(Ticker::default()))
}

#[test]
fn scenario_dispatch_order_is_senior_then_typed_then_junior() {
    let fabric = EventFabric::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    fabric
        .register_global_listener(Arc::new(RecordingListener { id: 1, label: "senior", log: log.clone() }), true, false)
        .unwrap();
    fabric.register_listener(EventKind::Ticker, Arc::new(RecordingListener { id: 2, label: "typed", log: log.clone() }), false).unwrap();
    fabric
        .register_global_listener(Arc::new(RecordingListener { id: 3, label: "junior", log: log.clone() }), false, false)
        .unwrap();

    fabric.put(ticker_event(), 0);

    assert_eq!(*log.lock(), vec!["senior", "typed", "junior"]);
}

#[test]
fn scenario_ignore_self_suppresses_only_the_self_produced_case() {
    let fabric = EventFabric::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let listener = Arc::new(RecordingListener { id: 42, label: "listener", log: log.clone() });
    fabric.register_listener(EventKind::Ticker, listener, true).unwrap();

    fabric.put(ticker_event(), 42); // produced by the listener itself
    assert!(log.lock().is_empty());

    fabric.put(ticker_event(), 7); // produced by someone else
    assert_eq!(*log.lock(), vec!["listener"]);
}

#[test]
fn scenario_listener_panic_does_not_halt_subsequent_listeners() {
    let fabric = EventFabric::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    fabric.register_listener(EventKind::Ticker, Arc::new(PanickingListener { id: 1 }), false).unwrap();
    fabric
        .register_listener(EventKind::Ticker, Arc::new(RecordingListener { id: 2, label: "survivor", log: log.clone() }), false)
        .unwrap();

    fabric.put(ticker_event(), 0);

    assert_eq!(*log.lock(), vec!["survivor"]);
}

#[test]
fn scenario_registration_fails_fast_while_dispatching() {
    struct ReentrantListener {
        id: u64,
        fabric: Arc<EventFabric>,
        reentrant_result: Arc<Mutex<Option<bool>>>,
    }

    impl Listener for ReentrantListener {
        fn id(&self) -> u64 {
            self.id
        }

        fn on_event(&self, _event: &GatewayEvent) {
            let dummy = Arc::new(PanickingListener { id: 99 });
            let result = self.fabric.register_listener(EventKind::Trade, dummy, false);
            *self.reentrant_result.lock() = Some(result.is_ok());
        }
    }

    let fabric = Arc::new(EventFabric::new());
    let reentrant_result = Arc::new(Mutex::new(None));
    fabric
        .register_listener(
            EventKind::Ticker,
            Arc::new(ReentrantListener { id: 1, fabric: fabric.clone(), reentrant_result: reentrant_result.clone() }),
            false
        )
        .unwrap();

    fabric.put(ticker_event(), 0);

    assert_eq!(*reentrant_result.lock(), Some(false));

    // Outside of dispatch, registration succeeds again.
    assert!(fabric.register_listener(EventKind::Kline, Arc::new(PanickingListener { id: 100 }), false).is_ok());
}
