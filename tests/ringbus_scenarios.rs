//! Ring-bus cross-module scenarios: overwrite-on-wrap and MPSC ordering
//! under producer contention.

use sable_gateway::model::market_event::{ MarketEvent, MarketEventKind, TickerPayload };
use sable_gateway::model::order::{ OrderCommand, OrderCommandKind, OrderSide, OrderType };
use sable_gateway::{ OrderQueue, RingBus };
use std::sync::Arc;
use std::thread;

#[test]
fn scenario_ring_bus_overwrite_holds_last_capacity_events() {
    let ring: RingBus<MarketEvent> = RingBus::new(8).unwrap();
    let mut producer = ring.producer();

    // No consumer registered yet: publish far more than capacity.
    for i in 0..100u32 {
        producer.publish_with(|slot| {
            *slot = MarketEvent::ticker(1, 1, i, 0, TickerPayload { last_price: i as f64, ..Default::default() });
        });
    }

    let mut consumer = ring.consumer();
    let mut seen = Vec::new();
    consumer.poll(|slot| {
        if let Some(payload) = slot.as_ticker() {
            seen.push(payload.last_price as u32);
        }
    });

    // The ring only ever holds capacity-many live slots; a consumer that
    // registers after the flood sees nothing (its start position is the
    // producer's current position), which is the overwrite contract.
    assert!(seen.is_empty());
    assert_eq!(ring.producer_sequence(), 100);
}

#[test]
fn scenario_ring_bus_overwrite_keeps_last_capacity_for_subscribed_consumer() {
    let ring: RingBus<MarketEvent> = RingBus::new(4).unwrap();
    let mut producer = ring.producer();
    let consumer = ring.consumer();

    for i in 0..10u32 {
        producer.publish_with(|slot| {
            *slot = MarketEvent::ticker(1, 1, i, 0, TickerPayload::default());
        });
    }

    // A consumer registered before the flood detects the gap via lag
    // rather than silently reading stale or torn data.
    assert!((consumer.lag() as usize) > ring.capacity());
}

#[test]
fn scenario_mpsc_ordering_under_four_producers() {
    // Capacity must cover the full 4 * per_producer volume: producers only
    // push here, nothing drains until after they join, and (per
    // mpsc_queue.h's algorithm) a slot only ever reports "full" after it
    // has been popped at least once, not on a bare wraparound.
    let queue: Arc<OrderQueue<OrderCommand>> = Arc::new(OrderQueue::new(4096).unwrap());
    let per_producer = 500u32;

    let handles: Vec<_> = (0..4u32)
        .map(|producer_id| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..per_producer {
                    let command = OrderCommand {
                        kind: OrderCommandKind::Place,
                        venue_id: 1,
                        symbol_id: 1,
                        side: OrderSide::Buy,
                        order_type: OrderType::Limit,
                        quantity: 1.0,
                        price: 100.0,
                        strategy_id: producer_id * 1000 + i,
                        ..Default::default()
                    };
                    queue.push(command);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let mut drained = Vec::new();
    loop {
        let before = drained.len();
        queue.pop_batch(&mut drained, 4096);
        if drained.len() == before {
            break;
        }
    }

    // Exactly N = 4 * per_producer commands observed: no loss, no duplication.
    assert_eq!(drained.len() as u32, 4 * per_producer);

    let mut seen_ids: Vec<u32> = drained.iter().map(|c| c.strategy_id).collect();
    seen_ids.sort_unstable();
    seen_ids.dedup();
    assert_eq!(seen_ids.len() as u32, 4 * per_producer);
}

#[test]
fn scenario_single_consumer_keeps_up_with_zero_gap() {
    let ring: RingBus<MarketEvent> = RingBus::new(256).unwrap();
    let mut producer = ring.producer();
    let mut consumer = ring.consumer();

    for i in 0..1000u32 {
        producer.publish_with(|slot| {
            *slot = MarketEvent::ticker(1, 1, i, 0, TickerPayload::default());
        });
        consumer.poll(|slot| assert_eq!(slot.kind, MarketEventKind::Ticker));
    }

    assert_eq!(consumer.lag(), 0);
}
