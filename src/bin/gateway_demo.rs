//! Manual smoke-test harness for the gateway core
//!
//! Wires a `RingBus<MarketEvent>`, an `OrderQueue<OrderCommand>`, a
//! `JournalWriter`/`JournalReader` pair, and an `EventFabric` together and
//! pushes a burst of synthetic market data and order commands through them,
//! printing throughput the way the teacher's `main.rs` demonstrates the
//! disruptor ring buffer. Exercises the wiring end to end; it does not
//! connect to a real venue (that's `adapter::{binance, okx}`, covered by
//! their own unit tests).

use sable_gateway::config::GatewayConfig;
use sable_gateway::fabric::{ EventFabric, EventPayload, GatewayEvent, Listener };
use sable_gateway::journal::{ JournalReader, JournalWriter };
use sable_gateway::model::event::EventKind;
use sable_gateway::model::market_event::{ MarketEvent, TickerPayload };
use sable_gateway::model::order::{ OrderCommand, OrderCommandKind, OrderSide, OrderType };
use sable_gateway::model::symbol::VenueId;
use sable_gateway::utils::{ get_system_info, pin_to_cpu, Timer };
use sable_gateway::{ OrderQueue, RingBus };
use std::sync::Arc;
use std::sync::atomic::{ AtomicUsize, Ordering };

struct CountingListener {
    id: u64,
    count: AtomicUsize,
}

impl Listener for CountingListener {
    fn id(&self) -> u64 {
        self.id
    }

    fn on_event(&self, event: &GatewayEvent) {
        if let EventPayload::Ticker(ticker) = event.payload.as_ref() {
            tracing::debug!(symbol = %ticker.symbol, price = ticker.last_price, "ticker observed");
        }
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Sable Gateway - multi-exchange real-time trading core");
    println!("RingBus + Journal + EventFabric + per-venue adapters");
    println!("======================================================");

    let sys_info = get_system_info();
    println!("\nSystem Information:");
    println!("  CPU cores: {}", sys_info.cpu_count);
    println!("  Cache line size: {} bytes", sys_info.cache_line_size);
    println!("  Page size: {} bytes", sys_info.page_size);

    if let Err(e) = pin_to_cpu(sable_gateway::constants::DEFAULT_PRODUCER_CPU_CORE) {
        println!("Warning: could not pin to CPU {}: {e}", sable_gateway::constants::DEFAULT_PRODUCER_CPU_CORE);
    } else {
        println!("Pinned to CPU {} for the market-data producer", sable_gateway::constants::DEFAULT_PRODUCER_CPU_CORE);
    }

    let config = GatewayConfig::default();
    config.validate()?;

    println!("\nBuilding core components...");
    let ring: RingBus<MarketEvent> = RingBus::new(config.ring_capacity)?;
    let order_queue: OrderQueue<OrderCommand> = OrderQueue::new(config.queue_capacity)?;
    println!("  RingBus capacity: {}", ring.capacity());
    println!("  OrderQueue capacity: {}", order_queue.capacity());

    let journal_path = std::env::temp_dir().join(format!("gateway_demo_{}.journal", std::process::id()));
    let mut journal_writer = JournalWriter::create(&journal_path, config.journal_page_size)?;

    let fabric = Arc::new(EventFabric::new());
    let listener = Arc::new(CountingListener { id: 1, count: AtomicUsize::new(0) });
    fabric.register_listener(EventKind::Ticker, listener.clone(), true)?;

    println!("\nPublishing synthetic market data through the ring...");
    let mut producer = ring.producer();
    let mut consumer = ring.consumer();
    let timer = Timer::new();
    let tick_count = 100_000u32;

    for i in 0..tick_count {
        let price = 50_000.0 + (i % 1000) as f64;
        producer.publish_with(|slot| {
            *slot = MarketEvent::ticker(1, VenueId::Binance as u8, i, 0, TickerPayload {
                last_price: price,
                bid_price: price - 0.5,
                ask_price: price + 0.5,
                bid_size: 1.0,
                ask_size: 1.0,
                volume_24h: 1000.0,
            });
        });
        journal_writer.write_ticker("BTCUSDT", price, price - 0.5, price + 0.5, 1.0, VenueId::Binance as u8);
    }

    let mut processed = 0usize;
    consumer.poll(|slot| {
        if let Some(ticker_payload) = slot.as_ticker() {
            fabric.put(GatewayEvent::new(EventKind::Ticker, EventPayload::Ticker(sable_gateway::model::market_data::Ticker {
                symbol: "BTCUSDT".to_string(),
                exchange: "binance".to_string(),
                last_price: ticker_payload.last_price,
                ..Default::default()
            })), 0);
            processed += 1;
        }
    });

    let elapsed = timer.elapsed_nanos();
    let throughput = (tick_count as f64) / ((elapsed as f64) / sable_gateway::constants::NANOS_PER_SEC);
    println!("  Ticks published: {tick_count}");
    println!("  Ticks consumed + dispatched: {processed}");
    println!("  Throughput: {:.2} K ticks/sec", throughput / 1000.0);
    println!("  Listener observed {} events", listener.count.load(Ordering::Relaxed));
    println!("  Consumer lag: {}", consumer.lag());

    println!("\nReading back the journal...");
    drop(journal_writer);
    let mut journal_reader = JournalReader::open(&journal_path)?;
    let mut journaled = 0usize;
    journal_reader.poll(|_record| {
        journaled += 1;
    })?;
    println!("  Frames replayed from the journal: {journaled}");

    println!("\nExercising the order-command queue...");
    for i in 0..16u32 {
        let mut command = OrderCommand {
            kind: OrderCommandKind::Place,
            venue_id: VenueId::Binance as u8,
            symbol_id: 1,
            side: if i % 2 == 0 { OrderSide::Buy } else { OrderSide::Sell },
            order_type: OrderType::Limit,
            quantity: 0.01,
            price: 50_000.0,
            ..Default::default()
        };
        command.client_order_id = sable_gateway::model::order::ClientOrderId::new(&format!("demo-{i}"));
        order_queue.push(command);
    }
    let mut drained = Vec::new();
    order_queue.pop_batch(&mut drained, 32);
    println!("  Order commands drained: {}", drained.len());

    println!("\nNext steps:");
    println!("  1. Point adapter::binance::BinanceAdapter / adapter::okx::OkxAdapter at live credentials");
    println!("  2. Subscribe to real venue market data and route orders through EventFabric listeners");
    println!("  3. Size RingBus/OrderQueue/journal page capacity for the target symbol count");

    drop(journal_reader);
    let _ = std::fs::remove_file(&journal_path);

    Ok(())
}
