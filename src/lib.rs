//! Sable Gateway - core of a multi-exchange real-time crypto trading gateway
//!
//! Four cooperating components, leaves first: the lock-free `ringbus`
//! fabric (SPMC market-event ring, MPSC order-command queue), the
//! memory-mapped `journal`, the per-venue `adapter` state machines, and the
//! `fabric` typed event dispatcher that owns and wires the other three.

pub mod adapter;
pub mod config;
pub mod constants;
pub mod error;
pub mod fabric;
pub mod journal;
pub mod model;
pub mod ringbus;
pub mod utils;

// Re-export main components
pub use adapter::{ Adapter, AdapterState, OrderIdMap };
pub use config::GatewayConfig;
pub use error::{ GatewayError, Result };
pub use fabric::{ EventFabric, EventPayload, GatewayEvent };
pub use journal::{ JournalReader, JournalWriter };
pub use model::{ MarketEvent, Order, OrderCommand };
pub use ringbus::{ OrderQueue, RingBus };

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
