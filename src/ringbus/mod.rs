//! Lock-free ring-bus fabric: SPMC market-event ring, MPSC order-command
//! queue, and an SPSC variant for single-strategy hot paths.
//!
//! Grounded on the teacher's `disruptor` module's cache-line isolation and
//! claim/publish idiom, narrowed to the two shapes the gateway core
//! actually needs instead of the teacher's general `RingBuffer<T>` plus
//! pluggable `WaitStrategy`.

mod mpsc;
mod spmc;
mod spsc;

pub use mpsc::OrderQueue;
pub use spmc::{ Consumer, Producer, RingBus };
pub use spsc::SpscQueue;
