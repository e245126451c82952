//! Exchange adapter trait and shared per-venue machinery
//!
//! Each concrete adapter (`adapter::binance::BinanceAdapter`,
//! `adapter::okx::OkxAdapter`) owns its full per-venue lifecycle: WS
//! connect/reconnect, signing, REST order placement, order-id mapping, and
//! (where applicable) user-stream listen-key rotation. This module holds
//! what both share: the `Adapter` trait itself, the connection-type and
//! lifecycle-state enums, the order-id map, and the listen-key refresher.

pub mod binance;
pub mod okx;
pub mod signing;
pub mod ws_client;

use crate::error::Result;
use crate::model::order::{ Order, OrderCommand };
use crate::model::symbol::VenueId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Which of an adapter's (up to four) WebSocket connections a message
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WsConnectionType {
    Market,
    Business,
    UserData,
    Trading,
}

/// Adapter top-level lifecycle state.
///
/// ```text
/// Created -> Starting -> Connected <-> Reconnecting
///                            |
///                            v
///                        Stopping -> Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Created,
    Starting,
    Connected,
    Reconnecting,
    Stopping,
    Stopped,
}

impl AdapterState {
    /// `stop()` drives the adapter to `Stopping` regardless of its current
    /// state (except a state already terminal).
    pub fn can_stop(&self) -> bool {
        !matches!(self, Self::Stopping | Self::Stopped)
    }
}

/// Order-id mapping shared by every venue adapter: `client_id -> Order`
/// (owning) and `exchange_id -> client_id` (lookup), both updated on a
/// SUBMITTED acknowledgment and consulted on every order-update push.
#[derive(Default)]
pub struct OrderIdMap {
    by_client: Mutex<HashMap<String, Order>>,
    by_exchange: Mutex<HashMap<String, String>>,
}

impl OrderIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) {
        self.by_client.lock().insert(order.client_order_id.clone(), order);
    }

    pub fn link_exchange_id(&self, exchange_order_id: impl Into<String>, client_order_id: impl Into<String>) {
        self.by_exchange.lock().insert(exchange_order_id.into(), client_order_id.into());
    }

    pub fn get_by_client(&self, client_order_id: &str) -> Option<Order> {
        self.by_client.lock().get(client_order_id).cloned()
    }

    pub fn get_by_exchange(&self, exchange_order_id: &str) -> Option<Order> {
        let client_id = self.by_exchange.lock().get(exchange_order_id).cloned()?;
        self.get_by_client(&client_id)
    }

    /// Apply `f` to the order keyed by `client_order_id` in place, returning
    /// whether an order was found. Used to record state transitions and
    /// fills without a read-then-write race against another updater.
    pub fn update_by_client(&self, client_order_id: &str, f: impl FnOnce(&mut Order)) -> bool {
        let mut map = self.by_client.lock();
        match map.get_mut(client_order_id) {
            Some(order) => {
                f(order);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, client_order_id: &str) -> Option<Order> {
        self.by_client.lock().remove(client_order_id)
    }
}

/// Shared interface every venue adapter implements. `start`/`stop` are
/// synchronous: they hand work to the adapter's perpetual tokio runtime
/// rather than blocking the caller on connection setup.
pub trait Adapter: Send + Sync {
    fn venue(&self) -> VenueId;

    fn state(&self) -> AdapterState;

    /// Bring the adapter up: connect required WebSockets, replay any
    /// previously recorded subscriptions, and start the user-stream
    /// refresh task if the adapter holds credentials.
    fn start(&self, fabric: Arc<crate::fabric::EventFabric>) -> Result<()>;

    /// Tear the adapter down unconditionally, from any non-terminal state.
    fn stop(&self);

    fn subscribe_ticker(&self, symbol: &str) -> Result<()>;
    fn subscribe_trades(&self, symbol: &str) -> Result<()>;
    fn subscribe_orderbook(&self, symbol: &str, levels: u32) -> Result<()>;
    fn subscribe_kline(&self, symbol: &str, interval: &str) -> Result<()>;

    /// Dispatch a single order command (place/cancel/amend/cancel-all).
    fn submit_command(&self, command: OrderCommand) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::order::{ OrderSide, OrderType };

    #[test]
    fn test_order_id_map_round_trip() {
        let map = OrderIdMap::new();
        let order = Order::new("BTCUSDT", "binance", OrderSide::Buy, OrderType::Limit, 1.0, 100.0);
        let client_id = order.client_order_id.clone();
        map.insert(order);
        map.link_exchange_id("ex-1", client_id.clone());

        assert!(map.get_by_client(&client_id).is_some());
        assert_eq!(map.get_by_exchange("ex-1").unwrap().client_order_id, client_id);
    }

    #[test]
    fn test_order_id_map_update_in_place() {
        let map = OrderIdMap::new();
        let order = Order::new("BTCUSDT", "binance", OrderSide::Buy, OrderType::Limit, 1.0, 100.0);
        let client_id = order.client_order_id.clone();
        map.insert(order);

        let found = map.update_by_client(&client_id, |o| {
            o.filled_quantity = 1.0;
        });
        assert!(found);
        assert_eq!(map.get_by_client(&client_id).unwrap().filled_quantity, 1.0);
    }

    #[test]
    fn test_adapter_state_can_stop() {
        assert!(AdapterState::Connected.can_stop());
        assert!(!AdapterState::Stopped.can_stop());
        assert!(!AdapterState::Stopping.can_stop());
    }
}
