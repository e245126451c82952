//! Order commands and the rich `Order` lifecycle type
//!
//! `OrderCommand` is the fixed-size, queue-resident POD sent by strategies
//! through the MPSC order-command queue. `Order` is the richer,
//! EventFabric-resident type that tracks full order lifecycle state,
//! grounded on `trading::Order` (`core/order.h`).

use crate::constants::CLIENT_ORDER_ID_SIZE;
use crate::error::{ GatewayError, Result };
use crate::model::symbol::SymbolId;
use std::sync::atomic::{ AtomicU64, Ordering };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OrderCommandKind {
    #[default]
    Place = 0,
    Cancel = 1,
    Amend = 2,
    CancelAll = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OrderSide {
    #[default]
    Buy = 0,
    Sell = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OrderType {
    #[default]
    Limit = 0,
    Market = 1,
    PostOnly = 2,
    Fok = 3,
    Ioc = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TimeInForce {
    #[default]
    Gtc = 0,
    Ioc = 1,
    Fok = 2,
    Gtx = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PositionSide {
    #[default]
    Both = 0,
    Long = 1,
    Short = 2,
}

/// Inline client-order-id buffer: avoids a heap allocation on the
/// queue-resident command, per `constants::CLIENT_ORDER_ID_SIZE`.
#[derive(Debug, Clone, Copy)]
pub struct ClientOrderId {
    bytes: [u8; CLIENT_ORDER_ID_SIZE],
    len: u8,
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self { bytes: [0u8; CLIENT_ORDER_ID_SIZE], len: 0 }
    }
}

impl ClientOrderId {
    pub fn new(s: &str) -> Self {
        let mut bytes = [0u8; CLIENT_ORDER_ID_SIZE];
        let len = s.len().min(CLIENT_ORDER_ID_SIZE);
        bytes[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { bytes, len: len as u8 }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl std::fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size order command, resident in the MPSC order-command queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderCommand {
    pub kind: OrderCommandKind,
    pub venue_id: u8,
    pub symbol_id: SymbolId,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub position_side: PositionSide,
    pub quantity: f64,
    pub price: f64,
    pub client_order_id: ClientOrderId,
    pub strategy_id: u32,
}

/// Order lifecycle state. Transitions only along the DAG:
/// `Created -> Submitted -> Accepted -> (PartiallyFilled* -> Filled |
/// Cancelled | Rejected | Failed)`; terminal states are sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OrderState {
    #[default]
    Created = 0,
    Submitted = 1,
    Accepted = 2,
    PartiallyFilled = 3,
    Filled = 4,
    Cancelled = 5,
    Rejected = 6,
    Failed = 7,
}

impl OrderState {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected | Self::Failed)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitted | Self::Accepted | Self::PartiallyFilled)
    }

    /// Validate a transition against the order lifecycle DAG.
    pub fn can_transition_to(&self, next: Self) -> bool {
        use OrderState::*;
        if self.is_final() {
            return false;
        }
        match (self, next) {
            (Created, Submitted) => true,
            (Submitted, Accepted | Rejected | Failed) => true,
            (Accepted, PartiallyFilled | Filled | Cancelled) => true,
            (PartiallyFilled, PartiallyFilled | Filled | Cancelled) => true,
            _ => false,
        }
    }
}

/// Process-wide order id generator. Production adapters construct their own
/// counter as a per-venue field rather than sharing this process-global
/// one; it exists for callers (tests, the demo binary) that don't own a
/// venue-scoped generator.
static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_order_id() -> u64 {
    NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Rich, EventFabric-resident order, tracking the full lifecycle.
#[derive(Debug, Clone)]
pub struct Order {
    pub local_order_id: u64,
    pub client_order_id: String,
    pub exchange_order_id: Option<String>,
    pub symbol: String,
    pub venue: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: f64,
    pub quantity: f64,
    pub filled_quantity: f64,
    pub filled_avg_price: f64,
    pub state: OrderState,
    pub fee: f64,
    pub fee_currency: Option<String>,
    pub create_time_ns: i64,
    pub update_time_ns: i64,
    pub error_msg: Option<String>,
}

impl Order {
    pub fn new(symbol: impl Into<String>, venue: impl Into<String>, side: OrderSide, order_type: OrderType, quantity: f64, price: f64) -> Self {
        let local_order_id = next_order_id();
        let now = crate::model::event::now_ns();
        Self {
            local_order_id,
            client_order_id: format!("gw-{local_order_id}"),
            exchange_order_id: None,
            symbol: symbol.into(),
            venue: venue.into(),
            side,
            order_type,
            price,
            quantity,
            filled_quantity: 0.0,
            filled_avg_price: 0.0,
            state: OrderState::Created,
            fee: 0.0,
            fee_currency: None,
            create_time_ns: now,
            update_time_ns: now,
            error_msg: None,
        }
    }

    pub fn remaining_quantity(&self) -> f64 {
        self.quantity - self.filled_quantity
    }

    pub fn is_buy(&self) -> bool {
        self.side == OrderSide::Buy
    }

    /// Transition this order's state, enforcing the DAG invariant.
    pub fn transition(&mut self, next: OrderState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(
                GatewayError::unexpected(
                    format!("illegal order transition {:?} -> {:?} for order {}", self.state, next, self.local_order_id)
                )
            );
        }
        self.state = next;
        self.update_time_ns = crate::model::event::now_ns();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_order_id_round_trip() {
        let id = ClientOrderId::new("gw-12345");
        assert_eq!(id.as_str(), "gw-12345");
    }

    #[test]
    fn test_client_order_id_truncates() {
        let long = "x".repeat(CLIENT_ORDER_ID_SIZE + 10);
        let id = ClientOrderId::new(&long);
        assert_eq!(id.as_str().len(), CLIENT_ORDER_ID_SIZE);
    }

    #[test]
    fn test_order_state_dag_forward_only() {
        assert!(OrderState::Created.can_transition_to(OrderState::Submitted));
        assert!(OrderState::Submitted.can_transition_to(OrderState::Accepted));
        assert!(OrderState::Accepted.can_transition_to(OrderState::PartiallyFilled));
        assert!(OrderState::PartiallyFilled.can_transition_to(OrderState::Filled));
        assert!(!OrderState::Filled.can_transition_to(OrderState::Cancelled));
        assert!(!OrderState::Created.can_transition_to(OrderState::Filled));
    }

    #[test]
    fn test_order_transition_rejects_illegal_jump() {
        let mut order = Order::new("BTCUSDT", "binance", OrderSide::Buy, OrderType::Limit, 1.0, 100.0);
        assert!(order.transition(OrderState::Filled).is_err());
        assert_eq!(order.state, OrderState::Created);
    }

    #[test]
    fn test_order_lifecycle_happy_path() {
        let mut order = Order::new("BTCUSDT", "binance", OrderSide::Buy, OrderType::Limit, 1.0, 100.0);
        order.transition(OrderState::Submitted).unwrap();
        order.transition(OrderState::Accepted).unwrap();
        order.filled_quantity = 1.0;
        order.transition(OrderState::Filled).unwrap();
        assert!(order.state.is_final());
        assert_eq!(order.remaining_quantity(), 0.0);
    }
}
