//! Adapter cross-module scenarios: subscription replay-set contract,
//! per-venue signing fixtures, the order lifecycle DAG, and the listen-key
//! refresh cadence invariant.

use sable_gateway::adapter::signing::{ sign_binance, sign_okx };
use sable_gateway::adapter::ws_client::{ WsClient, WsClientConfig };
use sable_gateway::config::GatewayConfig;
use sable_gateway::constants::{ DEFAULT_LISTEN_KEY_REFRESH_SECS, MAX_LISTEN_KEY_REFRESH_RETRIES };
use sable_gateway::model::order::{ Order, OrderSide, OrderState, OrderType };
use std::sync::Arc;

#[test]
fn scenario_subscribe_replay_set_preserves_order() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let client = Arc::new(WsClient::new(runtime.handle().clone(), WsClientConfig::default()));

    client.subscribe("sub:ticker:btcusdt".to_string()).ok();
    client.subscribe("sub:trade:btcusdt".to_string()).ok();
    client.subscribe("sub:depth:ethusdt".to_string()).ok();

    assert_eq!(
        client.recorded_subscriptions(),
        vec!["sub:ticker:btcusdt".to_string(), "sub:trade:btcusdt".to_string(), "sub:depth:ethusdt".to_string()]
    );
}

#[test]
fn scenario_unsubscribe_removes_from_replay_set() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let client = Arc::new(WsClient::new(runtime.handle().clone(), WsClientConfig::default()));

    client.subscribe("sub:a".to_string()).ok();
    client.subscribe("sub:b".to_string()).ok();
    client.unsubscribe("sub:a", "unsub:a".to_string()).ok();

    assert_eq!(client.recorded_subscriptions(), vec!["sub:b".to_string()]);
}

#[test]
fn scenario_binance_signing_matches_known_vector() {
    // Binance canonical query: insertion order, hex HMAC-SHA256 digest.
    let signature = sign_binance("NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j", "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559").unwrap();
    assert_eq!(signature, "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b1");
}

#[test]
fn scenario_okx_signing_is_base64_and_deterministic() {
    let a = sign_okx("secret", "2020-12-08T09:08:57.715Z", "GET", "/api/v5/account/balance", "").unwrap();
    let b = sign_okx("secret", "2020-12-08T09:08:57.715Z", "GET", "/api/v5/account/balance", "").unwrap();
    assert_eq!(a, b);
    assert!(!a.is_empty());
}

#[test]
fn scenario_order_lifecycle_state_graph_forward_only() {
    let mut order = Order::new("BTCUSDT", "binance", OrderSide::Buy, OrderType::Limit, 1.0, 100.0);
    assert_eq!(order.state, OrderState::Created);

    order.transition(OrderState::Submitted).unwrap();
    order.transition(OrderState::Accepted).unwrap();
    order.filled_quantity = 0.4;
    order.transition(OrderState::PartiallyFilled).unwrap();
    order.filled_quantity = 1.0;
    order.transition(OrderState::Filled).unwrap();

    assert!(order.state.is_final());
    assert!(order.transition(OrderState::Cancelled).is_err());
    assert_eq!(order.state, OrderState::Filled);
}

#[test]
fn scenario_order_lifecycle_rejects_every_out_of_dag_jump() {
    let illegal_targets = [OrderState::Accepted, OrderState::PartiallyFilled, OrderState::Filled, OrderState::Cancelled];
    for target in illegal_targets {
        let mut order = Order::new("BTCUSDT", "binance", OrderSide::Buy, OrderType::Limit, 1.0, 100.0);
        assert!(order.transition(target).is_err(), "Created -> {target:?} must be illegal");
    }
}

#[test]
fn scenario_listen_key_refresh_cadence_beats_server_expiry() {
    // Binance listen keys expire server-side after 60 minutes; the refresh
    // cadence must be comfortably inside that window, with retries bounded.
    const SERVER_EXPIRY_SECS: u64 = 60 * 60;
    assert!(DEFAULT_LISTEN_KEY_REFRESH_SECS < SERVER_EXPIRY_SECS);
    assert!(MAX_LISTEN_KEY_REFRESH_RETRIES > 0);
}

#[test]
fn scenario_default_config_is_usable_by_both_venue_families() {
    let config = GatewayConfig::default();
    assert!(config.validate().is_ok());
    assert!(config.credentials.api_key.is_empty());
    assert!(config.credentials.passphrase.is_empty());
}
