// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for group membership and replay.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::auth::TokenStore;
use super::backoff::Backoff;
use super::bus::EventBus;
use super::connection::{ConnectionConfig, ConnectionError, ConnectionManager};
use super::groups::ReplayReport;
use super::transport_tests::MockTransport;
use invsync_core::protocol::methods;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn make_manager(transport: &MockTransport) -> ConnectionManager {
    let config = ConnectionConfig {
        url: "ws://hub.test/hubs/inventory".to_string(),
        backoff: Backoff {
            base: Duration::from_millis(500),
            max: Duration::from_secs(5),
            jitter: Duration::ZERO,
        },
        ..ConnectionConfig::default()
    };
    ConnectionManager::new(
        config,
        Arc::new(transport.clone()),
        Arc::new(TokenStore::new(Some("token".to_string()))),
        EventBus::new(),
    )
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn join_while_disconnected_is_deferred() {
    let transport = MockTransport::new();
    let manager = make_manager(&transport);

    manager.join_group("inventory").await.unwrap();

    assert!(manager.groups().contains("inventory"));
    assert!(transport.invocations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deferred_joins_replay_on_connect() {
    let transport = MockTransport::new();
    let manager = make_manager(&transport);
    manager.join_group("warehouse-b").await.unwrap();
    manager.join_group("inventory").await.unwrap();

    manager.connect().await.unwrap();

    assert_eq!(transport.joins_in(1), vec!["inventory", "warehouse-b"]);
}

#[tokio::test(start_paused = true)]
async fn join_while_connected_invokes_once() {
    let transport = MockTransport::new();
    let manager = make_manager(&transport);
    manager.connect().await.unwrap();

    manager.join_group("inventory").await.unwrap();
    manager.join_group("inventory").await.unwrap();

    assert_eq!(transport.joins_in(1), vec!["inventory"]);
    assert_eq!(manager.groups().members(), vec!["inventory"]);
}

#[tokio::test(start_paused = true)]
async fn failing_group_does_not_block_the_rest() {
    let transport = MockTransport::new();
    transport.fail_group("broken");
    let manager = make_manager(&transport);
    for group in ["alpha", "broken", "zulu"] {
        manager.join_group(group).await.unwrap();
    }

    manager.connect().await.unwrap();

    assert_eq!(transport.joins_in(1), vec!["alpha", "broken", "zulu"]);
    assert!(manager.is_connected());
    // Still a member; retried on the next session.
    assert!(manager.groups().contains("broken"));
}

#[tokio::test(start_paused = true)]
async fn failed_explicit_join_keeps_membership() {
    let transport = MockTransport::new();
    transport.fail_group("broken");
    let manager = make_manager(&transport);
    manager.connect().await.unwrap();

    let result = manager.join_group("broken").await;

    assert!(matches!(result, Err(ConnectionError::Hub { .. })));
    assert!(manager.groups().contains("broken"));
}

#[tokio::test(start_paused = true)]
async fn leave_while_connected_sends_leave_group() {
    let transport = MockTransport::new();
    let manager = make_manager(&transport);
    manager.join_group("inventory").await.unwrap();
    manager.connect().await.unwrap();

    manager.leave_group("inventory").await.unwrap();

    assert!(!manager.groups().contains("inventory"));
    let leaves: Vec<_> = transport
        .invocations()
        .into_iter()
        .filter(|(_, method, _)| method == methods::LEAVE_GROUP)
        .collect();
    assert_eq!(leaves, vec![(1, methods::LEAVE_GROUP.to_string(), vec![json!("inventory")])]);
}

#[tokio::test(start_paused = true)]
async fn leave_while_disconnected_only_forgets() {
    let transport = MockTransport::new();
    let manager = make_manager(&transport);
    manager.join_group("inventory").await.unwrap();

    manager.leave_group("inventory").await.unwrap();
    manager.connect().await.unwrap();

    assert!(transport.invocations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn replay_happens_once_per_session() {
    let transport = MockTransport::new();
    let manager = make_manager(&transport);
    manager.join_group("inventory").await.unwrap();
    manager.connect().await.unwrap();

    manager.disconnect();
    manager.connect().await.unwrap();
    settle().await;

    assert_eq!(transport.joins_in(1), vec!["inventory"]);
    assert_eq!(transport.joins_in(2), vec!["inventory"]);
    assert_eq!(transport.invocations().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn stale_replay_does_not_rejoin_the_live_session() {
    let transport = MockTransport::new();
    let manager = make_manager(&transport);
    manager.join_group("inventory").await.unwrap();
    manager.connect().await.unwrap();
    let first = manager.session_epoch().unwrap();

    manager.disconnect();
    manager.connect().await.unwrap();
    settle().await;

    let report = manager.groups().on_reconnected(&manager, first).await;

    assert_eq!(report, ReplayReport::default());
    assert_eq!(transport.joins_in(2), vec!["inventory"]);
    assert_eq!(transport.invocations().len(), 2);
}
