// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the network monitor.

#![allow(clippy::unwrap_used)]

use super::network::NetworkMonitor;

#[test]
fn default_is_online() {
    assert!(NetworkMonitor::default().is_online());
}

#[test]
fn clones_share_the_signal() {
    let monitor = NetworkMonitor::new(true);
    let other = monitor.clone();

    other.set_online(false);

    assert!(!monitor.is_online());
}

#[tokio::test]
async fn subscribers_see_changes() {
    let monitor = NetworkMonitor::new(false);
    let mut rx = monitor.subscribe();

    monitor.set_online(true);

    rx.changed().await.unwrap();
    assert!(*rx.borrow_and_update());
}

#[test]
fn repeated_value_is_not_broadcast() {
    let monitor = NetworkMonitor::new(true);
    let rx = monitor.subscribe();

    monitor.set_online(true);

    assert!(!rx.has_changed().unwrap());
}
