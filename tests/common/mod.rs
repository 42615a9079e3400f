#![allow(dead_code, unused_imports)] // Each integration test binary uses a different subset

pub mod builders;
pub mod strategies;

pub use builders::*;

use receipt_hydrator::{DocumentPath, InMemoryDocumentStore, ReceiptEvent, ReceiptSubscription};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::mpsc;

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(2);
pub const QUIET_PERIOD: Duration = Duration::from_millis(100);

pub fn doc(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("test documents must be objects, got {other}"),
    }
}

/// Next event, failing the test if none arrives in time
pub async fn next_event(rx: &mut mpsc::Receiver<ReceiptEvent>) -> ReceiptEvent {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for receipt event")
        .expect("event channel closed")
}

/// Assert nothing arrives for a short while
pub async fn assert_no_event(rx: &mut mpsc::Receiver<ReceiptEvent>) {
    if let Ok(Some(event)) = tokio::time::timeout(QUIET_PERIOD, rx.recv()).await {
        panic!("unexpected receipt event: {event:?}");
    }
}

/// Let the subscription task drain what has been pushed so far
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}

pub async fn wait_until_inactive(subscription: &ReceiptSubscription) {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        while subscription.is_active() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("subscription stayed active");
}

/// Wait until `path` has exactly `expected` live watchers
pub async fn wait_for_watchers(
    store: &InMemoryDocumentStore,
    path: &DocumentPath,
    expected: usize,
) {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        while store.watcher_count(path) != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| {
        panic!(
            "{path} has {} watchers, expected {expected}",
            store.watcher_count(path)
        )
    });
}
