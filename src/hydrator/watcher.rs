//! Follows whichever receipt the caller is currently looking at.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use super::{ReceiptEventHandler, ReceiptProgressHydrator, ReceiptSubscription};
use crate::store::DocumentStore;

/// Keeps at most one live subscription, re-pointed with [`watch`](Self::watch)
pub struct ReceiptWatcher<S: DocumentStore, H: ReceiptEventHandler> {
    hydrator: ReceiptProgressHydrator<S>,
    handler: Arc<H>,
    current: Mutex<Option<ReceiptSubscription>>,
}

impl<S: DocumentStore, H: ReceiptEventHandler> ReceiptWatcher<S, H> {
    pub fn new(hydrator: ReceiptProgressHydrator<S>, handler: H) -> Self {
        Self {
            hydrator,
            handler: Arc::new(handler),
            current: Mutex::new(None),
        }
    }

    /// Switch to `receipt_id`, tearing down the previous subscription first.
    ///
    /// Watching the receipt already being watched keeps the live subscription.
    /// A blank id just stops.
    pub fn watch(&self, receipt_id: &str) {
        let mut current = self.current.lock();

        if let Some(existing) = current.as_ref() {
            if existing.receipt_id() == Some(receipt_id) && existing.is_active() {
                return;
            }
        }

        if let Some(previous) = current.take() {
            previous.cancel();
        }

        let subscription = self.hydrator.subscribe(receipt_id, Arc::clone(&self.handler));
        if subscription.receipt_id().is_some() {
            *current = Some(subscription);
        }
    }

    /// Manually stop listening; does nothing when idle
    pub fn stop(&self) {
        if let Some(subscription) = self.current.lock().take() {
            info!(receipt_id = ?subscription.receipt_id(), "Manually stopping receipt listener");
            subscription.cancel();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(ReceiptSubscription::is_active)
    }

    pub fn current_receipt(&self) -> Option<String> {
        self.current
            .lock()
            .as_ref()
            .and_then(|s| s.receipt_id().map(str::to_string))
    }

    pub fn stats(&self) -> Option<super::SubscriptionStats> {
        self.current.lock().as_ref().map(ReceiptSubscription::stats)
    }
}
