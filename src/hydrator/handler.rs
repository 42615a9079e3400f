//! Callback surface for subscribers.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::ReceiptFailure;
use crate::models::{AgentProgress, HydratedAnalysis};

/// Receives the three kinds of output a receipt subscription produces.
///
/// Every method has a no-op default, so implementors override only what they use.
#[async_trait]
pub trait ReceiptEventHandler: Send + Sync + 'static {
    /// A receipt that is still processing reported agent progress
    async fn on_progress(&self, _progress: AgentProgress) {}

    /// The receipt completed and its analysis was hydrated
    async fn on_complete(&self, _analysis: HydratedAnalysis) {}

    /// The backend reported a failure, or the subscription broke
    async fn on_error(&self, _failure: ReceiptFailure) {}
}

#[async_trait]
impl<H: ReceiptEventHandler + ?Sized> ReceiptEventHandler for Arc<H> {
    async fn on_progress(&self, progress: AgentProgress) {
        (**self).on_progress(progress).await;
    }

    async fn on_complete(&self, analysis: HydratedAnalysis) {
        (**self).on_complete(analysis).await;
    }

    async fn on_error(&self, failure: ReceiptFailure) {
        (**self).on_error(failure).await;
    }
}

type Callback<T> = Box<dyn Fn(T) + Send + Sync>;

/// Closure-based handler; each callback is optional
#[derive(Default)]
pub struct ReceiptCallbacks {
    on_progress: Option<Callback<AgentProgress>>,
    on_complete: Option<Callback<HydratedAnalysis>>,
    on_error: Option<Callback<ReceiptFailure>>,
}

impl ReceiptCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(AgentProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn with_completion<F>(mut self, callback: F) -> Self
    where
        F: Fn(HydratedAnalysis) + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn with_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(ReceiptFailure) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for ReceiptCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptCallbacks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[async_trait]
impl ReceiptEventHandler for ReceiptCallbacks {
    async fn on_progress(&self, progress: AgentProgress) {
        if let Some(callback) = &self.on_progress {
            callback(progress);
        }
    }

    async fn on_complete(&self, analysis: HydratedAnalysis) {
        if let Some(callback) = &self.on_complete {
            callback(analysis);
        }
    }

    async fn on_error(&self, failure: ReceiptFailure) {
        if let Some(callback) = &self.on_error {
            callback(failure);
        }
    }
}

/// Subscription output as a single enum, for channel-based consumers
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiptEvent {
    Progress(AgentProgress),
    Completed(HydratedAnalysis),
    Failed(ReceiptFailure),
}

/// Forwards every callback into a bounded channel
#[async_trait]
impl ReceiptEventHandler for mpsc::Sender<ReceiptEvent> {
    async fn on_progress(&self, progress: AgentProgress) {
        forward(self, ReceiptEvent::Progress(progress)).await;
    }

    async fn on_complete(&self, analysis: HydratedAnalysis) {
        forward(self, ReceiptEvent::Completed(analysis)).await;
    }

    async fn on_error(&self, failure: ReceiptFailure) {
        forward(self, ReceiptEvent::Failed(failure)).await;
    }
}

async fn forward(sender: &mpsc::Sender<ReceiptEvent>, event: ReceiptEvent) {
    if sender.send(event).await.is_err() {
        warn!("Receipt event receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_callbacks_are_skipped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callbacks = ReceiptCallbacks::new()
            .with_error(move |failure: ReceiptFailure| sink.lock().push(failure.to_string()));

        callbacks
            .on_complete(HydratedAnalysis::raw(json!({})))
            .await;
        callbacks
            .on_error(ReceiptFailure::Analysis(json!("blurry")))
            .await;

        assert_eq!(*seen.lock(), vec!["Analysis failed: blurry".to_string()]);
    }

    #[tokio::test]
    async fn test_channel_handler_forwards_events() {
        let (tx, mut rx) = mpsc::channel::<ReceiptEvent>(4);
        tx.on_error(ReceiptFailure::Analysis(json!("x"))).await;

        assert_eq!(
            rx.recv().await,
            Some(ReceiptEvent::Failed(ReceiptFailure::Analysis(json!("x"))))
        );
    }
}
