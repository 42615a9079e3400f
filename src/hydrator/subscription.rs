//! Live subscription to one receipt document.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::handler::ReceiptEventHandler;
use crate::config::HydratorConfig;
use crate::error::{HydratorError, ReceiptFailure};
use crate::logging::log_subscription_event;
use crate::models::analysis::hydrate_lightweight;
use crate::models::{AgentProgress, ForensicSidecar, HydratedAnalysis, ReceiptRecord};
use crate::store::{DocumentPath, DocumentSnapshot, DocumentStore, SnapshotStream};

/// Counters for one subscription
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionStats {
    pub snapshots_received: u64,
    pub missing_snapshots: u64,
    pub progress_events: u64,
    pub completions: u64,
    pub failures: u64,
    pub sidecar_hits: u64,
    pub sidecar_misses: u64,
    pub transport_errors: u64,
    pub last_event_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct SubscriptionState {
    id: Uuid,
    receipt_id: String,
    listening: AtomicBool,
    cancelled: AtomicBool,
    shutdown: Notify,
    stats: RwLock<SubscriptionStats>,
}

impl SubscriptionState {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn record<F: FnOnce(&mut SubscriptionStats)>(&self, update: F) {
        let mut stats = self.stats.write();
        update(&mut stats);
    }
}

/// Handle to a running receipt subscription.
///
/// Cancelling is idempotent. Dropping the handle cancels the subscription.
#[derive(Debug)]
pub struct ReceiptSubscription {
    state: Option<Arc<SubscriptionState>>,
    task: Option<JoinHandle<()>>,
}

impl ReceiptSubscription {
    /// Handle for a subscription that was never opened
    pub fn inert() -> Self {
        Self {
            state: None,
            task: None,
        }
    }

    pub(crate) fn spawn<S, H>(
        store: Arc<S>,
        config: Arc<HydratorConfig>,
        receipt_id: &str,
        handler: H,
    ) -> Self
    where
        S: DocumentStore,
        H: ReceiptEventHandler,
    {
        let state = Arc::new(SubscriptionState {
            id: Uuid::new_v4(),
            receipt_id: receipt_id.to_string(),
            listening: AtomicBool::new(true),
            cancelled: AtomicBool::new(false),
            shutdown: Notify::new(),
            stats: RwLock::new(SubscriptionStats::default()),
        });

        let receipt_path = DocumentPath::receipt(&config, receipt_id);
        let stream = store.watch(&receipt_path);

        log_subscription_event(
            "start",
            receipt_id,
            &state.id.to_string(),
            Some(&receipt_path.to_string()),
        );

        let worker = SubscriptionWorker {
            store,
            config,
            state: Arc::clone(&state),
            handler,
        };
        let task = tokio::spawn(worker.run(stream));

        Self {
            state: Some(state),
            task: Some(task),
        }
    }

    /// Stop listening. Later calls do nothing.
    pub fn cancel(&self) {
        let Some(state) = &self.state else {
            return;
        };
        if state.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        state.listening.store(false, Ordering::SeqCst);
        state.shutdown.notify_one();
        log_subscription_event("cancel", &state.receipt_id, &state.id.to_string(), None);
    }

    /// Whether the feed is still open and not cancelled
    pub fn is_active(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|state| state.listening.load(Ordering::SeqCst))
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.is_cancelled())
    }

    /// `None` for an inert handle
    pub fn receipt_id(&self) -> Option<&str> {
        self.state.as_ref().map(|state| state.receipt_id.as_str())
    }

    pub fn id(&self) -> Option<Uuid> {
        self.state.as_ref().map(|state| state.id)
    }

    pub fn stats(&self) -> SubscriptionStats {
        self.state
            .as_ref()
            .map(|state| state.stats.read().clone())
            .unwrap_or_default()
    }

    /// Wait for the background task to exit, without cancelling it
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Receipt subscription task failed: {}", e);
            }
        }
    }
}

impl Drop for ReceiptSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct SubscriptionWorker<S, H> {
    store: Arc<S>,
    config: Arc<HydratorConfig>,
    state: Arc<SubscriptionState>,
    handler: H,
}

impl<S, H> SubscriptionWorker<S, H>
where
    S: DocumentStore,
    H: ReceiptEventHandler,
{
    #[instrument(skip_all, fields(receipt_id = %self.state.receipt_id, subscription_id = %self.state.id))]
    async fn run(self, mut stream: SnapshotStream) {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.state.shutdown.notified() => break,
                next = stream.next() => next,
            };

            match next {
                Some(Ok(snapshot)) => self.handle_snapshot(snapshot).await,
                Some(Err(e)) => {
                    self.handle_transport_error(e).await;
                    break;
                }
                None => {
                    info!("Receipt feed ended");
                    break;
                }
            }
        }

        self.state.listening.store(false, Ordering::SeqCst);
        debug!("Receipt subscription loop exited");
    }

    async fn handle_snapshot(&self, snapshot: DocumentSnapshot) {
        self.state.record(|stats| {
            stats.snapshots_received += 1;
            stats.last_event_at = Some(Utc::now());
        });

        let Some(data) = snapshot.into_data() else {
            self.state.record(|stats| stats.missing_snapshots += 1);
            debug!("Receipt document does not exist yet");
            return;
        };

        let record = ReceiptRecord::from_document(self.state.receipt_id.clone(), data);
        debug!(status = ?record.status, "Receipt update received");

        if let Some(progress) = record.progress(&self.config.detail_prefix) {
            self.emit_progress(progress).await;
        }

        if record.is_completed() && record.analysis().is_some() {
            let analysis = self.hydrate(&record).await;
            self.emit_complete(analysis).await;
        }

        if record.is_failed() {
            if let Some(payload) = record.error() {
                error!(error = %payload, "Receipt analysis failed");
                self.emit_error(ReceiptFailure::Analysis(payload.clone()))
                    .await;
            }
        }
    }

    /// Lightweight hydration, then the sidecar read and merge.
    ///
    /// Never fails: a shape error yields the raw `analysis` payload and a
    /// missing sidecar yields the lightweight result.
    async fn hydrate(&self, record: &ReceiptRecord) -> HydratedAnalysis {
        let lightweight = match hydrate_lightweight(record) {
            Ok(lightweight) => lightweight,
            Err(e) => {
                error!(error = %e, "Hydration failed, delivering raw analysis");
                return HydratedAnalysis::raw(record.analysis().cloned().unwrap_or_default());
            }
        };

        let sidecar = if self.config.fetch_sidecar {
            self.fetch_sidecar().await
        } else {
            None
        };

        let hydrated = HydratedAnalysis::from_parts(lightweight, sidecar.as_ref());
        let summary = hydrated.summary();
        info!(
            source = ?summary.source,
            has_heatmap = summary.has_heatmap,
            heatmap_rows = summary.heatmap_rows,
            has_pixel_diff = summary.has_pixel_diff,
            findings = summary.findings,
            "Analysis hydrated"
        );
        hydrated
    }

    async fn fetch_sidecar(&self) -> Option<ForensicSidecar> {
        let path = DocumentPath::sidecar(&self.config, &self.state.receipt_id);

        match self.store.get(&path).await {
            Ok(Some(data)) => {
                debug!(path = %path, fields = data.len(), "Sidecar found");
                self.state.record(|stats| stats.sidecar_hits += 1);
                Some(ForensicSidecar::from_document(data))
            }
            Ok(None) => {
                warn!(path = %path, "No sidecar data found, using lightweight analysis");
                self.state.record(|stats| stats.sidecar_misses += 1);
                None
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Could not fetch sidecar, using lightweight analysis");
                self.state.record(|stats| stats.sidecar_misses += 1);
                None
            }
        }
    }

    async fn handle_transport_error(&self, e: HydratorError) {
        error!(error = %e, "Receipt subscription failed");
        self.state.record(|stats| {
            stats.transport_errors += 1;
            stats.last_event_at = Some(Utc::now());
        });
        self.state.listening.store(false, Ordering::SeqCst);
        self.emit_error(ReceiptFailure::Subscription(e)).await;
    }

    async fn emit_progress(&self, progress: AgentProgress) {
        if self.state.is_cancelled() {
            return;
        }
        debug!(
            agent = %progress.agent,
            stage = %progress.stage,
            progress = progress.progress,
            "{}",
            progress.message
        );
        self.state.record(|stats| stats.progress_events += 1);
        self.handler.on_progress(progress).await;
    }

    async fn emit_complete(&self, analysis: HydratedAnalysis) {
        if self.state.is_cancelled() {
            debug!("Subscription cancelled, discarding hydrated analysis");
            return;
        }
        self.state.record(|stats| stats.completions += 1);
        self.handler.on_complete(analysis).await;
    }

    async fn emit_error(&self, failure: ReceiptFailure) {
        if self.state.is_cancelled() {
            return;
        }
        self.state.record(|stats| stats.failures += 1);
        self.handler.on_error(failure).await;
    }
}
