//! In-process [`DocumentStore`] with push semantics.
//!
//! New watchers receive the current snapshot immediately, then one snapshot per
//! write. Reads can be failed or held open so callers can exercise degraded and
//! in-flight paths.
//!
//! ```rust
//! use receipt_hydrator::store::{DocumentPath, DocumentStore, InMemoryDocumentStore};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryDocumentStore::new();
//! let path = DocumentPath::new("receipts", "r1");
//! let doc = json!({"status": "processing"}).as_object().cloned().unwrap();
//!
//! store.set_document(&path, doc.clone()).await;
//! assert_eq!(store.get(&path).await.unwrap(), Some(doc));
//! # });
//! ```

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::{Document, DocumentPath, DocumentSnapshot, DocumentStore, SnapshotStream};
use crate::config::HydratorConfig;
use crate::error::{HydratorError, Result};

struct Watcher {
    path: DocumentPath,
    sender: mpsc::Sender<Result<DocumentSnapshot>>,
}

struct Inner {
    documents: RwLock<HashMap<DocumentPath, Document>>,
    watchers: Mutex<Vec<Watcher>>,
    buffer_size: usize,
    fail_reads: AtomicBool,
    reads_paused: watch::Sender<bool>,
    reads: AtomicU64,
}

/// Shared, cloneable in-memory store
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    inner: Arc<Inner>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::from_config(&HydratorConfig::default())
    }

    /// Store whose watchers buffer `snapshot_buffer_size` snapshots each
    pub fn from_config(config: &HydratorConfig) -> Self {
        Self::with_buffer_size(config.snapshot_buffer_size)
    }

    /// Per-watcher snapshot buffer; bounded so a stalled watcher cannot grow memory
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        let (reads_paused, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                documents: RwLock::new(HashMap::new()),
                watchers: Mutex::new(Vec::new()),
                buffer_size: buffer_size.max(1),
                fail_reads: AtomicBool::new(false),
                reads_paused,
                reads: AtomicU64::new(0),
            }),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.inner.buffer_size
    }

    /// Write a document and push the new snapshot to its watchers
    pub async fn set_document(&self, path: &DocumentPath, data: Document) {
        self.inner
            .documents
            .write()
            .insert(path.clone(), data.clone());
        self.publish(path, Ok(DocumentSnapshot::new(path.clone(), Some(data))))
            .await;
    }

    /// Delete a document and push a non-existent snapshot
    pub async fn remove_document(&self, path: &DocumentPath) {
        self.inner.documents.write().remove(path);
        self.publish(path, Ok(DocumentSnapshot::missing(path.clone())))
            .await;
    }

    /// Push a subscription error to every watcher of `path` and drop them
    pub async fn fail_watchers(&self, path: &DocumentPath, error: HydratorError) {
        self.publish(path, Err(error)).await;
        self.inner.watchers.lock().retain(|w| &w.path != path);
    }

    /// Make every point read fail with a transport error
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Hold point reads open until [`resume_reads`](Self::resume_reads)
    pub fn pause_reads(&self) {
        self.inner.reads_paused.send_replace(true);
    }

    pub fn resume_reads(&self) {
        self.inner.reads_paused.send_replace(false);
    }

    /// Number of point reads started so far
    pub fn read_count(&self) -> u64 {
        self.inner.reads.load(Ordering::SeqCst)
    }

    /// Live watchers of `path`
    pub fn watcher_count(&self, path: &DocumentPath) -> usize {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| !w.sender.is_closed());
        watchers.iter().filter(|w| &w.path == path).count()
    }

    async fn publish(&self, path: &DocumentPath, item: Result<DocumentSnapshot>) {
        let senders: Vec<_> = {
            let mut watchers = self.inner.watchers.lock();
            watchers.retain(|w| !w.sender.is_closed());
            watchers
                .iter()
                .filter(|w| &w.path == path)
                .map(|w| w.sender.clone())
                .collect()
        };

        debug!(path = %path, watchers = senders.len(), "Publishing snapshot");

        for sender in senders {
            if sender.send(item.clone()).await.is_err() {
                debug!(path = %path, "Watcher dropped before delivery");
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn watch(&self, path: &DocumentPath) -> SnapshotStream {
        let (sender, receiver) = mpsc::channel(self.inner.buffer_size);

        let current = self.inner.documents.read().get(path).cloned();
        if sender
            .try_send(Ok(DocumentSnapshot::new(path.clone(), current)))
            .is_err()
        {
            warn!(path = %path, "Could not deliver initial snapshot");
        }

        self.inner.watchers.lock().push(Watcher {
            path: path.clone(),
            sender,
        });

        futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|item| (item, receiver))
        })
        .boxed()
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);

        let mut paused = self.inner.reads_paused.subscribe();
        if paused.wait_for(|paused| !*paused).await.is_err() {
            return Err(HydratorError::transport(path.to_string(), "store closed"));
        }

        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(HydratorError::transport(
                path.to_string(),
                "simulated read failure",
            ));
        }

        Ok(self.inner.documents.read().get(path).cloned())
    }
}
