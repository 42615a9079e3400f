//! # Document Store Seam
//!
//! The hydrator never talks to a concrete backend. It is handed a
//! [`DocumentStore`] that can push snapshots of one document and point-read
//! another, which keeps the real-time client injectable and replaceable in tests.

pub mod memory;

pub use memory::InMemoryDocumentStore;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::{Map, Value};
use std::fmt;

use crate::config::HydratorConfig;
use crate::error::Result;

/// Document body as stored
pub type Document = Map<String, Value>;

/// Stream of pushed snapshots for a single document
///
/// An `Err` item means the subscription failed; stores are not expected to
/// yield anything after it.
pub type SnapshotStream = BoxStream<'static, Result<DocumentSnapshot>>;

/// Slash-separated address of a document, alternating collection and key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            segments: vec![collection.into(), key.into()],
        }
    }

    /// Address a document in a sub-collection of this one
    #[must_use]
    pub fn child(&self, collection: impl Into<String>, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(collection.into());
        segments.push(key.into());
        Self { segments }
    }

    /// `receipts/{receipt_id}`
    pub fn receipt(config: &HydratorConfig, receipt_id: &str) -> Self {
        Self::new(config.collection.clone(), receipt_id)
    }

    /// `receipts/{receipt_id}/details/forensics`
    pub fn sidecar(config: &HydratorConfig, receipt_id: &str) -> Self {
        Self::receipt(config, receipt_id).child(
            config.sidecar_collection.clone(),
            config.sidecar_document.clone(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Key of the addressed document
    pub fn key(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// One pushed state of a document; `data` is `None` when it does not exist
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub path: DocumentPath,
    data: Option<Document>,
}

impl DocumentSnapshot {
    pub fn new(path: DocumentPath, data: Option<Document>) -> Self {
        Self { path, data }
    }

    pub fn missing(path: DocumentPath) -> Self {
        Self { path, data: None }
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Document> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<Document> {
        self.data
    }
}

/// Real-time document store client
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Open a push subscription on one document.
    ///
    /// Dropping the returned stream must release the subscription.
    fn watch(&self, path: &DocumentPath) -> SnapshotStream;

    /// Single point read
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_and_sidecar_paths() {
        let config = HydratorConfig::default();
        let receipt = DocumentPath::receipt(&config, "abc123");
        assert_eq!(receipt.to_string(), "receipts/abc123");
        assert_eq!(receipt.key(), "abc123");

        let sidecar = DocumentPath::sidecar(&config, "abc123");
        assert_eq!(sidecar.to_string(), "receipts/abc123/details/forensics");
        assert_eq!(sidecar.segments().len(), 4);
    }

    #[test]
    fn test_snapshot_existence() {
        let path = DocumentPath::new("receipts", "r1");
        assert!(!DocumentSnapshot::missing(path.clone()).exists());
        assert!(DocumentSnapshot::new(path, Some(Document::new())).exists());
    }
}
