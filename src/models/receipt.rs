use serde_json::{Map, Value};

use super::present;
use crate::constants::{fields, ReceiptStatus};
use crate::models::progress::AgentProgress;

/// Lightweight receipt record, read-only view over one pushed snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptRecord {
    pub receipt_id: String,
    pub status: Option<ReceiptStatus>,
    data: Map<String, Value>,
}

impl ReceiptRecord {
    pub fn from_document(receipt_id: impl Into<String>, data: Map<String, Value>) -> Self {
        let status = match data.get(fields::STATUS) {
            Some(Value::String(raw)) => Some(ReceiptStatus::from(raw.as_str())),
            _ => None,
        };

        Self {
            receipt_id: receipt_id.into(),
            status,
            data,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(ReceiptStatus::Completed)
    }

    pub fn is_failed(&self) -> bool {
        self.status == Some(ReceiptStatus::Failed)
    }

    /// The lightweight `analysis` payload, once one has been written
    pub fn analysis(&self) -> Option<&Value> {
        present(self.data.get(fields::ANALYSIS))
    }

    /// Backend-supplied failure payload
    pub fn error(&self) -> Option<&Value> {
        present(self.data.get(fields::ERROR))
    }

    pub fn ocr_text(&self) -> Option<&Value> {
        present(self.data.get(fields::OCR_TEXT))
    }

    pub fn processing_time(&self) -> Option<&Value> {
        self.data
            .get(fields::PROCESSING_TIME)
            .filter(|v| !v.is_null())
    }

    /// Progress carried by this snapshot, if the receipt is still in flight
    pub fn progress(&self, detail_prefix: &str) -> Option<AgentProgress> {
        if self.is_completed() {
            return None;
        }
        AgentProgress::from_fields(&self.data, detail_prefix)
    }
}
