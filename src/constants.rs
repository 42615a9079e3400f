//! # Receipt Record Constants
//!
//! Field names, status values and store paths shared by the lightweight receipt
//! record, the forensic sidecar and the hydrator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store layout defaults
pub mod store {
    pub const RECEIPTS_COLLECTION: &str = "receipts";
    pub const SIDECAR_COLLECTION: &str = "details";
    pub const SIDECAR_DOCUMENT: &str = "forensics";
}

/// Root-level fields of the lightweight receipt record
pub mod fields {
    pub const STATUS: &str = "status";
    pub const ERROR: &str = "error";
    pub const ANALYSIS: &str = "analysis";
    pub const OCR_TEXT: &str = "ocr_text";
    pub const PROCESSING_TIME: &str = "processing_time";

    pub const PROGRESS_AGENT: &str = "progress_agent";
    pub const PROGRESS_STAGE: &str = "progress_stage";
    pub const PROGRESS_MESSAGE: &str = "progress_message";
    pub const PROGRESS_PERCENTAGE: &str = "progress_percentage";
    pub const PROGRESS_TIMESTAMP: &str = "progress_timestamp";

    /// Marker prefix for dynamically named progress detail fields
    pub const PROGRESS_DETAIL_PREFIX: &str = "progress_detail_";

    // Inside `analysis`
    pub const AGENT_LOGS: &str = "agent_logs";
    pub const FORENSIC_DETAILS: &str = "forensic_details";

    // Inside `analysis.forensic_details`
    pub const FORENSIC_FINDINGS: &str = "forensic_findings";
    pub const FORENSIC_PROGRESS: &str = "forensic_progress";
    pub const HEATMAP: &str = "heatmap";
    pub const PIXEL_DIFF: &str = "pixel_diff";
    pub const TECHNICAL_DETAILS: &str = "technical_details";
    pub const ELA_ANALYSIS: &str = "ela_analysis";
    pub const IMAGE_DIMENSIONS: &str = "image_dimensions";
    pub const STATISTICS: &str = "statistics";

    // Sidecar-only naming
    pub const FORENSIC_FINDINGS_FULL: &str = "forensic_findings_full";
}

/// Lifecycle status written by the analysis backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// Any status value this crate does not know about
    #[serde(untagged)]
    Other(String),
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ReceiptStatus::Pending => "pending",
            ReceiptStatus::Processing => "processing",
            ReceiptStatus::Completed => "completed",
            ReceiptStatus::Failed => "failed",
            ReceiptStatus::Other(raw) => raw,
        }
    }
}

impl From<&str> for ReceiptStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "pending" => ReceiptStatus::Pending,
            "processing" => ReceiptStatus::Processing,
            "completed" => ReceiptStatus::Completed,
            "failed" => ReceiptStatus::Failed,
            other => ReceiptStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
