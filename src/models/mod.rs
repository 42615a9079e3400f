//! # Receipt Data Model
//!
//! - [`receipt`] - The lightweight receipt record as pushed by the store
//! - [`progress`] - Per-notification agent progress events
//! - [`sidecar`] - The heavy forensic sidecar document
//! - [`analysis`] - The merged, UI-ready analysis result

pub mod analysis;
pub mod progress;
pub mod receipt;
pub mod sidecar;

pub use analysis::{HydratedAnalysis, HydrationSource, HydrationSummary};
pub use progress::AgentProgress;
pub use receipt::ReceiptRecord;
pub use sidecar::ForensicSidecar;

use serde_json::Value;

/// A field counts as present when it is neither null nor an empty string
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}
