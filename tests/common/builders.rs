//! Builders for receipt and sidecar documents as the analysis backend writes them.

use serde_json::{json, Map, Value};

/// Builder for lightweight receipt documents
#[derive(Debug, Clone, Default)]
pub struct ReceiptDocBuilder {
    fields: Map<String, Value>,
}

impl ReceiptDocBuilder {
    pub fn new(status: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("status".to_string(), json!(status));
        Self { fields }
    }

    pub fn processing() -> Self {
        Self::new("processing")
    }

    pub fn completed() -> Self {
        Self::new("completed")
    }

    pub fn failed(error: Value) -> Self {
        Self::new("failed").with_field("error", error)
    }

    pub fn with_progress(self, agent: &str, stage: &str, percentage: u32) -> Self {
        self.with_field("progress_agent", json!(agent))
            .with_field("progress_stage", json!(stage))
            .with_field("progress_percentage", json!(percentage))
    }

    pub fn with_message(self, message: &str) -> Self {
        self.with_field("progress_message", json!(message))
    }

    pub fn with_detail(self, key: &str, value: Value) -> Self {
        self.with_field(&format!("progress_detail_{key}"), value)
    }

    pub fn with_analysis(self, analysis: Value) -> Self {
        self.with_field("analysis", analysis)
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Map<String, Value> {
        self.fields
    }
}

/// A typical lightweight analysis with truncated findings and stringified logs
pub fn lightweight_analysis() -> Value {
    json!({
        "verdict": "suspicious",
        "trust_score": 41,
        "agent_logs": "[{\"agent\":\"vision\"}]",
        "forensic_details": {
            "forensic_findings": "['font mismatch on total']",
            "pixel_diff": {"placeholder": true},
            "ela_score": 0.62
        }
    })
}

/// A full sidecar as written next to a completed receipt
pub fn full_sidecar() -> Map<String, Value> {
    let value = json!({
        "heatmap": [[0.0, 0.1], [0.8, 0.9]],
        "pixel_diff": {"changed_pixels": 1532, "regions": [[10, 20, 30, 40]]},
        "technical_details": {"ela_analysis": "{'max_error': 37, 'suspicious': True}"},
        "ela_analysis": {"quality": 90},
        "forensic_findings_full": ["font mismatch on total", "cloned region near date"],
        "forensic_progress": [{"stage": "ela", "done": true}],
        "agent_logs": [{"agent": "vision"}, {"agent": "forensics"}],
        "image_dimensions": {"width": 1080, "height": 1920},
        "statistics": {"mean_error": 3.2}
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}
