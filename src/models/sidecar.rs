use serde_json::{Map, Value};

use super::present;

/// Heavy forensic payload stored beside the lightweight record
///
/// Written once by the backend when analysis finishes. Holds the full-resolution
/// artifacts (`heatmap`, `pixel_diff`, `technical_details`, `ela_analysis`,
/// `forensic_findings_full`, `forensic_progress`, `agent_logs`,
/// `image_dimensions`, `statistics`) that do not fit the lightweight record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForensicSidecar {
    data: Map<String, Value>,
}

impl ForensicSidecar {
    pub fn from_document(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// A sidecar field, ignoring null and empty-string placeholders
    pub fn field(&self, name: &str) -> Option<&Value> {
        present(self.data.get(name))
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl From<Map<String, Value>> for ForensicSidecar {
    fn from(data: Map<String, Value>) -> Self {
        Self::from_document(data)
    }
}
