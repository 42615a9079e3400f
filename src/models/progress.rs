//! Agent progress events built from the flattened `progress_*` fields.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::present;
use crate::constants::fields;
use crate::normalize::normalize_ref;

/// One progress update from an analysis agent
///
/// # Examples
///
/// ```rust
/// use receipt_hydrator::models::AgentProgress;
/// use serde_json::json;
///
/// let data = json!({
///     "progress_agent": "vision",
///     "progress_stage": "vision_ocr_started",
///     "progress_percentage": 30,
///     "progress_detail_file": "{'name': 'a.jpg'}",
/// });
/// let progress = AgentProgress::from_fields(data.as_object().unwrap(), "progress_detail_").unwrap();
///
/// assert_eq!(progress.agent, "vision");
/// assert_eq!(progress.progress, 30.0);
/// assert_eq!(progress.details["file"], json!({"name": "a.jpg"}));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentProgress {
    pub agent: String,
    pub stage: String,
    pub message: String,
    /// Percentage in `0.0..=100.0`
    pub progress: f64,
    pub timestamp: String,
    #[serde(default)]
    pub details: HashMap<String, Value>,
}

impl AgentProgress {
    /// Build progress from a flat record.
    ///
    /// Returns `None` unless both `progress_agent` and `progress_stage` are set.
    /// Every `{detail_prefix}*` field is normalized and keyed by its suffix.
    pub fn from_fields(data: &Map<String, Value>, detail_prefix: &str) -> Option<Self> {
        let agent = text_field(data, fields::PROGRESS_AGENT)?;
        let stage = text_field(data, fields::PROGRESS_STAGE)?;

        let details = data
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(detail_prefix)
                    .map(|detail_key| (detail_key.to_string(), normalize_ref(value)))
            })
            .collect();

        Some(Self {
            agent,
            stage,
            message: text_field(data, fields::PROGRESS_MESSAGE).unwrap_or_default(),
            progress: percentage(data.get(fields::PROGRESS_PERCENTAGE)),
            timestamp: timestamp(data.get(fields::PROGRESS_TIMESTAMP))
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
            details,
        })
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

fn text_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    match present(data.get(key))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn percentage(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

/// Accepts RFC 3339 text, epoch milliseconds, or a `{seconds, nanoseconds}` store timestamp
fn timestamp(value: Option<&Value>) -> Option<String> {
    match present(value)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            let millis = n.as_i64()?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|dt: DateTime<Utc>| dt.to_rfc3339())
        }
        Value::Object(map) => {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?)
                .single()
                .map(|dt| dt.to_rfc3339())
        }
        _ => None,
    }
}
