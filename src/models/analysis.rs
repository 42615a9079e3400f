//! # Analysis Hydration
//!
//! Rebuilds the UI-ready analysis from the lightweight record and, when it
//! exists, the forensic sidecar. Sidecar precedence is spelled out one field at
//! a time in [`SIDECAR_MERGE_RULES`] so every override is visible in one place.

use serde::Serialize;
use serde_json::{Map, Value};

use super::present;
use crate::constants::fields;
use crate::error::{HydratorError, Result};
use crate::models::{ForensicSidecar, ReceiptRecord};
use crate::normalize::{normalize, normalize_ref};

/// Where the delivered analysis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationSource {
    /// Lightweight record merged with the forensic sidecar
    Sidecar,
    /// Sidecar missing or unreadable; lightweight fields only
    LightweightOnly,
    /// Hydration failed; the unmodified `analysis` payload
    Raw,
}

/// Which object a merge rule writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeScope {
    Root,
    ForensicDetails,
}

/// Value used when neither the sidecar nor the lightweight record has the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    EmptyArray,
    EmptyObject,
    Omit,
}

impl Fallback {
    fn value(self) -> Option<Value> {
        match self {
            Fallback::EmptyArray => Some(Value::Array(Vec::new())),
            Fallback::EmptyObject => Some(Value::Object(Map::new())),
            Fallback::Omit => None,
        }
    }
}

/// One sidecar-over-lightweight precedence rule
#[derive(Debug, Clone, Copy)]
pub struct MergeRule {
    pub scope: MergeScope,
    pub field: &'static str,
    pub sidecar_field: &'static str,
    pub fallback: Fallback,
}

const fn rule(
    scope: MergeScope,
    field: &'static str,
    sidecar_field: &'static str,
    fallback: Fallback,
) -> MergeRule {
    MergeRule {
        scope,
        field,
        sidecar_field,
        fallback,
    }
}

/// Sidecar value, else lightweight value, else fallback.
pub const SIDECAR_MERGE_RULES: &[MergeRule] = &[
    rule(MergeScope::Root, fields::AGENT_LOGS, fields::AGENT_LOGS, Fallback::EmptyArray),
    rule(MergeScope::ForensicDetails, fields::HEATMAP, fields::HEATMAP, Fallback::EmptyArray),
    rule(
        MergeScope::ForensicDetails,
        fields::PIXEL_DIFF,
        fields::PIXEL_DIFF,
        Fallback::EmptyObject,
    ),
    rule(
        MergeScope::ForensicDetails,
        fields::TECHNICAL_DETAILS,
        fields::TECHNICAL_DETAILS,
        Fallback::EmptyObject,
    ),
    rule(
        MergeScope::ForensicDetails,
        fields::ELA_ANALYSIS,
        fields::ELA_ANALYSIS,
        Fallback::EmptyObject,
    ),
    rule(
        MergeScope::ForensicDetails,
        fields::FORENSIC_FINDINGS,
        fields::FORENSIC_FINDINGS_FULL,
        Fallback::EmptyArray,
    ),
    rule(
        MergeScope::ForensicDetails,
        fields::FORENSIC_PROGRESS,
        fields::FORENSIC_PROGRESS,
        Fallback::EmptyArray,
    ),
    rule(MergeScope::ForensicDetails, fields::AGENT_LOGS, fields::AGENT_LOGS, Fallback::EmptyArray),
    rule(
        MergeScope::ForensicDetails,
        fields::IMAGE_DIMENSIONS,
        fields::IMAGE_DIMENSIONS,
        Fallback::Omit,
    ),
    rule(MergeScope::ForensicDetails, fields::STATISTICS, fields::STATISTICS, Fallback::Omit),
];

/// Merged analysis handed to `on_complete`
///
/// Serializes as the analysis object itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HydratedAnalysis {
    value: Value,
    #[serde(skip)]
    source: HydrationSource,
}

/// Compact description of a hydrated result, for logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydrationSummary {
    pub source: HydrationSource,
    pub has_heatmap: bool,
    pub heatmap_rows: usize,
    pub has_pixel_diff: bool,
    pub findings: usize,
}

impl HydratedAnalysis {
    /// Hydrate a completed record against an optional sidecar
    pub fn build(record: &ReceiptRecord, sidecar: Option<&ForensicSidecar>) -> Result<Self> {
        Ok(Self::from_parts(hydrate_lightweight(record)?, sidecar))
    }

    /// Finish hydration of an already lightweight-hydrated analysis
    pub fn from_parts(
        mut analysis: Map<String, Value>,
        sidecar: Option<&ForensicSidecar>,
    ) -> Self {
        merge_sidecar(&mut analysis, sidecar);
        normalize_nested_ela(&mut analysis);

        Self {
            value: Value::Object(analysis),
            source: if sidecar.is_some() {
                HydrationSource::Sidecar
            } else {
                HydrationSource::LightweightOnly
            },
        }
    }

    /// Wrap an unhydrated `analysis` payload as-is
    pub fn raw(value: Value) -> Self {
        Self {
            value,
            source: HydrationSource::Raw,
        }
    }

    pub fn source(&self) -> HydrationSource {
        self.source
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.value.get(field)
    }

    pub fn forensic_details(&self) -> Option<&Map<String, Value>> {
        self.value.get(fields::FORENSIC_DETAILS)?.as_object()
    }

    pub fn forensic_field(&self, field: &str) -> Option<&Value> {
        self.forensic_details()?.get(field)
    }

    pub fn agent_logs(&self) -> Option<&Vec<Value>> {
        self.value.get(fields::AGENT_LOGS)?.as_array()
    }

    pub fn heatmap(&self) -> Option<&Vec<Value>> {
        self.forensic_field(fields::HEATMAP)?.as_array()
    }

    pub fn summary(&self) -> HydrationSummary {
        let heatmap = self.heatmap();
        HydrationSummary {
            source: self.source,
            has_heatmap: heatmap.is_some(),
            heatmap_rows: heatmap.map_or(0, Vec::len),
            has_pixel_diff: self
                .forensic_field(fields::PIXEL_DIFF)
                .and_then(Value::as_object)
                .is_some_and(|diff| !diff.is_empty()),
            findings: self
                .forensic_field(fields::FORENSIC_FINDINGS)
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        }
    }
}

/// First hydration stage: lightweight record only.
///
/// Parses the stringified `agent_logs` and `forensic_findings`, and lifts the
/// root-level `ocr_text` and `processing_time` into the analysis. Fails only
/// when `analysis` or `forensic_details` is not an object.
pub fn hydrate_lightweight(record: &ReceiptRecord) -> Result<Map<String, Value>> {
    let raw = record.analysis().cloned().unwrap_or(Value::Null);
    let mut analysis = match normalize(raw) {
        Value::Object(map) => map,
        other => {
            return Err(HydratorError::unexpected_shape(
                fields::ANALYSIS,
                "object",
                &other,
            ))
        }
    };

    let mut forensic = match analysis.get(fields::FORENSIC_DETAILS).map(normalize_ref) {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(HydratorError::unexpected_shape(
                fields::FORENSIC_DETAILS,
                "object",
                &other,
            ))
        }
    };
    let findings = parsed_or_empty_array(forensic.get(fields::FORENSIC_FINDINGS));
    forensic.insert(fields::FORENSIC_FINDINGS.to_string(), findings);

    let ocr_text = record
        .ocr_text()
        .or_else(|| present(analysis.get(fields::OCR_TEXT)))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()));
    analysis.insert(fields::OCR_TEXT.to_string(), ocr_text);

    if let Some(processing_time) = record.processing_time() {
        analysis.insert(fields::PROCESSING_TIME.to_string(), processing_time.clone());
    }

    let agent_logs = parsed_or_empty_array(analysis.get(fields::AGENT_LOGS));
    analysis.insert(fields::AGENT_LOGS.to_string(), agent_logs);
    analysis.insert(fields::FORENSIC_DETAILS.to_string(), Value::Object(forensic));

    Ok(analysis)
}

/// Second hydration stage: apply [`SIDECAR_MERGE_RULES`].
///
/// Without a sidecar the rules still run, so sidecar-only fields get their
/// empty defaults and lightweight values are kept.
pub fn merge_sidecar(analysis: &mut Map<String, Value>, sidecar: Option<&ForensicSidecar>) {
    for rule in SIDECAR_MERGE_RULES {
        let target = match rule.scope {
            MergeScope::Root => Some(&mut *analysis),
            MergeScope::ForensicDetails => forensic_details_mut(analysis),
        };
        let Some(target) = target else {
            continue;
        };

        let merged = sidecar
            .and_then(|s| s.field(rule.sidecar_field))
            .or_else(|| present(target.get(rule.field)))
            .cloned()
            .or_else(|| rule.fallback.value());

        if let Some(value) = merged {
            target.insert(rule.field.to_string(), value);
        }
    }
}

/// `forensic_details` as an object, replacing any other value with `{}`
fn forensic_details_mut(analysis: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    let slot = analysis
        .entry(fields::FORENSIC_DETAILS)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

/// Older heatmap viewers expect `technical_details.ela_analysis` as an object
fn normalize_nested_ela(analysis: &mut Map<String, Value>) {
    let ela = analysis
        .get_mut(fields::FORENSIC_DETAILS)
        .and_then(Value::as_object_mut)
        .and_then(|fd| fd.get_mut(fields::TECHNICAL_DETAILS))
        .and_then(Value::as_object_mut)
        .and_then(|td| td.get_mut(fields::ELA_ANALYSIS));

    if let Some(slot) = ela {
        if slot.is_string() {
            *slot = normalize(slot.take());
        }
    }
}

fn parsed_or_empty_array(value: Option<&Value>) -> Value {
    present(value)
        .map(normalize_ref)
        .unwrap_or_else(|| Value::Array(Vec::new()))
}
