//! # Field Normalization
//!
//! The receipt store does not enforce a schema on detail fields, and some upstream
//! producers serialize containers with Python literal conventions (`'` quotes,
//! `True`/`False`/`None`). Normalization turns container-shaped strings back into
//! structured JSON and leaves everything else alone.
//!
//! ```rust
//! use receipt_hydrator::normalize::normalize;
//! use serde_json::json;
//!
//! assert_eq!(normalize(json!("{'ok': True}")), json!({"ok": true}));
//! assert_eq!(normalize(json!("Merchant Name")), json!("Merchant Name"));
//! assert_eq!(normalize(json!(42)), json!(42));
//! ```

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

/// Result of trying to parse a loosely serialized string
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The string decoded to structured data
    Parsed(Value),
    /// The string is returned as-is
    Unparsed(String),
}

impl ParseOutcome {
    /// Collapse into a plain JSON value, keeping unparsed text as a string
    pub fn into_value(self) -> Value {
        match self {
            ParseOutcome::Parsed(value) => value,
            ParseOutcome::Unparsed(raw) => Value::String(raw),
        }
    }
}

/// Normalize a field value read from the store.
///
/// Non-string values pass through untouched. Strings are parsed only when they
/// look like a JSON object or array; anything that still fails to parse is
/// returned unchanged.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::String(raw) => parse_loose(raw).into_value(),
        other => other,
    }
}

/// Borrowing variant of [`normalize`]
pub fn normalize_ref(value: &Value) -> Value {
    match value {
        Value::String(raw) if looks_structured(raw) => parse_loose(raw.clone()).into_value(),
        other => other.clone(),
    }
}

/// Strict parse, then repaired parse, then give up and hand the string back.
pub fn parse_loose(raw: String) -> ParseOutcome {
    if !looks_structured(&raw) {
        return ParseOutcome::Unparsed(raw);
    }

    if let Ok(value) = serde_json::from_str::<Value>(&raw) {
        return ParseOutcome::Parsed(value);
    }

    match serde_json::from_str::<Value>(&repair_foreign_literals(&raw)) {
        Ok(value) => ParseOutcome::Parsed(value),
        Err(_) => ParseOutcome::Unparsed(raw),
    }
}

/// Whether a string is shaped like a serialized object or array
pub fn looks_structured(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Rewrite Python-style literals into JSON.
///
/// Every single quote becomes a double quote, including apostrophes inside
/// string values, so `{"note": "user's receipt"}`-style inputs do not survive
/// this pass.
pub fn repair_foreign_literals(raw: &str) -> String {
    let quoted = raw.replace('\'', "\"");
    foreign_literal_pattern()
        .replace_all(&quoted, |caps: &Captures<'_>| match &caps[1] {
            "True" => "true",
            "False" => "false",
            _ => "null",
        })
        .into_owned()
}

fn foreign_literal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?-u:\b)(True|False|None)(?-u:\b)").expect("literal pattern is valid")
    })
}
