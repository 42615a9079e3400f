use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for JSON scalars that survive a Python-literal round trip
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-10_000i64..10_000).prop_map(Value::from),
        "[a-z][a-z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

/// Strategy for flat objects keyed by identifiers
pub fn flat_object_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z_][a-z0-9_]{0,10}", scalar_strategy(), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Strategy for container values: a flat object or a list of scalars
pub fn container_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        flat_object_strategy().prop_map(Value::Object),
        prop::collection::vec(scalar_strategy(), 0..6).prop_map(Value::Array),
    ]
}

/// Strategy for plain text that is not shaped like a container
pub fn plain_text_strategy() -> impl Strategy<Value = String> {
    "[^{\\[\\s][^\\n]{0,40}"
}

/// Render a value the way a Python producer would print it
pub fn python_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{s}'"),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(python_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{k}': {}", python_repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}
