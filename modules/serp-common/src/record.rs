//! Best-effort field access on opaque SERP records.
//!
//! Items arrive as arbitrary JSON. Only objects are treated as records, and
//! individual fields are read without failing when they are missing or
//! carry an unexpected type.

use serde_json::{Map, Value};

/// A SERP item that is a field mapping.
pub type Record = Map<String, Value>;

/// View an item as a record, or `None` if it is not a JSON object.
pub fn as_record(item: &Value) -> Option<&Record> {
    item.as_object()
}

/// Get a text field if present. Missing keys and non-string values are `None`.
pub fn text_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// Text as a store can hold it. JSON strings may carry `\u0000`, which
/// Postgres rejects in `TEXT`, so NUL characters are dropped.
pub fn storable_text(text: &str) -> String {
    text.replace('\0', "")
}
