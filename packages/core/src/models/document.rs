//! Editor document wrapper
//!
//! The rich-text editor produces and consumes a JSON document tree. The
//! workspace stores it opaquely; the only structural knowledge kept here is
//! what an empty draft looks like and how to pull plain text out for the
//! in-memory store's substring search.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Opaque editor document (`{"type": "doc", "content": [...]}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentContent(Value);

impl DocumentContent {
    /// Empty document used for new pages and drafts
    pub fn empty() -> Self {
        Self(json!({ "type": "doc", "content": [] }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// True for JSON null and for a doc whose `content` array is missing or empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => match map.get("content") {
                None | Some(Value::Null) => true,
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            },
            _ => false,
        }
    }

    /// Concatenated `text` leaves, separated by single spaces
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        collect_text(&self.0, &mut parts);
        parts.join(" ")
    }
}

impl Default for DocumentContent {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for DocumentContent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn collect_text<'a>(value: &'a Value, parts: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                parts.push(text);
            }
            if let Some(children) = map.get("content") {
                collect_text(children, parts);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_text(item, parts);
            }
        }
        _ => {}
    }
}
