//! The document abstraction shared by every editable resource.
//!
//! Each resource is one JSON document in the content store. A `Document`
//! type names its logical file, knows its fallback value, and decodes and
//! validates admin payloads; the API layer implements GET/PUT once on top
//! of it.

use std::collections::HashSet;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::store::ReadOutcome;

/// A JSON document stored under a fixed logical name.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    /// Logical name in the content store.
    const NAME: &'static str;
    /// Plural label used in error messages.
    const LABEL: &'static str;
    /// Public responses are cached until the next admin write.
    const PUBLIC_CACHED: bool = false;

    /// Value served before anything has been saved.
    fn fallback() -> Self;

    /// Apply shape defaults to a decoded document.
    fn normalize(self) -> Self {
        self
    }

    /// Decode and validate an admin payload.
    fn from_payload(body: Value) -> Result<Self, AppError>;

    /// Decode stored text. Blank text counts as "nothing saved".
    fn decode_stored(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::fallback());
        }
        serde_json::from_str::<Self>(text).map(Self::normalize)
    }

    /// Decode the result of a store read.
    fn load(outcome: &ReadOutcome) -> Result<Self, serde_json::Error> {
        match outcome.text() {
            Some(text) => Self::decode_stored(text),
            None => Ok(Self::fallback()),
        }
    }

    /// Serialized form written to the store.
    fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A collection document whose entries are identified by slug.
pub trait SlugCollection: Document {
    type Item: Serialize + Send + Sync;

    /// Slug used when a title produces nothing usable.
    const SLUG_FALLBACK: &'static str;
    /// Message for an unknown slug.
    const NOT_FOUND: &'static str;

    fn items(&self) -> &[Self::Item];

    fn slug_of(item: &Self::Item) -> &str;

    fn slugs(&self) -> HashSet<String> {
        self.items()
            .iter()
            .map(|item| Self::slug_of(item).to_string())
            .collect()
    }

    fn find(&self, slug: &str) -> Option<&Self::Item> {
        self.items().iter().find(|item| Self::slug_of(item) == slug)
    }
}

/// Accept either a bare array or `{ <key>: [...] }`.
pub fn collection_payload(body: Value, key: &str) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Accept either an object or an array whose first element is the object.
pub fn singleton_payload(body: Value) -> Result<Map<String, Value>, AppError> {
    let value = match body {
        Value::Array(items) => items
            .into_iter()
            .next()
            .unwrap_or_else(|| Value::Object(Map::new())),
        other => other,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::validation("Invalid payload.")),
    }
}

/// Decode one collection entry; non-objects are rejected with `message`.
pub fn decode_item<T: DeserializeOwned>(value: Value, message: &str) -> Result<T, AppError> {
    if !value.is_object() {
        return Err(AppError::validation(message));
    }
    serde_json::from_value(value).map_err(|e| {
        tracing::debug!("Rejected entry: {}", e);
        AppError::validation(message)
    })
}

/// Track identifiers, failing on the first repeat.
pub fn ensure_unique(seen: &mut HashSet<String>, id: &str, what: &str) -> Result<(), AppError> {
    if seen.insert(id.to_string()) {
        Ok(())
    } else {
        Err(AppError::validation(format!("Duplicate {}: {}.", what, id)))
    }
}

/// Deserialize a string field, tolerating `null`, numbers and booleans.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Deserialize a list of strings, tolerating `null` and dropping non-strings.
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_payload_shapes() {
        assert_eq!(
            collection_payload(json!([1, 2]), "projects"),
            Some(vec![json!(1), json!(2)])
        );
        assert_eq!(
            collection_payload(json!({ "projects": [1] }), "projects"),
            Some(vec![json!(1)])
        );
        assert_eq!(collection_payload(json!({ "items": [1] }), "projects"), None);
        assert_eq!(collection_payload(json!("nope"), "projects"), None);
    }

    #[test]
    fn test_singleton_payload_shapes() {
        assert_eq!(
            singleton_payload(json!([{ "a": 1 }, { "b": 2 }])).unwrap(),
            json!({ "a": 1 }).as_object().unwrap().clone()
        );
        assert!(singleton_payload(json!([])).unwrap().is_empty());
        assert!(singleton_payload(json!({ "a": 1 })).is_ok());
        assert!(singleton_payload(json!([5])).is_err());
        assert!(singleton_payload(json!(null)).is_err());
    }

    #[test]
    fn test_ensure_unique() {
        let mut seen = HashSet::new();
        assert!(ensure_unique(&mut seen, "a", "project slug").is_ok());
        let err = ensure_unique(&mut seen, "a", "project slug").unwrap_err();
        assert_eq!(err.message(), "Duplicate project slug: a.");
    }
}
