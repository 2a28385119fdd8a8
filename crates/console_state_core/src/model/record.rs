//! Generic JSON-object entity record.
//!
//! # Responsibility
//! - Hold loosely-typed entity payloads (events and similar) as JSON objects.
//! - Provide the recursive merge used when an already-known entity is added.
//!
//! # Invariants
//! - Every `Record` is a JSON object with a string `id` field.
//! - `deep_merge` recurses only where both sides are objects; arrays and
//!   scalars are replaced whole.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field name that carries the entity identifier.
pub const RECORD_ID_FIELD: &str = "id";

/// Boundary validation errors for untyped records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Payload was not a JSON object.
    NotAnObject,
    /// Payload had no `id`, or `id` was not a string.
    MissingId,
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "record must be a JSON object"),
            Self::MissingId => write!(f, "record must carry a string `{RECORD_ID_FIELD}` field"),
        }
    }
}

impl Error for RecordError {}

/// JSON-object entity identified by its `id` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Builds a record from any JSON value, validating shape and identifier.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(fields) => Self::from_map(fields),
            _ => Err(RecordError::NotAnObject),
        }
    }

    /// Builds a record from an object map.
    pub fn from_map(fields: Map<String, Value>) -> Result<Self, RecordError> {
        match fields.get(RECORD_ID_FIELD) {
            Some(Value::String(_)) => Ok(Self { fields }),
            _ => Err(RecordError::MissingId),
        }
    }

    /// Returns the record identifier.
    pub fn id(&self) -> &str {
        self.fields
            .get(RECORD_ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Merges `incoming` into `self`, incoming values winning on conflict.
    ///
    /// Object-valued fields present on both sides merge key by key, at any
    /// depth. Everything else, arrays included, is replaced outright.
    pub fn deep_merge(&mut self, incoming: Record) {
        merge_maps(&mut self.fields, incoming.fields);
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for Record {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

fn merge_maps(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_maps(existing, nested),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordError};
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).expect("fixture should be a valid record")
    }

    #[test]
    fn from_value_rejects_non_objects_and_missing_ids() {
        assert_eq!(
            Record::from_value(json!(["x"])).unwrap_err(),
            RecordError::NotAnObject
        );
        assert_eq!(
            Record::from_value(json!({"name": "a"})).unwrap_err(),
            RecordError::MissingId
        );
        assert_eq!(
            Record::from_value(json!({"id": 7})).unwrap_err(),
            RecordError::MissingId
        );
    }

    #[test]
    fn deep_merge_recurses_into_objects_and_replaces_arrays() {
        let mut existing = record(json!({
            "id": "e1",
            "title": "old",
            "context": {"browser": "firefox", "os": {"name": "linux", "version": "6"}},
            "tags": ["a", "b"]
        }));
        existing.deep_merge(record(json!({
            "id": "e1",
            "context": {"os": {"version": "7"}},
            "tags": ["c"]
        })));

        assert_eq!(
            existing.into_value(),
            json!({
                "id": "e1",
                "title": "old",
                "context": {"browser": "firefox", "os": {"name": "linux", "version": "7"}},
                "tags": ["c"]
            })
        );
    }

    #[test]
    fn deep_merge_replaces_object_with_scalar() {
        let mut existing = record(json!({"id": "e1", "meta": {"a": 1}}));
        existing.deep_merge(record(json!({"id": "e1", "meta": null})));
        assert_eq!(existing.get("meta"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn deserialize_validates_through_try_from() {
        let err = serde_json::from_value::<Record>(json!({"title": "no id"})).unwrap_err();
        assert!(err.to_string().contains("string `id`"), "unexpected: {err}");
    }
}
