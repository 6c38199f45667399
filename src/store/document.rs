//! Raw documents and their typed views.

use crate::errors::{AppError, AppResult};
use crate::store::{Collection, Condition, Filter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A stored document: opaque id, write version and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub version: u64,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn matches(&self, filters: &[Filter]) -> bool {
        filters
            .iter()
            .all(|(field, value)| self.data.get(field) == Some(value))
    }

    pub fn field_eq(&self, field: &str, value: &Value) -> bool {
        self.data.get(field) == Some(value)
    }

    /// Shallow merge: top-level keys of `patch` replace those of the body.
    pub fn apply_patch(&mut self, patch: Map<String, Value>) {
        for (k, v) in patch {
            self.data.insert(k, v);
        }
        self.version += 1;
    }
}

/// A typed document that lives in a fixed collection.
///
/// The id is owned by the store, so implementors keep it out of the
/// serialized body and receive it back through `set_id`.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    fn to_data(&self) -> AppResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::Store(format!(
                "{} did not serialize to an object: {}",
                Self::KIND,
                other
            ))),
        }
    }

    fn from_document(doc: Document) -> AppResult<Stored<Self>> {
        let mut value: Self = serde_json::from_value(Value::Object(doc.data))?;
        value.set_id(doc.id);
        Ok(Stored {
            version: doc.version,
            value,
        })
    }
}

/// An entity together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub version: u64,
    pub value: T,
}

impl<T: Entity> Stored<T> {
    pub fn id(&self) -> &str {
        self.value.id()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Build a `field == value` filter from anything serializable.
pub fn filter<V: Serialize>(field: &str, value: V) -> AppResult<Filter> {
    Ok((field.to_string(), serde_json::to_value(value)?))
}

/// Convert a failed precondition into the error callers retry on.
pub fn conflict(cond: &Condition) -> AppError {
    match cond {
        Condition::VersionEquals { collection, id, .. } => AppError::Conflict {
            collection: collection.to_string(),
            id: id.clone(),
        },
        Condition::NoneMatching {
            collection,
            filters,
        } => AppError::Conflict {
            collection: collection.to_string(),
            id: filters
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(","),
        },
    }
}
