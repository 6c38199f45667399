//! In-memory document store.
//!
//! Everything lives behind one mutex, which makes `commit` trivially atomic.
//! Nothing is persisted.

use crate::errors::{AppError, AppResult};
use crate::store::document::conflict;
use crate::store::{Collection, Condition, Document, DocumentStore, Write, WriteBatch};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, HashMap<Collection, Vec<Document>>>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn condition_holds(state: &HashMap<Collection, Vec<Document>>, cond: &Condition) -> bool {
    match cond {
        Condition::VersionEquals {
            collection,
            id,
            version,
        } => state
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| &d.id == id))
            .map(|d| d.version == *version)
            .unwrap_or(false),
        Condition::NoneMatching {
            collection,
            filters,
        } => !state
            .get(collection)
            .map(|docs| docs.iter().any(|d| d.matches(filters)))
            .unwrap_or(false),
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, collection: Collection, data: Map<String, Value>) -> AppResult<String> {
        let mut state = self.lock()?;
        let id = new_id();
        state.entry(collection).or_default().push(Document {
            id: id.clone(),
            version: 1,
            data,
        });
        Ok(id)
    }

    fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        let state = self.lock()?;
        Ok(state
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    fn query(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> AppResult<Vec<Document>> {
        let state = self.lock()?;
        Ok(state
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.field_eq(field, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list(&self, collection: Collection) -> AppResult<Vec<Document>> {
        let state = self.lock()?;
        Ok(state.get(&collection).cloned().unwrap_or_default())
    }

    fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> AppResult<()> {
        let mut state = self.lock()?;
        let doc = state
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| AppError::not_found("Document", format!("{collection}/{id}")))?;
        doc.apply_patch(patch);
        Ok(())
    }

    fn batch_delete(&self, collection: Collection, ids: &[String]) -> AppResult<usize> {
        let mut state = self.lock()?;
        let Some(docs) = state.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !ids.contains(&d.id));
        Ok(before - docs.len())
    }

    fn commit(&self, batch: WriteBatch) -> AppResult<Vec<String>> {
        let mut state = self.lock()?;

        if let Some(failed) = batch
            .conditions
            .iter()
            .find(|c| !condition_holds(&state, c))
        {
            return Err(conflict(failed));
        }

        // Every update target must exist before anything is touched.
        for w in &batch.writes {
            if let Write::Update { collection, id, .. } = w {
                let exists = state
                    .get(collection)
                    .map(|docs| docs.iter().any(|d| &d.id == id))
                    .unwrap_or(false);
                if !exists {
                    return Err(AppError::not_found(
                        "Document",
                        format!("{collection}/{id}"),
                    ));
                }
            }
        }

        let mut inserted = Vec::new();
        for w in batch.writes {
            match w {
                Write::Insert { collection, data } => {
                    let id = new_id();
                    state.entry(collection).or_default().push(Document {
                        id: id.clone(),
                        version: 1,
                        data,
                    });
                    inserted.push(id);
                }
                Write::Update {
                    collection,
                    id,
                    patch,
                } => {
                    if let Some(doc) = state
                        .get_mut(&collection)
                        .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                    {
                        doc.apply_patch(patch);
                    }
                }
                Write::Delete { collection, ids } => {
                    if let Some(docs) = state.get_mut(&collection) {
                        docs.retain(|d| !ids.contains(&d.id));
                    }
                }
            }
        }

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn insert_get_query_update_delete() {
        let store = MemoryStore::new();
        let a = store
            .insert(Collection::Workers, body(json!({"siteId": "s1", "name": "A"})))
            .unwrap();
        let b = store
            .insert(Collection::Workers, body(json!({"siteId": "s2", "name": "B"})))
            .unwrap();

        let got = store.get(Collection::Workers, &a).unwrap().unwrap();
        assert_eq!(got.version, 1);
        assert_eq!(got.data["name"], "A");

        let s1 = store
            .query(Collection::Workers, "siteId", &json!("s1"))
            .unwrap();
        assert_eq!(s1.len(), 1);
        assert_eq!(s1[0].id, a);

        store
            .update(Collection::Workers, &b, body(json!({"name": "Bee"})))
            .unwrap();
        let b_doc = store.get(Collection::Workers, &b).unwrap().unwrap();
        assert_eq!(b_doc.version, 2);
        assert_eq!(b_doc.data["name"], "Bee");

        let removed = store
            .batch_delete(Collection::Workers, &[a.clone(), "missing".into()])
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(Collection::Workers, &a).unwrap().is_none());
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update(Collection::Sites, "nope", Map::new())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn stale_version_rejects_whole_batch() {
        let store = MemoryStore::new();
        let w = store
            .insert(Collection::Workers, body(json!({"pendingAmount": 100})))
            .unwrap();
        store
            .update(Collection::Workers, &w, body(json!({"pendingAmount": 50})))
            .unwrap();

        let batch = WriteBatch::new()
            .expect_version(Collection::Workers, &w, 1)
            .insert(Collection::Payments, body(json!({"workerId": w, "amount": 100})))
            .update(Collection::Workers, &w, body(json!({"pendingAmount": 0})));

        let err = store.commit(batch).unwrap_err();
        assert!(err.is_conflict());
        assert!(store.list(Collection::Payments).unwrap().is_empty());
        let doc = store.get(Collection::Workers, &w).unwrap().unwrap();
        assert_eq!(doc.data["pendingAmount"], 50);
    }

    #[test]
    fn none_matching_guards_uniqueness() {
        let store = MemoryStore::new();
        store
            .insert(
                Collection::Attendance,
                body(json!({"workerId": "w1", "date": "2025-09-01"})),
            )
            .unwrap();

        let dup = WriteBatch::new().expect_none(
            Collection::Attendance,
            vec![
                ("workerId".into(), json!("w1")),
                ("date".into(), json!("2025-09-01")),
            ],
        );
        assert!(store.commit(dup).unwrap_err().is_conflict());

        let other_day = WriteBatch::new()
            .expect_none(
                Collection::Attendance,
                vec![
                    ("workerId".into(), json!("w1")),
                    ("date".into(), json!("2025-09-02")),
                ],
            )
            .insert(
                Collection::Attendance,
                body(json!({"workerId": "w1", "date": "2025-09-02"})),
            );
        let ids = store.commit(other_day).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.list(Collection::Attendance).unwrap().len(), 2);
    }

    #[test]
    fn batch_delete_and_update_apply_together() {
        let store = MemoryStore::new();
        let site = store
            .insert(Collection::Sites, body(json!({"name": "North"})))
            .unwrap();
        let w = store
            .insert(Collection::Workers, body(json!({"siteId": site})))
            .unwrap();

        store
            .commit(
                WriteBatch::new()
                    .expect_version(Collection::Workers, &w, 1)
                    .delete(Collection::Workers, vec![w.clone(), "gone".into()])
                    .update(Collection::Sites, &site, body(json!({"name": "North-2"}))),
            )
            .unwrap();

        assert!(store.list(Collection::Workers).unwrap().is_empty());
        let doc = store.get(Collection::Sites, &site).unwrap().unwrap();
        assert_eq!(doc.version, 2);
    }
}
