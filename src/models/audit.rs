use crate::store::document::Entity;
use crate::store::Collection;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One line of the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    #[serde(skip)]
    pub id: String,
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Local>,
}

impl AuditEntry {
    pub fn new(action: &str, details: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            action: action.to_string(),
            details: details.into(),
            timestamp: Local::now(),
        }
    }
}

impl Entity for AuditEntry {
    const COLLECTION: Collection = Collection::AuditLog;
    const KIND: &'static str = "Audit entry";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
