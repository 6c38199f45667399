//! Append-only audit trail stored in the `audit_log` collection.

use crate::errors::AppResult;
use crate::models::audit::AuditEntry;
use crate::store::{Collection, DocumentStore, Entity, Stored};

/// Append one entry, then drop the oldest ones beyond `cap` (0 = unbounded).
pub fn record<S: DocumentStore + ?Sized>(
    store: &S,
    cap: usize,
    action: &str,
    details: String,
) -> AppResult<()> {
    let entry = AuditEntry::new(action, details);
    store.insert(Collection::AuditLog, entry.to_data()?)?;

    if cap > 0 {
        let docs = store.list(Collection::AuditLog)?;
        if docs.len() > cap {
            let excess = docs.len() - cap;
            let stale: Vec<String> = docs
                .into_iter()
                .take(excess)
                .map(|d| d.id)
                .collect();
            store.batch_delete(Collection::AuditLog, &stale)?;
        }
    }
    Ok(())
}

/// Newest first, optionally limited.
pub fn recent<S: DocumentStore + ?Sized>(
    store: &S,
    limit: Option<usize>,
) -> AppResult<Vec<AuditEntry>> {
    let mut entries = store
        .list(Collection::AuditLog)?
        .into_iter()
        .map(|d| AuditEntry::from_document(d).map(Stored::into_inner))
        .collect::<AppResult<Vec<_>>>()?;

    entries.reverse();
    if let Some(n) = limit {
        entries.truncate(n);
    }
    Ok(entries)
}
