//! Journal storage — trait + file-backed implementation.
//!
//! Entries are written as pretty JSON into a date-partitioned directory
//! tree keyed by the batch start time.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{EntryId, JournalEntry, Operation};

/// Errors that can occur during journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("Journal entry not found: {0}")]
    NotFound(EntryId),

    #[error("Integrity check failed for journal entry {0}: stored hash does not match content")]
    IntegrityViolation(EntryId),

    #[error("Journal entry has no content hash (not finalized)")]
    NotFinalized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Filters for listing entries. Unset fields match everything.
#[derive(Debug, Default)]
pub struct JournalQuery {
    pub agent: Option<String>,
    pub operation: Option<Operation>,
    /// Only entries started at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Only entries started at or before this time.
    pub to: Option<DateTime<Utc>>,
}

impl JournalQuery {
    fn matches(&self, entry: &JournalEntry) -> bool {
        if let Some(agent) = &self.agent {
            if &entry.agent != agent {
                return false;
            }
        }
        if let Some(op) = self.operation {
            if entry.operation != op {
                return false;
            }
        }
        if let Some(from) = &self.from {
            if &entry.started_at < from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if &entry.started_at > to {
                return false;
            }
        }
        true
    }
}

/// Persistence backend for journal entries.
pub trait JournalStore: Send + Sync {
    /// Store a finalized entry. Unfinalized entries are rejected.
    fn save(&self, entry: &JournalEntry) -> Result<PathBuf, JournalError>;

    /// Load an entry by id, verifying its hash.
    fn get(&self, id: EntryId) -> Result<JournalEntry, JournalError>;

    /// Entries matching `query`, newest first.
    fn list(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>, JournalError>;
}

/// File-system backed journal.
///
/// ```text
/// {root}/
///   2025/
///     03/
///       14/
///         {entry_id}.json
/// ```
pub struct FileJournalStore {
    root: PathBuf,
}

impl FileJournalStore {
    /// Open (and create if needed) a journal rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, entry: &JournalEntry) -> PathBuf {
        let date = entry.started_at.format("%Y/%m/%d");
        self.root.join(format!("{}/{}.json", date, entry.id.0))
    }

    fn find_path(&self, id: EntryId) -> Result<PathBuf, JournalError> {
        let filename = format!("{}.json", id.0);
        find_file_recursive(&self.root, &filename).ok_or(JournalError::NotFound(id))
    }
}

impl JournalStore for FileJournalStore {
    fn save(&self, entry: &JournalEntry) -> Result<PathBuf, JournalError> {
        if entry.content_hash.is_none() {
            return Err(JournalError::NotFinalized);
        }

        let path = self.entry_path(entry);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(entry)?)?;

        tracing::debug!(
            entry_id = %entry.id,
            operation = %entry.operation,
            mutations = entry.mutations.len(),
            path = %path.display(),
            "Journal entry saved"
        );
        Ok(path)
    }

    fn get(&self, id: EntryId) -> Result<JournalEntry, JournalError> {
        let path = self.find_path(id)?;
        let entry: JournalEntry = serde_json::from_str(&fs::read_to_string(&path)?)?;

        if !entry.verify_integrity() {
            tracing::warn!(entry_id = %id, path = %path.display(), "Journal entry failed integrity check");
            return Err(JournalError::IntegrityViolation(id));
        }
        Ok(entry)
    }

    fn list(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>, JournalError> {
        let mut results = Vec::new();
        collect_entries_recursive(&self.root, query, &mut results)?;
        results.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(results)
    }
}

fn find_file_recursive(dir: &Path, filename: &str) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    for entry in fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_file_recursive(&path, filename) {
                return Some(found);
            }
        } else if path.file_name().and_then(|n| n.to_str()) == Some(filename) {
            return Some(path);
        }
    }
    None
}

fn collect_entries_recursive(
    dir: &Path,
    query: &JournalQuery,
    results: &mut Vec<JournalEntry>,
) -> Result<(), JournalError> {
    if !dir.is_dir() {
        return Ok(());
    }

    for dir_entry in fs::read_dir(dir)?.flatten() {
        let path = dir_entry.path();
        if path.is_dir() {
            collect_entries_recursive(&path, query, results)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            let entry: JournalEntry = match serde_json::from_str(&fs::read_to_string(&path)?) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Skipping unreadable journal file");
                    continue;
                }
            };
            if query.matches(&entry) {
                results.push(entry);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::JournalSession;

    fn ingest_entry(agent: &str) -> JournalEntry {
        let mut session = JournalSession::new(agent, Operation::Ingest);
        session.set_context(serde_json::json!({"text": "Draft plan. Review plan."}));
        session.record_node("task-a", "Task");
        session.record_node("task-b", "Task");
        session.record_edge("task-b", "task-a", "depends_on");
        session.finalize().unwrap()
    }

    fn enrich_entry(agent: &str) -> JournalEntry {
        let mut session = JournalSession::new(agent, Operation::Enrich);
        session.record_node("person-a", "Person");
        session.record_edge("person-a", "task-a", "assigned_to");
        session.finalize().unwrap()
    }

    #[test]
    fn save_and_retrieve() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJournalStore::new(dir.path()).unwrap();
        let entry = ingest_entry("AI");
        let id = entry.id;

        let path = store.save(&entry).unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path
            .to_string_lossy()
            .contains(&entry.started_at.format("%Y/%m/%d").to_string()));

        let retrieved = store.get(id).unwrap();
        assert_eq!(retrieved, entry);
        assert_eq!(retrieved.nodes_created(), 2);
        assert!(retrieved.verify_integrity());
    }

    #[test]
    fn integrity_violation_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJournalStore::new(dir.path()).unwrap();
        let entry = ingest_entry("AI");
        let id = entry.id;
        store.save(&entry).unwrap();

        let path = store.find_path(id).unwrap();
        let mut tampered: JournalEntry =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        tampered.mutations.pop();
        fs::write(&path, serde_json::to_string_pretty(&tampered).unwrap()).unwrap();

        assert!(matches!(
            store.get(id),
            Err(JournalError::IntegrityViolation(_))
        ));
    }

    #[test]
    fn save_rejects_unfinalized() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJournalStore::new(dir.path()).unwrap();

        let mut entry = ingest_entry("AI");
        entry.content_hash = None;
        assert!(matches!(store.save(&entry), Err(JournalError::NotFinalized)));
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJournalStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.get(EntryId::new()),
            Err(JournalError::NotFound(_))
        ));
    }

    #[test]
    fn list_filters_by_agent_and_operation() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJournalStore::new(dir.path()).unwrap();

        store.save(&ingest_entry("AI")).unwrap();
        store.save(&enrich_entry("AI")).unwrap();
        store.save(&ingest_entry("importer")).unwrap();

        let by_agent = store
            .list(&JournalQuery {
                agent: Some("AI".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_agent.len(), 2);

        let by_op = store
            .list(&JournalQuery {
                operation: Some(Operation::Enrich),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_op.len(), 1);
        assert_eq!(by_op[0].operation, Operation::Enrich);
    }

    #[test]
    fn list_skips_files_that_are_not_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJournalStore::new(dir.path()).unwrap();
        let entry = ingest_entry("AI");
        store.save(&entry).unwrap();

        fs::write(store.root().join("notes.json"), "{}").unwrap();
        fs::write(store.root().join("broken.json"), "not json at all").unwrap();

        let all = store.list(&JournalQuery::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, entry.id);
    }

    #[test]
    fn list_orders_newest_first_and_filters_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileJournalStore::new(dir.path()).unwrap();

        let mut older = ingest_entry("AI");
        older.started_at = Utc::now() - chrono::Duration::days(3);
        older.content_hash = Some(older.compute_hash().unwrap());
        let newer = ingest_entry("AI");

        store.save(&older).unwrap();
        store.save(&newer).unwrap();

        let all = store.list(&JournalQuery::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);

        let recent = store
            .list(&JournalQuery {
                from: Some(Utc::now() - chrono::Duration::days(1)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, newer.id);
    }
}
