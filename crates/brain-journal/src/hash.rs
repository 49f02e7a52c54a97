//! BLAKE3 content hashing for tamper evidence.
//!
//! The hash covers a canonical JSON rendering of every entry field except
//! `content_hash`, so any edit to a stored entry changes the digest.

use serde::Serialize;

use crate::store::JournalError;
use crate::{EntryId, JournalEntry, Mutation, Operation};

/// Hashable view of a [`JournalEntry`] (excludes `content_hash`).
#[derive(Serialize)]
struct HashableEntry<'a> {
    id: &'a EntryId,
    agent: &'a str,
    operation: &'a Operation,
    context: &'a serde_json::Value,
    mutations: &'a [Mutation],
    started_at: &'a chrono::DateTime<chrono::Utc>,
    completed_at: &'a Option<chrono::DateTime<chrono::Utc>>,
}

/// Hex-encoded BLAKE3 hash of an entry's content.
pub fn compute_entry_hash(entry: &JournalEntry) -> Result<String, JournalError> {
    let hashable = HashableEntry {
        id: &entry.id,
        agent: &entry.agent,
        operation: &entry.operation,
        context: &entry.context,
        mutations: &entry.mutations,
        started_at: &entry.started_at,
        completed_at: &entry.completed_at,
    };

    let json = serde_json::to_vec(&hashable)?;
    Ok(blake3::hash(&json).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::JournalSession;

    #[test]
    fn hash_is_stable_and_ignores_stored_hash() {
        let mut session = JournalSession::new("AI", Operation::Ingest);
        session.record_node("task-1", "Task");
        let entry = session.finalize().unwrap();

        let first = compute_entry_hash(&entry).unwrap();
        let mut copy = entry.clone();
        copy.content_hash = Some("something else".into());
        assert_eq!(first, compute_entry_hash(&copy).unwrap());
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn hash_changes_with_content() {
        let mut session = JournalSession::new("AI", Operation::Enrich);
        session.record_node("person-1", "Person");
        let entry = session.finalize().unwrap();

        let mut edited = entry.clone();
        edited.agent = "user".into();
        assert_ne!(
            compute_entry_hash(&entry).unwrap(),
            compute_entry_hash(&edited).unwrap()
        );
    }
}
