//! Builder-style recorder for one mutation batch.
//!
//! ```no_run
//! # use brain_journal::{JournalSession, Operation};
//! let mut session = JournalSession::new("AI", Operation::Ingest);
//! session.set_context(serde_json::json!({"text": "Draft plan. Review plan."}));
//! session.record_node("task-1", "Task");
//! session.record_node("task-2", "Task");
//! session.record_edge("task-2", "task-1", "depends_on");
//! let entry = session.finalize().unwrap();
//! assert!(entry.verify_integrity());
//! ```

use chrono::Utc;

use crate::store::JournalError;
use crate::{EntryId, JournalEntry, Mutation, Operation};

/// Records the writes of one batch as they happen.
pub struct JournalSession {
    entry: JournalEntry,
}

impl JournalSession {
    pub fn new(agent: &str, operation: Operation) -> Self {
        Self {
            entry: JournalEntry {
                id: EntryId::new(),
                agent: agent.to_string(),
                operation,
                context: serde_json::Value::Null,
                mutations: Vec::new(),
                started_at: Utc::now(),
                completed_at: None,
                content_hash: None,
            },
        }
    }

    pub fn set_context(&mut self, context: serde_json::Value) {
        self.entry.context = context;
    }

    pub fn record_node(&mut self, id: &str, node_type: &str) {
        self.entry.mutations.push(Mutation::NodeCreated {
            id: id.to_string(),
            node_type: node_type.to_string(),
            at: Utc::now(),
        });
    }

    pub fn record_edge(&mut self, source: &str, target: &str, edge_type: &str) {
        self.entry.mutations.push(Mutation::EdgeCreated {
            source: source.to_string(),
            target: target.to_string(),
            edge_type: edge_type.to_string(),
            at: Utc::now(),
        });
    }

    pub fn id(&self) -> EntryId {
        self.entry.id
    }

    pub fn is_empty(&self) -> bool {
        self.entry.mutations.is_empty()
    }

    /// Stamp `completed_at` and seal the entry with its content hash.
    pub fn finalize(mut self) -> Result<JournalEntry, JournalError> {
        self.entry.completed_at = Some(Utc::now());
        let hash = self.entry.compute_hash()?;
        self.entry.content_hash = Some(hash);
        Ok(self.entry)
    }
}
