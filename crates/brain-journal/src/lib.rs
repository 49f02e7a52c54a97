//! Brain Journal — tamper-evident provenance for AI-driven mutations.
//!
//! Every batch of graph writes made on behalf of an agent (text ingestion,
//! enrichment) is captured as a [`JournalEntry`]: who acted, which
//! operation ran, the input it ran on and each node or edge it created.
//! Entries are content-hashed with BLAKE3 when finalized so that later
//! edits to the stored file are detectable.

pub mod hash;
pub mod session;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use session::JournalSession;
pub use store::{FileJournalStore, JournalError, JournalQuery, JournalStore};

// ── Core Types ───────────────────────────────────────────────────

/// Unique identifier for a journal entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The engine operation that produced a batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Ingest,
    Enrich,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ingest => write!(f, "ingest"),
            Self::Enrich => write!(f, "enrich"),
        }
    }
}

/// One write recorded in a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    NodeCreated {
        id: String,
        node_type: String,
        at: DateTime<Utc>,
    },
    EdgeCreated {
        source: String,
        target: String,
        edge_type: String,
        at: DateTime<Utc>,
    },
}

/// A hashed record of one AI mutation batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: EntryId,
    /// Provenance tag of the acting agent ("AI", ...).
    pub agent: String,
    pub operation: Operation,
    /// Input the operation ran on (ingested text, rule names, limits).
    pub context: serde_json::Value,
    pub mutations: Vec<Mutation>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// BLAKE3 content hash (hex), set on finalization.
    pub content_hash: Option<String>,
}

impl JournalEntry {
    /// BLAKE3 hash over every field except `content_hash`.
    pub fn compute_hash(&self) -> Result<String, JournalError> {
        hash::compute_entry_hash(self)
    }

    /// Whether the stored `content_hash` matches the current content.
    pub fn verify_integrity(&self) -> bool {
        match (&self.content_hash, self.compute_hash()) {
            (Some(stored), Ok(fresh)) => stored == &fresh,
            _ => false,
        }
    }

    pub fn nodes_created(&self) -> usize {
        self.mutations
            .iter()
            .filter(|m| matches!(m, Mutation::NodeCreated { .. }))
            .count()
    }

    pub fn edges_created(&self) -> usize {
        self.mutations
            .iter()
            .filter(|m| matches!(m, Mutation::EdgeCreated { .. }))
            .count()
    }
}
