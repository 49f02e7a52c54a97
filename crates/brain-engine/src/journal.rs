//! Journal helpers for engine batches.
//!
//! Journal writes never fail the graph operation they describe; errors are
//! logged and the batch result is returned as usual.

use brain_journal::{JournalSession, JournalStore, Operation};

use brain_core::{Edge, Node};

pub fn start_session(agent: &str, operation: Operation, context: serde_json::Value) -> JournalSession {
    let mut session = JournalSession::new(agent, operation);
    session.set_context(context);
    session
}

pub fn record_node(session: &mut JournalSession, node: &Node) {
    session.record_node(&node.id, &node.node_type);
}

pub fn record_edge(session: &mut JournalSession, edge: &Edge) {
    session.record_edge(&edge.source, &edge.target, &edge.edge_type);
}

/// Seal and persist the session. Returns the entry id when it was stored.
pub fn finalize_and_store(session: JournalSession, store: &dyn JournalStore) -> Option<String> {
    let entry_id = session.id();
    let entry = match session.finalize() {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(error = %e, %entry_id, "Failed to finalize journal entry");
            return None;
        }
    };

    match store.save(&entry) {
        Ok(_) => {
            tracing::info!(
                entry_id = %entry.id,
                operation = %entry.operation,
                nodes = entry.nodes_created(),
                edges = entry.edges_created(),
                "Journal entry recorded"
            );
            Some(entry.id.to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, entry_id = %entry.id, "Failed to store journal entry");
            None
        }
    }
}
