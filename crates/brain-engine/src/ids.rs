//! Generated node identifiers.
//!
//! Generated ids are `{prefix}-{uuid v4 hex}`. They are written with the
//! store's create-only insert, so a collision with an existing node is
//! detected and a new id drawn instead of merging into that node.

use uuid::Uuid;

use brain_core::{BrainError, Metadata, Node, NodeInput, Result};
use brain_graph::GraphStore;

/// Prefix for nodes created by text ingestion.
pub const TASK_PREFIX: &str = "task";

/// Prefix for owners created by enrichment.
pub const PERSON_PREFIX: &str = "person";

/// Fresh ids drawn before giving up on an insert.
const MAX_ID_ATTEMPTS: usize = 8;

pub fn generate(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Insert a node under a freshly generated id, redrawing on collision.
pub async fn insert_fresh(
    store: &dyn GraphStore,
    prefix: &str,
    node_type: &str,
    content: &str,
    agent: &str,
    metadata: Metadata,
) -> Result<Node> {
    for attempt in 1..=MAX_ID_ATTEMPTS {
        let input = NodeInput::new(generate(prefix), node_type, content)
            .with_agent(agent)
            .with_metadata(metadata.clone());

        if let Some(node) = store.insert_node(&input).await? {
            return Ok(node);
        }
        tracing::warn!(node_id = %input.id, attempt, "Generated id already taken, retrying");
    }

    Err(BrainError::StoreOperationFailed(format!(
        "no free {prefix} id after {MAX_ID_ATTEMPTS} attempts"
    )))
}
