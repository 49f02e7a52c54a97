//! The `GraphStore` contract: the only way the rest of the system touches
//! persisted graph state.

use async_trait::async_trait;

use brain_core::{Edge, EdgeInput, GraphSnapshot, Node, NodeInput, Result, TracedPath, Upserted};

use crate::client::GraphClient;

/// Abstract interface over the backing graph store.
///
/// Each call is a single atomic unit on the backend; nothing here spans
/// multiple calls. Callers validate identifiers before calling in.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the node if absent, otherwise update `content`, `agent` and
    /// `metadata`. Fails with `TypeMismatch` (writing nothing) when the node
    /// exists with a different type.
    async fn upsert_node(&self, input: &NodeInput) -> Result<Upserted<Node>>;

    /// Create-only insert. Returns `None` when the id is already taken.
    async fn insert_node(&self, input: &NodeInput) -> Result<Option<Node>>;

    /// Create the (source, target, type) relationship if it does not exist.
    /// Fails with `EndpointNotFound` when either endpoint is missing.
    async fn upsert_edge(&self, input: &EdgeInput) -> Result<Upserted<Edge>>;

    async fn fetch_node(&self, id: &str) -> Result<Option<Node>>;

    /// Full snapshot of all nodes and edges. Order is unspecified.
    async fn fetch_all(&self) -> Result<GraphSnapshot>;

    /// Remove every node and edge.
    async fn reset_all(&self) -> Result<()>;

    /// All backward paths from `start_id` over incoming edges whose type is in
    /// `relationship_types`, 1 to `max_hops` hops long, with no node repeated
    /// within a path.
    async fn trace_paths(
        &self,
        start_id: &str,
        relationship_types: &[&str],
        max_hops: usize,
    ) -> Result<Vec<TracedPath>>;

    /// Round-trip a trivial request to prove the store is reachable.
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn upsert_node(&self, input: &NodeInput) -> Result<Upserted<Node>> {
        Ok(self.merge_node(input).await?)
    }

    async fn insert_node(&self, input: &NodeInput) -> Result<Option<Node>> {
        Ok(self.create_node_if_absent(input).await?)
    }

    async fn upsert_edge(&self, input: &EdgeInput) -> Result<Upserted<Edge>> {
        Ok(self.merge_edge(input).await?)
    }

    async fn fetch_node(&self, id: &str) -> Result<Option<Node>> {
        Ok(self.get_node(id).await?)
    }

    async fn fetch_all(&self) -> Result<GraphSnapshot> {
        Ok(self.fetch_graph().await?)
    }

    async fn reset_all(&self) -> Result<()> {
        Ok(self.delete_everything().await?)
    }

    async fn trace_paths(
        &self,
        start_id: &str,
        relationship_types: &[&str],
        max_hops: usize,
    ) -> Result<Vec<TracedPath>> {
        Ok(self
            .backward_paths(start_id, relationship_types, max_hops)
            .await?)
    }

    async fn ping(&self) -> Result<()> {
        Ok(self.health_check().await?)
    }

    fn backend_name(&self) -> &'static str {
        "neo4j"
    }
}
