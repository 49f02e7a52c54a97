//! Process-local `GraphStore` backed by ordered maps behind a
//! `tokio::sync::RwLock`.
//!
//! Every write holds the lock for the whole call, which gives the same
//! per-call atomicity the Neo4j backend gets from MERGE.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use brain_core::{
    BrainError, Edge, EdgeInput, EdgeKey, GraphSnapshot, Node, NodeInput, Result, TracedPath,
    Upserted,
};

use crate::store::GraphStore;
use crate::traverse::ReverseGraph;

#[derive(Default)]
struct GraphState {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<EdgeKey, Edge>,
}

/// In-memory graph store.
#[derive(Default)]
pub struct MemoryGraphStore {
    state: RwLock<GraphState>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.state.read().await.edges.len()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn upsert_node(&self, input: &NodeInput) -> Result<Upserted<Node>> {
        let mut state = self.state.write().await;

        if let Some(existing) = state.nodes.get_mut(&input.id) {
            if existing.node_type != input.node_type {
                return Err(BrainError::TypeMismatch {
                    id: input.id.clone(),
                    stored: existing.node_type.clone(),
                    requested: input.node_type.clone(),
                });
            }
            existing.apply_update(input);
            return Ok(Upserted::existing(existing.clone()));
        }

        let node = Node::from_input(input, Utc::now());
        state.nodes.insert(node.id.clone(), node.clone());
        Ok(Upserted::created(node))
    }

    async fn insert_node(&self, input: &NodeInput) -> Result<Option<Node>> {
        let mut state = self.state.write().await;
        if state.nodes.contains_key(&input.id) {
            return Ok(None);
        }

        let node = Node::from_input(input, Utc::now());
        state.nodes.insert(node.id.clone(), node.clone());
        Ok(Some(node))
    }

    async fn upsert_edge(&self, input: &EdgeInput) -> Result<Upserted<Edge>> {
        let mut state = self.state.write().await;

        for endpoint in [&input.source, &input.target] {
            if !state.nodes.contains_key(endpoint) {
                return Err(BrainError::EndpointNotFound {
                    source_id: input.source.clone(),
                    target_id: input.target.clone(),
                    missing: endpoint.clone(),
                });
            }
        }

        let key = input.key();
        if let Some(existing) = state.edges.get(&key) {
            return Ok(Upserted::existing(existing.clone()));
        }

        let edge = Edge::from_input(input, Utc::now());
        state.edges.insert(key, edge.clone());
        Ok(Upserted::created(edge))
    }

    async fn fetch_node(&self, id: &str) -> Result<Option<Node>> {
        Ok(self.state.read().await.nodes.get(id).cloned())
    }

    async fn fetch_all(&self) -> Result<GraphSnapshot> {
        let state = self.state.read().await;
        Ok(GraphSnapshot {
            nodes: state.nodes.values().cloned().collect(),
            edges: state.edges.values().cloned().collect(),
        })
    }

    async fn reset_all(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.nodes.clear();
        state.edges.clear();
        tracing::warn!("In-memory graph reset");
        Ok(())
    }

    async fn trace_paths(
        &self,
        start_id: &str,
        relationship_types: &[&str],
        max_hops: usize,
    ) -> Result<Vec<TracedPath>> {
        let state = self.state.read().await;
        let graph = ReverseGraph::new(state.nodes.values(), state.edges.values());

        let Some(&start) = graph.node_index.get(start_id) else {
            return Ok(Vec::new());
        };

        let paths = graph
            .trace_backward(start, relationship_types, max_hops)
            .into_iter()
            .map(|raw| TracedPath {
                nodes: raw
                    .node_indices
                    .iter()
                    .map(|&i| graph.nodes[i].clone())
                    .collect(),
                relationships: raw.relationships,
            })
            .collect();
        Ok(paths)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
