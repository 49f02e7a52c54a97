//! In-memory reverse adjacency and bounded backward traversal.
//!
//! Nodes are mapped to dense indices; `incoming[i]` lists the edges that
//! point at node `i`, so walking it moves from an effect back to its causes.

use std::collections::{HashMap, HashSet};

use brain_core::{Edge, GraphSnapshot, Node};

/// An incoming edge in the reverse adjacency list.
#[derive(Debug, Clone)]
pub struct InEdge {
    /// Index of the node the edge comes from.
    pub source_index: usize,
    pub edge_type: String,
}

/// Reverse-indexed view of a set of nodes and edges.
pub struct ReverseGraph<'a> {
    pub nodes: Vec<&'a Node>,
    pub incoming: Vec<Vec<InEdge>>,
    pub node_index: HashMap<&'a str, usize>,
}

/// A path as dense indices plus the relationship type of each hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPath {
    pub node_indices: Vec<usize>,
    pub relationships: Vec<String>,
}

impl<'a> ReverseGraph<'a> {
    /// Build from nodes and edges. Edges whose endpoints are unknown are ignored.
    pub fn new(
        nodes: impl IntoIterator<Item = &'a Node>,
        edges: impl IntoIterator<Item = &'a Edge>,
    ) -> Self {
        let nodes: Vec<&Node> = nodes.into_iter().collect();
        let node_index: HashMap<&str, usize> = nodes
            .iter()
            .copied()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut incoming = vec![Vec::new(); nodes.len()];
        for edge in edges {
            if let (Some(&src_idx), Some(&tgt_idx)) = (
                node_index.get(edge.source.as_str()),
                node_index.get(edge.target.as_str()),
            ) {
                incoming[tgt_idx].push(InEdge {
                    source_index: src_idx,
                    edge_type: edge.edge_type.clone(),
                });
            }
        }

        Self {
            nodes,
            incoming,
            node_index,
        }
    }

    pub fn from_snapshot(snapshot: &'a GraphSnapshot) -> Self {
        Self::new(&snapshot.nodes, &snapshot.edges)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.incoming.iter().map(|edges| edges.len()).sum()
    }

    /// Every backward path of 1..=`max_hops` hops from `start` that follows
    /// only `allowed` relationship types and never revisits a node.
    ///
    /// Sorted by hop count, then by the node ids along the path.
    pub fn trace_backward(&self, start: usize, allowed: &[&str], max_hops: usize) -> Vec<RawPath> {
        let allowed: HashSet<&str> = allowed.iter().copied().collect();
        let mut paths = Vec::new();

        let mut stack = vec![DfsState {
            node: start,
            path_nodes: vec![start],
            relationships: Vec::new(),
            visited: HashSet::from([start]),
        }];

        while let Some(state) = stack.pop() {
            if state.relationships.len() >= max_hops {
                continue;
            }

            for edge in &self.incoming[state.node] {
                if !allowed.contains(edge.edge_type.as_str()) {
                    continue;
                }
                if state.visited.contains(&edge.source_index) {
                    continue;
                }

                let mut visited = state.visited.clone();
                visited.insert(edge.source_index);

                let mut path_nodes = state.path_nodes.clone();
                path_nodes.push(edge.source_index);

                let mut relationships = state.relationships.clone();
                relationships.push(edge.edge_type.clone());

                paths.push(RawPath {
                    node_indices: path_nodes.clone(),
                    relationships: relationships.clone(),
                });

                stack.push(DfsState {
                    node: edge.source_index,
                    path_nodes,
                    relationships,
                    visited,
                });
            }
        }

        paths.sort_by(|a, b| {
            a.relationships
                .len()
                .cmp(&b.relationships.len())
                .then_with(|| self.path_ids(a).cmp(&self.path_ids(b)))
                .then_with(|| a.relationships.cmp(&b.relationships))
        });
        paths
    }

    fn path_ids(&self, path: &RawPath) -> Vec<&str> {
        path.node_indices
            .iter()
            .map(|&i| self.nodes[i].id.as_str())
            .collect()
    }
}

/// Internal DFS state for backward path enumeration.
struct DfsState {
    node: usize,
    path_nodes: Vec<usize>,
    relationships: Vec<String>,
    visited: HashSet<usize>,
}
