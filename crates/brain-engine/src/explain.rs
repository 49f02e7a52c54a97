//! Causal explanations: bounded backward paths over causal relationships.

use serde::Serialize;

use brain_core::TracedPath;

/// Every causal path leading into one node.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Explanation {
    pub node_id: String,
    pub max_hops: usize,
    pub relationship_types: Vec<String>,
    pub paths: Vec<TracedPath>,
}

impl Explanation {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Order paths by hop count, then node ids, then relationship types, so
/// output does not depend on the backend's traversal order.
pub fn sort_paths(paths: &mut [TracedPath]) {
    paths.sort_by(|a, b| {
        a.hops()
            .cmp(&b.hops())
            .then_with(|| a.node_ids().cmp(&b.node_ids()))
            .then_with(|| a.relationships.cmp(&b.relationships))
    });
}
