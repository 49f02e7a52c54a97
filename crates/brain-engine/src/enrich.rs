//! Enrichment rules: pure functions from a graph snapshot to a proposal.
//!
//! A rule never touches the store. It inspects a [`GraphSnapshot`] and
//! describes the nodes and edges that would close the gaps it found; the
//! engine then materializes the proposal, drawing fresh ids for every
//! proposed node.

use std::collections::HashSet;

use brain_core::types::{agents, edge_types, node_types};
use brain_core::{GraphSnapshot, Metadata};

use crate::ids;

/// Either end of a proposed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    /// A node already in the store.
    Existing(String),
    /// The node at this index of [`Proposal::nodes`].
    Proposed(usize),
}

/// A node to create. Its id is generated at materialization time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedNode {
    pub id_prefix: &'static str,
    pub node_type: String,
    pub content: String,
    pub agent: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProposedEdge {
    pub source: NodeRef,
    pub target: NodeRef,
    pub edge_type: String,
}

/// Nodes and edges a rule wants added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proposal {
    pub nodes: Vec<ProposedNode>,
    pub edges: Vec<ProposedEdge>,
}

impl Proposal {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Add a node and return a reference usable in edges.
    pub fn push_node(&mut self, node: ProposedNode) -> NodeRef {
        self.nodes.push(node);
        NodeRef::Proposed(self.nodes.len() - 1)
    }

    pub fn push_edge(&mut self, source: NodeRef, target: NodeRef, edge_type: &str) {
        self.edges.push(ProposedEdge {
            source,
            target,
            edge_type: edge_type.to_string(),
        });
    }
}

/// A structural heuristic over the graph.
///
/// `limit` caps how many gaps one evaluation may close. Implementations must
/// be deterministic for the same snapshot and limit.
pub trait EnrichmentRule: Send + Sync {
    fn name(&self) -> &str;

    fn propose(&self, snapshot: &GraphSnapshot, limit: usize) -> Proposal;
}

/// Tasks with no `assigned_to` edge from a Person get a synthetic owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnassignedTaskRule;

/// Characters of the task id quoted in the generated owner's content.
const TASK_ID_PREVIEW: usize = 20;

impl UnassignedTaskRule {
    fn owner_content(task_id: &str) -> String {
        let preview: String = task_id.chars().take(TASK_ID_PREVIEW).collect();
        format!("Auto-assigned owner (task: {preview})")
    }
}

impl EnrichmentRule for UnassignedTaskRule {
    fn name(&self) -> &str {
        "unassigned_task"
    }

    fn propose(&self, snapshot: &GraphSnapshot, limit: usize) -> Proposal {
        let people: HashSet<&str> = snapshot
            .nodes_of_type(node_types::PERSON)
            .map(|n| n.id.as_str())
            .collect();

        let assigned: HashSet<&str> = snapshot
            .edges
            .iter()
            .filter(|e| e.edge_type == edge_types::ASSIGNED_TO && people.contains(e.source.as_str()))
            .map(|e| e.target.as_str())
            .collect();

        let mut candidates: Vec<&str> = snapshot
            .nodes_of_type(node_types::TASK)
            .map(|n| n.id.as_str())
            .filter(|id| !assigned.contains(id))
            .collect();
        candidates.sort_unstable();

        let mut proposal = Proposal::default();
        for task_id in candidates.into_iter().take(limit) {
            let owner = proposal.push_node(ProposedNode {
                id_prefix: ids::PERSON_PREFIX,
                node_type: node_types::PERSON.to_string(),
                content: Self::owner_content(task_id),
                agent: agents::AI.to_string(),
                metadata: Metadata::new(),
            });
            proposal.push_edge(
                owner,
                NodeRef::Existing(task_id.to_string()),
                edge_types::ASSIGNED_TO,
            );
        }
        proposal
    }
}

/// The rules run by default, in order.
pub fn default_rules() -> Vec<Box<dyn EnrichmentRule>> {
    vec![Box::new(UnassignedTaskRule)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::{Edge, EdgeInput, Node, NodeInput};
    use chrono::Utc;

    fn node(id: &str, node_type: &str) -> Node {
        Node::from_input(&NodeInput::new(id, node_type, id), Utc::now())
    }

    fn edge(source: &str, target: &str, edge_type: &str) -> Edge {
        Edge::from_input(&EdgeInput::new(source, target, edge_type), Utc::now())
    }

    #[test]
    fn proposes_owner_for_each_unassigned_task() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                node("task-b", "Task"),
                node("task-a", "Task"),
                node("task-c", "Task"),
                node("alice", "Person"),
            ],
            edges: vec![edge("alice", "task-c", "assigned_to")],
        };

        let proposal = UnassignedTaskRule.propose(&snapshot, 5);
        assert_eq!(proposal.nodes.len(), 2);
        assert_eq!(proposal.edges.len(), 2);

        // Candidates are ordered by id.
        assert_eq!(
            proposal.edges[0].target,
            NodeRef::Existing("task-a".to_string())
        );
        assert_eq!(proposal.edges[0].source, NodeRef::Proposed(0));
        assert_eq!(proposal.edges[1].target, NodeRef::Existing("task-b".to_string()));
        assert_eq!(proposal.nodes[0].node_type, "Person");
        assert_eq!(proposal.nodes[0].agent, "AI");
        assert_eq!(proposal.nodes[0].content, "Auto-assigned owner (task: task-a)");
    }

    #[test]
    fn respects_limit() {
        let snapshot = GraphSnapshot {
            nodes: (0..7).map(|i| node(&format!("t{i}"), "Task")).collect(),
            edges: vec![],
        };
        assert_eq!(UnassignedTaskRule.propose(&snapshot, 5).nodes.len(), 5);
        assert!(UnassignedTaskRule.propose(&snapshot, 0).is_empty());
    }

    #[test]
    fn assignment_from_non_person_does_not_count() {
        let snapshot = GraphSnapshot {
            nodes: vec![node("t1", "Task"), node("bot", "Topic")],
            edges: vec![edge("bot", "t1", "assigned_to")],
        };
        assert_eq!(UnassignedTaskRule.propose(&snapshot, 5).nodes.len(), 1);
    }

    #[test]
    fn content_quotes_at_most_twenty_chars() {
        let content = UnassignedTaskRule::owner_content("task-0123456789abcdef0123456789");
        assert_eq!(content, "Auto-assigned owner (task: task-0123456789abcde)");
    }

    #[test]
    fn same_snapshot_same_proposal() {
        let snapshot = GraphSnapshot {
            nodes: vec![node("z", "Task"), node("m", "Task"), node("a", "Task")],
            edges: vec![],
        };
        assert_eq!(
            UnassignedTaskRule.propose(&snapshot, 2),
            UnassignedTaskRule.propose(&snapshot, 2)
        );
    }
}
