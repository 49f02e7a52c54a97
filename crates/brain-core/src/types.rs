//! Core domain types for the Enterprise Brain graph.
//!
//! Nodes and edges are deliberately open-ended: node types and relationship
//! types are plain strings (validated by [`crate::validate`]) rather than
//! closed enums, so new entity kinds need no code change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form key/value metadata attached to nodes and edges.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// ── Well-known names ──────────────────────────────────────────────

/// Provenance tags carried in [`Node::agent`].
pub mod agents {
    pub const USER: &str = "user";
    pub const AI: &str = "AI";
    pub const SEED: &str = "seed";
}

/// Node types used by the built-in pipelines. Any other well-formed type name
/// is accepted as well.
pub mod node_types {
    pub const TASK: &str = "Task";
    pub const PERSON: &str = "Person";
    pub const ISSUE: &str = "Issue";
    pub const TOPIC: &str = "Topic";
    pub const DECISION: &str = "Decision";
}

/// Relationship types used by the built-in pipelines.
pub mod edge_types {
    pub const DEPENDS_ON: &str = "depends_on";
    pub const ASSIGNED_TO: &str = "assigned_to";
    pub const ABOUT: &str = "about";
    pub const BASED_ON: &str = "based_on";

    /// Relationship types followed backward by the causal explainer.
    pub const CAUSAL: [&str; 3] = [BASED_ON, DEPENDS_ON, ASSIGNED_TO];
}

// ── Nodes ─────────────────────────────────────────────────────────

/// A stored entity in the graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    /// Write-once type label (Task, Person, ...).
    #[serde(rename = "type")]
    pub node_type: String,
    pub content: String,
    pub agent: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Materialize a brand-new node from caller input.
    pub fn from_input(input: &NodeInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id: input.id.clone(),
            node_type: input.node_type.clone(),
            content: input.content.clone(),
            agent: input.agent.clone(),
            metadata: input.metadata.clone(),
            created_at,
        }
    }

    /// Overwrite the mutable fields from a re-submitted input.
    ///
    /// `id`, `node_type` and `created_at` are never touched.
    pub fn apply_update(&mut self, input: &NodeInput) {
        self.content = input.content.clone();
        self.agent = input.agent.clone();
        self.metadata = input.metadata.clone();
    }
}

/// Caller-supplied node fields for an upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeInput {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub content: String,
    #[serde(default = "default_agent")]
    pub agent: String,
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_agent() -> String {
    agents::USER.to_string()
}

impl NodeInput {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            content: content.into(),
            agent: default_agent(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

// ── Edges ─────────────────────────────────────────────────────────

/// The identity of an edge: an ordered (source, target, type) triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

/// A directed, typed relationship between two existing nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    pub fn from_input(input: &EdgeInput, created_at: DateTime<Utc>) -> Self {
        Self {
            source: input.source.clone(),
            target: input.target.clone(),
            edge_type: input.edge_type.clone(),
            metadata: input.metadata.clone(),
            created_at,
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            source: self.source.clone(),
            target: self.target.clone(),
            edge_type: self.edge_type.clone(),
        }
    }
}

/// Caller-supplied edge fields for an upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeInput {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl EdgeInput {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type: edge_type.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            source: self.source.clone(),
            target: self.target.clone(),
            edge_type: self.edge_type.clone(),
        }
    }
}

// ── Results ───────────────────────────────────────────────────────

/// Outcome of an upsert: the stored value and whether this call created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<T> {
    pub value: T,
    pub created: bool,
}

impl<T> Upserted<T> {
    pub fn created(value: T) -> Self {
        Self { value, created: true }
    }

    pub fn existing(value: T) -> Self {
        Self {
            value,
            created: false,
        }
    }
}

/// A full copy of the graph at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Edges pointing at `id`.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == id)
    }

    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }
}

/// One backward path found by a bounded traversal.
///
/// `nodes[0]` is the start node; `relationships[i]` is the type of the edge
/// that leads from `nodes[i + 1]` into `nodes[i]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TracedPath {
    pub nodes: Vec<Node>,
    pub relationships: Vec<String>,
}

impl TracedPath {
    pub fn hops(&self) -> usize {
        self.relationships.len()
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}
