//! Fixed demonstration graph.

use serde::Serialize;

use brain_core::types::{agents, edge_types, node_types};
use brain_core::{EdgeInput, NodeInput, Result};
use brain_graph::GraphStore;

/// (id, type, content)
pub const SEED_NODES: [(&str, &str, &str); 8] = [
    ("task-1", node_types::TASK, "Prepare the Q2 plan"),
    ("person-1", node_types::PERSON, "Paul (project lead)"),
    ("person-2", node_types::PERSON, "Alice (dev lead)"),
    ("issue-1", node_types::ISSUE, "Q1 report missing"),
    ("topic-1", node_types::TOPIC, "Q2 planning"),
    ("decision-1", node_types::DECISION, "Finalize the Q2 plan by Dec 15"),
    ("task-2", node_types::TASK, "Sprint code review"),
    ("issue-2", node_types::ISSUE, "Database performance"),
];

/// (source, target, type)
pub const SEED_EDGES: [(&str, &str, &str); 7] = [
    ("person-1", "task-1", edge_types::ASSIGNED_TO),
    ("person-2", "task-2", edge_types::ASSIGNED_TO),
    ("task-1", "issue-1", edge_types::DEPENDS_ON),
    ("task-1", "topic-1", edge_types::ABOUT),
    ("decision-1", "task-1", edge_types::BASED_ON),
    ("task-2", "issue-2", edge_types::DEPENDS_ON),
    ("task-2", "topic-1", edge_types::ABOUT),
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SeedReport {
    /// Seed nodes written (created or refreshed).
    pub nodes: usize,
    pub edges: usize,
    /// How many of those did not exist before this call.
    pub nodes_created: usize,
    pub edges_created: usize,
}

/// Upsert the demonstration graph. Safe to run repeatedly.
pub async fn seed(store: &dyn GraphStore) -> Result<SeedReport> {
    let mut report = SeedReport {
        nodes: 0,
        edges: 0,
        nodes_created: 0,
        edges_created: 0,
    };

    for (id, node_type, content) in SEED_NODES {
        let input = NodeInput::new(id, node_type, content).with_agent(agents::SEED);
        let upserted = store.upsert_node(&input).await?;
        report.nodes += 1;
        report.nodes_created += usize::from(upserted.created);
    }

    for (source, target, edge_type) in SEED_EDGES {
        let upserted = store
            .upsert_edge(&EdgeInput::new(source, target, edge_type))
            .await?;
        report.edges += 1;
        report.edges_created += usize::from(upserted.created);
    }

    tracing::info!(
        nodes = report.nodes,
        edges = report.edges,
        nodes_created = report.nodes_created,
        "Seed graph written"
    );
    Ok(report)
}
