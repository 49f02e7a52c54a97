//! Read operations for the knowledge graph.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use neo4rs::query;

use brain_core::validate::validate_type_name;
use brain_core::{Edge, GraphSnapshot, Metadata, Node, TracedPath};

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    // ── Single Node Lookups ──────────────────────────────────────

    /// Get a node by id.
    pub async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        let q = query("MATCH (n:Entity {id: $id}) RETURN n").param("id", id.to_string());

        match self.query_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("n").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize node: {e}"))
                })?;
                Ok(Some(node_from_neo4j(&node)?))
            }
            None => Ok(None),
        }
    }

    /// Get several nodes by id, keyed by id. Missing ids are absent.
    pub async fn get_nodes(&self, ids: Vec<String>) -> Result<HashMap<String, Node>, GraphError> {
        let q = query("MATCH (n:Entity) WHERE n.id IN $ids RETURN n").param("ids", ids);

        let rows = self.query_rows(q).await?;
        let mut results = HashMap::with_capacity(rows.len());
        for row in rows {
            let neo_node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize node: {e}"))
            })?;
            let node = node_from_neo4j(&neo_node)?;
            results.insert(node.id.clone(), node);
        }
        Ok(results)
    }

    // ── Full Graph ───────────────────────────────────────────────

    /// Fetch every node and every relationship between nodes.
    pub async fn fetch_graph(&self) -> Result<GraphSnapshot, GraphError> {
        let node_rows = self.query_rows(query("MATCH (n:Entity) RETURN n")).await?;
        let mut nodes = Vec::with_capacity(node_rows.len());
        for row in node_rows {
            let neo_node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize node: {e}"))
            })?;
            nodes.push(node_from_neo4j(&neo_node)?);
        }

        let edge_rows = self
            .query_rows(query(
                "MATCH (a:Entity)-[r]->(b:Entity)
                 RETURN a.id AS source, b.id AS target, type(r) AS rel_type,
                        r.metadata AS metadata, r.created_at AS created_at",
            ))
            .await?;
        let mut edges = Vec::with_capacity(edge_rows.len());
        for row in edge_rows {
            edges.push(Edge {
                source: row.get("source").unwrap_or_default(),
                target: row.get("target").unwrap_or_default(),
                edge_type: row.get("rel_type").unwrap_or_default(),
                metadata: parse_metadata(row.get::<String>("metadata").ok()),
                created_at: parse_timestamp(row.get::<String>("created_at").ok()),
            });
        }

        tracing::debug!(nodes = nodes.len(), edges = edges.len(), "Graph fetched");
        Ok(GraphSnapshot { nodes, edges })
    }

    // ── Path Queries ─────────────────────────────────────────────

    /// Bounded backward traversal over the given relationship types.
    ///
    /// Paths that revisit a node are dropped.
    pub async fn backward_paths(
        &self,
        start_id: &str,
        relationship_types: &[&str],
        max_hops: usize,
    ) -> Result<Vec<TracedPath>, GraphError> {
        if relationship_types.is_empty() || max_hops == 0 {
            return Ok(Vec::new());
        }
        for rel in relationship_types {
            validate_type_name(rel)?;
        }
        let rel_pattern = relationship_types.join("|");

        let q = query(&format!(
            "MATCH path = (start:Entity {{id: $id}})<-[:{rel_pattern}*1..{max_hops}]-(:Entity)
             RETURN [n IN nodes(path) | n.id] AS node_ids,
                    [r IN relationships(path) | type(r)] AS rel_types"
        ))
        .param("id", start_id.to_string());

        let rows = self.query_rows(q).await?;
        let mut raw_paths: Vec<(Vec<String>, Vec<String>)> = Vec::with_capacity(rows.len());
        for row in rows {
            let node_ids: Vec<String> = row.get("node_ids").map_err(|e| {
                GraphError::Serialization(format!("Failed to read path nodes: {e}"))
            })?;
            let rel_types: Vec<String> = row.get("rel_types").map_err(|e| {
                GraphError::Serialization(format!("Failed to read path relationships: {e}"))
            })?;

            let distinct: HashSet<&String> = node_ids.iter().collect();
            if distinct.len() != node_ids.len() {
                continue;
            }
            raw_paths.push((node_ids, rel_types));
        }

        if raw_paths.is_empty() {
            return Ok(Vec::new());
        }

        let ids: HashSet<String> = raw_paths
            .iter()
            .flat_map(|(ids, _)| ids.iter().cloned())
            .collect();
        let lookup = self.get_nodes(ids.into_iter().collect()).await?;

        let mut paths = Vec::with_capacity(raw_paths.len());
        for (node_ids, relationships) in raw_paths {
            let nodes: Option<Vec<Node>> =
                node_ids.iter().map(|id| lookup.get(id).cloned()).collect();
            // A node deleted between the two queries drops its paths.
            if let Some(nodes) = nodes {
                paths.push(TracedPath {
                    nodes,
                    relationships,
                });
            }
        }
        Ok(paths)
    }

    // ── Diagnostics ──────────────────────────────────────────────

    pub async fn health_check(&self) -> Result<(), GraphError> {
        match self.query_one(query("RETURN 1 AS ok")).await? {
            Some(_) => Ok(()),
            None => Err(GraphError::Connection(
                "Neo4j returned no row for health probe".to_string(),
            )),
        }
    }
}

/// Convert a neo4rs::Node into a domain [`Node`].
pub(crate) fn node_from_neo4j(node: &neo4rs::Node) -> Result<Node, GraphError> {
    let id: String = node
        .get("id")
        .map_err(|e| GraphError::Serialization(format!("Node without id: {e}")))?;

    Ok(Node {
        id,
        node_type: node.get("node_type").unwrap_or_default(),
        content: node.get("content").unwrap_or_default(),
        agent: node.get("agent").unwrap_or_default(),
        metadata: parse_metadata(node.get::<String>("metadata").ok()),
        created_at: parse_timestamp(node.get::<String>("created_at").ok()),
    })
}

/// Decode a JSON-string metadata property; anything unreadable is empty.
pub(crate) fn parse_metadata(raw: Option<String>) -> Metadata {
    raw.and_then(|s| serde_json::from_str::<Metadata>(&s).ok())
        .unwrap_or_default()
}

/// Decode an RFC 3339 timestamp property; missing values become the epoch.
pub(crate) fn parse_timestamp(raw: Option<String>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
