//! Write operations for the knowledge graph.
//!
//! Node writes use MERGE keyed on `(:Entity {id})`, which the uniqueness
//! constraint from [`GraphClient::ensure_schema`] makes atomic. Every node
//! carries the shared `Entity` label plus its own type label; the type is also
//! stored as `node_type` and is only ever written on create.

use chrono::Utc;
use neo4rs::query;

use brain_core::validate::validate_type_name;
use brain_core::{Edge, EdgeInput, Metadata, Node, NodeInput, Upserted};

use crate::client::{GraphClient, GraphError};
use crate::queries::{node_from_neo4j, parse_metadata, parse_timestamp};

impl GraphClient {
    // ── Node Writes ──────────────────────────────────────────────

    /// Upsert a node. A differing `node_type` on an existing id is reported
    /// as `TypeMismatch` and nothing is written.
    pub async fn merge_node(&self, input: &NodeInput) -> Result<Upserted<Node>, GraphError> {
        let label = validate_type_name(&input.node_type)?;
        let now = Utc::now().to_rfc3339();

        let cypher = format!(
            "MERGE (n:Entity {{id: $id}})
             ON CREATE SET n:{label}, n.node_type = $node_type, n.created_at = $now
             WITH n, n.node_type = $node_type AS type_ok
             FOREACH (_ IN CASE WHEN type_ok THEN [1] ELSE [] END |
               SET n.content = $content, n.agent = $agent, n.metadata = $metadata)
             RETURN n, type_ok, n.created_at = $now AS created"
        );

        let q = query(&cypher)
            .param("id", input.id.clone())
            .param("node_type", input.node_type.clone())
            .param("content", input.content.clone())
            .param("agent", input.agent.clone())
            .param("metadata", ser_metadata(&input.metadata)?)
            .param("now", now);

        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::Serialization("MERGE returned no row".to_string()))?;

        let neo_node: neo4rs::Node = row
            .get("n")
            .map_err(|e| GraphError::Serialization(format!("Failed to deserialize node: {e}")))?;
        let node = node_from_neo4j(&neo_node)?;

        if !row.get::<bool>("type_ok").unwrap_or(false) {
            return Err(GraphError::TypeMismatch {
                id: input.id.clone(),
                stored: node.node_type,
                requested: input.node_type.clone(),
            });
        }

        let created = row.get::<bool>("created").unwrap_or(false);
        tracing::debug!(node_id = %node.id, node_type = %node.node_type, created, "Node upserted");
        Ok(Upserted {
            value: node,
            created,
        })
    }

    /// Create a node only if no node with that id exists yet.
    pub async fn create_node_if_absent(
        &self,
        input: &NodeInput,
    ) -> Result<Option<Node>, GraphError> {
        let label = validate_type_name(&input.node_type)?;

        let cypher = format!(
            "OPTIONAL MATCH (existing:Entity {{id: $id}})
             WITH existing WHERE existing IS NULL
             CREATE (n:Entity:{label} {{
               id: $id, node_type: $node_type, content: $content,
               agent: $agent, metadata: $metadata, created_at: $now
             }})
             RETURN n"
        );

        let q = query(&cypher)
            .param("id", input.id.clone())
            .param("node_type", input.node_type.clone())
            .param("content", input.content.clone())
            .param("agent", input.agent.clone())
            .param("metadata", ser_metadata(&input.metadata)?)
            .param("now", Utc::now().to_rfc3339());

        match self.query_one(q).await? {
            Some(row) => {
                let neo_node: neo4rs::Node = row.get("n").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize node: {e}"))
                })?;
                Ok(Some(node_from_neo4j(&neo_node)?))
            }
            None => {
                tracing::debug!(node_id = %input.id, "Insert skipped, id already taken");
                Ok(None)
            }
        }
    }

    // ── Edge Writes ──────────────────────────────────────────────

    /// Upsert a typed relationship. Existing relationships are left untouched.
    pub async fn merge_edge(&self, input: &EdgeInput) -> Result<Upserted<Edge>, GraphError> {
        let rel_type = validate_type_name(&input.edge_type)?;
        let now = Utc::now().to_rfc3339();

        let cypher = format!(
            "MATCH (a:Entity {{id: $source}})
             MATCH (b:Entity {{id: $target}})
             MERGE (a)-[r:{rel_type}]->(b)
             ON CREATE SET r.metadata = $metadata, r.created_at = $now
             RETURN r.metadata AS metadata, r.created_at AS created_at,
                    r.created_at = $now AS created"
        );

        let q = query(&cypher)
            .param("source", input.source.clone())
            .param("target", input.target.clone())
            .param("metadata", ser_metadata(&input.metadata)?)
            .param("now", now);

        let Some(row) = self.query_one(q).await? else {
            let missing = if self.get_node(&input.source).await?.is_none() {
                input.source.clone()
            } else {
                input.target.clone()
            };
            return Err(GraphError::EndpointNotFound {
                source_id: input.source.clone(),
                target_id: input.target.clone(),
                missing,
            });
        };

        let edge = Edge {
            source: input.source.clone(),
            target: input.target.clone(),
            edge_type: input.edge_type.clone(),
            metadata: parse_metadata(row.get::<String>("metadata").ok()),
            created_at: parse_timestamp(row.get::<String>("created_at").ok()),
        };
        let created = row.get::<bool>("created").unwrap_or(false);

        tracing::debug!(
            source = %edge.source,
            target = %edge.target,
            edge_type = %edge.edge_type,
            created,
            "Edge upserted"
        );
        Ok(Upserted {
            value: edge,
            created,
        })
    }

    // ── Reset ────────────────────────────────────────────────────

    /// Delete every node and relationship in the database.
    pub async fn delete_everything(&self) -> Result<(), GraphError> {
        self.run(query("MATCH (n) DETACH DELETE n")).await?;
        tracing::warn!("Graph reset: all nodes and edges deleted");
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Metadata is stored as a JSON string property.
fn ser_metadata(metadata: &Metadata) -> Result<String, GraphError> {
    serde_json::to_string(metadata).map_err(|e| GraphError::Serialization(e.to_string()))
}
