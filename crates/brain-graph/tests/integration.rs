//! Integration tests for brain-graph against a live Neo4j instance.
//!
//! These tests require a Neo4j server reachable with the default store
//! settings (bolt://localhost:7687, neo4j / brain-dev).
//! Run with: cargo test --package brain-graph --test integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available.

use brain_core::{BrainError, EdgeInput, ErrorKind, NodeInput};
use brain_graph::{GraphClient, GraphConfig, GraphStore};

async fn connect_or_skip() -> Option<GraphClient> {
    let config = GraphConfig::default();
    match GraphClient::connect(&config).await {
        Ok(client) => {
            if let Err(e) = client.ensure_schema().await {
                eprintln!("Skipping integration test (schema setup failed): {e}");
                return None;
            }
            Some(client)
        }
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            None
        }
    }
}

/// Per-test id prefix so concurrent runs never collide.
fn unique_prefix() -> String {
    format!("it_{}", uuid::Uuid::new_v4().simple())
}

async fn cleanup(client: &GraphClient, prefix: &str) {
    let q = neo4rs::query("MATCH (n:Entity) WHERE n.id STARTS WITH $prefix DETACH DELETE n")
        .param("prefix", prefix.to_string());
    let _ = client.run(q).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j — run with: cargo test --package brain-graph --test integration -- --ignored"]
async fn test_upsert_and_fetch_node() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();
    let id = format!("{p}_task");

    let mut metadata = brain_core::Metadata::new();
    metadata.insert("priority".into(), "high".into());
    let input = NodeInput::new(&id, "Task", "Ship the release").with_metadata(metadata);

    let first = client.upsert_node(&input).await.unwrap();
    assert!(first.created);

    let stored = client.fetch_node(&id).await.unwrap().unwrap();
    assert_eq!(stored.node_type, "Task");
    assert_eq!(stored.content, "Ship the release");
    assert_eq!(stored.agent, "user");
    assert_eq!(
        stored.metadata.get("priority").and_then(|v| v.as_str()),
        Some("high")
    );

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_upsert_node_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();
    let id = format!("{p}_task");

    client
        .upsert_node(&NodeInput::new(&id, "Task", "first"))
        .await
        .unwrap();
    let second = client
        .upsert_node(&NodeInput::new(&id, "Task", "second"))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.value.content, "second");

    let snapshot = client.fetch_all().await.unwrap();
    let matching = snapshot.nodes.iter().filter(|n| n.id == id).count();
    assert_eq!(matching, 1);

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_type_is_write_once() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();
    let id = format!("{p}_node");

    client
        .upsert_node(&NodeInput::new(&id, "Task", "original"))
        .await
        .unwrap();
    let err = client
        .upsert_node(&NodeInput::new(&id, "Person", "changed"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let stored = client.fetch_node(&id).await.unwrap().unwrap();
    assert_eq!(stored.node_type, "Task");
    assert_eq!(stored.content, "original");

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_insert_node_skips_taken_id() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();
    let id = format!("{p}_person");

    let created = client
        .insert_node(&NodeInput::new(&id, "Person", "a"))
        .await
        .unwrap();
    assert!(created.is_some());

    let again = client
        .insert_node(&NodeInput::new(&id, "Person", "b"))
        .await
        .unwrap();
    assert!(again.is_none());
    assert_eq!(client.fetch_node(&id).await.unwrap().unwrap().content, "a");

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_edge_requires_both_endpoints() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();
    let a = format!("{p}_a");
    let ghost = format!("{p}_ghost");

    client
        .upsert_node(&NodeInput::new(&a, "Task", "a"))
        .await
        .unwrap();
    let err = client
        .upsert_edge(&EdgeInput::new(&a, &ghost, "depends_on"))
        .await
        .unwrap_err();
    match err {
        BrainError::EndpointNotFound { missing, .. } => assert_eq!(missing, ghost),
        other => panic!("unexpected error: {other}"),
    }

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_edge_upsert_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();
    let a = format!("{p}_a");
    let b = format!("{p}_b");

    client
        .upsert_node(&NodeInput::new(&a, "Task", "a"))
        .await
        .unwrap();
    client
        .upsert_node(&NodeInput::new(&b, "Person", "b"))
        .await
        .unwrap();

    let edge = EdgeInput::new(&a, &b, "assigned_to");
    assert!(client.upsert_edge(&edge).await.unwrap().created);
    assert!(!client.upsert_edge(&edge).await.unwrap().created);

    let snapshot = client.fetch_all().await.unwrap();
    let matching = snapshot
        .edges
        .iter()
        .filter(|e| e.source == a && e.target == b)
        .count();
    assert_eq!(matching, 1);

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_trace_paths_follows_causal_edges_backward() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();
    let decision = format!("{p}_decision");
    let issue = format!("{p}_issue");
    let task = format!("{p}_task");
    let topic = format!("{p}_topic");

    for (id, ty) in [
        (&decision, "Decision"),
        (&issue, "Issue"),
        (&task, "Task"),
        (&topic, "Topic"),
    ] {
        client
            .upsert_node(&NodeInput::new(id, ty, id))
            .await
            .unwrap();
    }
    // task -depends_on-> issue -based_on-> decision, topic -about-> decision
    for (s, t, ty) in [
        (&issue, &decision, "based_on"),
        (&task, &issue, "depends_on"),
        (&topic, &decision, "about"),
    ] {
        client.upsert_edge(&EdgeInput::new(s, t, ty)).await.unwrap();
    }

    let paths = client
        .trace_paths(&decision, &["based_on", "depends_on", "assigned_to"], 2)
        .await
        .unwrap();

    assert_eq!(paths.len(), 2);
    let mut shapes: Vec<Vec<&str>> = paths.iter().map(|path| path.node_ids()).collect();
    shapes.sort_by_key(|ids| ids.len());
    assert_eq!(shapes[0], vec![decision.as_str(), issue.as_str()]);
    assert_eq!(
        shapes[1],
        vec![decision.as_str(), issue.as_str(), task.as_str()]
    );

    cleanup(&client, &p).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_invalid_type_name_rejected_before_query() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let p = unique_prefix();

    let err = client
        .upsert_node(&NodeInput::new(format!("{p}_x"), "Task` DETACH DELETE n //", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
    assert!(client.fetch_node(&format!("{p}_x")).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_ping() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    client.ping().await.unwrap();
    assert_eq!(client.backend_name(), "neo4j");
}
