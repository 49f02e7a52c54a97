//! Neo4j connection management and shared graph client.

use std::future::Future;
use std::time::Duration;

use neo4rs::{ConfigBuilder, Graph, Query};

use brain_core::config::StoreConfig;
use brain_core::BrainError;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Edge endpoint not found: {missing} (edge {source_id} -> {target_id})")]
    EndpointNotFound {
        source_id: String,
        target_id: String,
        missing: String,
    },

    #[error("Node {id} has type {stored}, not {requested}")]
    TypeMismatch {
        id: String,
        stored: String,
        requested: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Rejected(#[from] BrainError),
}

impl GraphError {
    /// Whether the failure means the store could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout { .. } => true,
            Self::Query(e) => matches!(
                e,
                neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError
            ),
            _ => false,
        }
    }
}

impl From<GraphError> for BrainError {
    fn from(err: GraphError) -> Self {
        if err.is_unavailable() {
            return BrainError::StoreUnavailable(err.to_string());
        }
        match err {
            GraphError::EndpointNotFound {
                source_id,
                target_id,
                missing,
            } => BrainError::EndpointNotFound {
                source_id,
                target_id,
                missing,
            },
            GraphError::TypeMismatch {
                id,
                stored,
                requested,
            } => BrainError::TypeMismatch {
                id,
                stored,
                requested,
            },
            GraphError::Rejected(inner) => inner,
            other => BrainError::StoreOperationFailed(other.to_string()),
        }
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
    pub query_timeout: Duration,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

impl From<&StoreConfig> for GraphConfig {
    fn from(store: &StoreConfig) -> Self {
        Self {
            uri: store.uri.clone(),
            user: store.user.clone(),
            password: store.password.clone(),
            max_connections: store.max_connections,
            fetch_size: store.fetch_size,
            query_timeout: Duration::from_secs(store.query_timeout_secs),
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Every round trip is bounded by `query_timeout`. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    query_timeout: Duration,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = match tokio::time::timeout(config.query_timeout, Graph::connect(neo_config)).await
        {
            Ok(result) => result.map_err(|e| GraphError::Connection(e.to_string()))?,
            Err(_) => {
                return Err(GraphError::Timeout {
                    seconds: config.query_timeout.as_secs(),
                })
            }
        };

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self {
            graph,
            query_timeout: config.query_timeout,
        })
    }

    /// Create the uniqueness constraint that makes node MERGE atomic.
    pub async fn ensure_schema(&self) -> Result<(), GraphError> {
        self.run(neo4rs::query(
            "CREATE CONSTRAINT brain_entity_id IF NOT EXISTS
             FOR (n:Entity) REQUIRE n.id IS UNIQUE",
        ))
        .await?;
        tracing::debug!("Entity id uniqueness constraint ensured");
        Ok(())
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.bounded(async {
            self.graph.run(query).await?;
            Ok::<_, GraphError>(())
        })
        .await
    }

    /// Execute a query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        self.bounded(async {
            let mut stream = self.graph.execute(query).await?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next().await? {
                rows.push(row);
            }
            Ok::<_, GraphError>(rows)
        })
        .await
    }

    /// Execute a query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        self.bounded(async {
            let mut stream = self.graph.execute(query).await?;
            Ok::<_, GraphError>(stream.next().await?)
        })
        .await
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, GraphError>
    where
        F: Future<Output = Result<T, GraphError>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.query_timeout.as_secs(),
                    "Neo4j call timed out"
                );
                Err(GraphError::Timeout {
                    seconds: self.query_timeout.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::ErrorKind;

    #[test]
    fn timeout_maps_to_unavailable() {
        let err: BrainError = GraphError::Timeout { seconds: 10 }.into();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(err.is_retryable());
    }

    #[test]
    fn connection_maps_to_unavailable() {
        let err: BrainError = GraphError::Connection("refused".into()).into();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn endpoint_kind_is_preserved() {
        let err: BrainError = GraphError::EndpointNotFound {
            source_id: "a".into(),
            target_id: "b".into(),
            missing: "b".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }

    #[test]
    fn serialization_is_operation_failure() {
        let err: BrainError = GraphError::Serialization("bad json".into()).into();
        assert_eq!(err.kind(), ErrorKind::StoreOperationFailed);
        assert!(!err.is_retryable());
    }

    #[test]
    fn rejected_passes_through() {
        let err: BrainError =
            GraphError::Rejected(BrainError::invalid_identifier("a-b", "hyphen")).into();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn graph_config_from_store_config() {
        let store = StoreConfig {
            query_timeout_secs: 3,
            ..StoreConfig::default()
        };
        let cfg = GraphConfig::from(&store);
        assert_eq!(cfg.query_timeout, Duration::from_secs(3));
        assert_eq!(cfg.uri, "bolt://localhost:7687");
    }
}
