//! brain-engine: operations over the Enterprise Brain knowledge graph.
//!
//! [`BrainEngine`] validates caller input, drives the injected
//! [`GraphStore`], and implements the higher-level pipelines: text
//! ingestion into chained Task nodes, rule-based enrichment, and causal
//! explanation by bounded backward traversal. AI-driven batches are
//! recorded in the provenance journal when one is configured.

pub mod enrich;
pub mod explain;
pub mod ids;
pub mod ingest;
pub mod journal;
pub mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use brain_core::config::EngineConfig;
use brain_core::types::{edge_types, node_types};
use brain_core::validate::{validate_id, validate_type_name};
use brain_core::{
    BrainError, Edge, EdgeInput, GraphSnapshot, Metadata, Node, NodeInput, Result, Upserted,
};
use brain_graph::GraphStore;
use brain_journal::{
    FileJournalStore, JournalEntry, JournalQuery, JournalSession, JournalStore, Operation,
};

use crate::enrich::{EnrichmentRule, NodeRef, Proposal};

pub use enrich::{default_rules, UnassignedTaskRule};
pub use explain::Explanation;
pub use seed::SeedReport;

/// Nodes and edges created by one ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_entry: Option<String>,
}

/// Nodes and edges added by one enrichment run, across all rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichOutcome {
    pub nodes_added: usize,
    pub edges_added: usize,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_entry: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub backend: &'static str,
    pub reachable: bool,
}

/// The graph operations exposed to callers.
pub struct BrainEngine {
    store: Arc<dyn GraphStore>,
    rules: Vec<Box<dyn EnrichmentRule>>,
    enrich_limit: usize,
    explain_max_hops: usize,
    journal: Option<Arc<dyn JournalStore>>,
}

impl BrainEngine {
    /// Engine with the default rules and limits and no journal.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            store,
            rules: default_rules(),
            enrich_limit: defaults.enrich_limit,
            explain_max_hops: defaults.explain_max_hops,
            journal: None,
        }
    }

    /// Apply the `[engine]` configuration section.
    pub fn from_config(store: Arc<dyn GraphStore>, config: &EngineConfig) -> Self {
        let engine = Self::new(store)
            .with_enrich_limit(config.enrich_limit)
            .with_explain_max_hops(config.explain_max_hops);
        match &config.journal_dir {
            Some(dir) => engine.with_journal_dir(dir),
            None => engine,
        }
    }

    /// Replace the enrichment rules. They run in the given order.
    pub fn with_rules(mut self, rules: Vec<Box<dyn EnrichmentRule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_enrich_limit(mut self, limit: usize) -> Self {
        self.enrich_limit = limit;
        self
    }

    pub fn with_explain_max_hops(mut self, max_hops: usize) -> Self {
        self.explain_max_hops = max_hops;
        self
    }

    pub fn with_journal(mut self, journal: Arc<dyn JournalStore>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Journal into a directory. An unusable directory disables journaling
    /// with a warning.
    pub fn with_journal_dir(self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match FileJournalStore::new(&dir) {
            Ok(store) => {
                tracing::debug!(root = %store.root().display(), "Journal enabled");
                self.with_journal(Arc::new(store))
            }
            Err(e) => {
                tracing::warn!(error = %e, dir = %dir.display(), "Journal disabled: cannot open directory");
                self
            }
        }
    }

    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    pub fn journal(&self) -> Option<&dyn JournalStore> {
        self.journal.as_deref()
    }

    // ── Nodes and Edges ──────────────────────────────────────────

    pub async fn add_node(&self, input: &NodeInput) -> Result<Upserted<Node>> {
        validate_id(&input.id)?;
        validate_type_name(&input.node_type)?;

        let upserted = self.store.upsert_node(input).await?;
        tracing::info!(
            node_id = %input.id,
            node_type = %input.node_type,
            created = upserted.created,
            "Node upserted"
        );
        Ok(upserted)
    }

    pub async fn add_edge(&self, input: &EdgeInput) -> Result<Upserted<Edge>> {
        validate_id(&input.source)?;
        validate_id(&input.target)?;
        validate_type_name(&input.edge_type)?;

        let upserted = self.store.upsert_edge(input).await?;
        tracing::info!(
            source = %input.source,
            target = %input.target,
            edge_type = %input.edge_type,
            created = upserted.created,
            "Edge upserted"
        );
        Ok(upserted)
    }

    pub async fn node(&self, id: &str) -> Result<Node> {
        validate_id(id)?;
        self.store
            .fetch_node(id)
            .await?
            .ok_or_else(|| BrainError::NodeNotFound(id.to_string()))
    }

    /// Full graph, nodes ordered by id and edges by (source, target, type).
    pub async fn graph(&self) -> Result<GraphSnapshot> {
        let mut snapshot = self.store.fetch_all().await?;
        snapshot.nodes.sort_by(|a, b| a.id.cmp(&b.id));
        snapshot.edges.sort_by_key(|e| e.key());
        Ok(snapshot)
    }

    /// Delete every node and edge.
    pub async fn reset(&self) -> Result<()> {
        self.store.reset_all().await?;
        tracing::warn!(backend = self.store.backend_name(), "Graph reset");
        Ok(())
    }

    pub async fn seed(&self) -> Result<SeedReport> {
        seed::seed(self.store.as_ref()).await
    }

    pub async fn health(&self) -> Result<Health> {
        self.store.ping().await?;
        Ok(Health {
            backend: self.store.backend_name(),
            reachable: true,
        })
    }

    // ── Ingestion ────────────────────────────────────────────────

    /// Turn each `.`-separated sentence of `text` into a new Task node,
    /// chaining every sentence to the one before it with `depends_on`.
    ///
    /// Not atomic: a failure part way leaves the nodes written so far.
    pub async fn ingest(&self, text: &str, agent: &str) -> Result<IngestOutcome> {
        let segments = ingest::split_sentences(text);
        if segments.is_empty() {
            return Err(BrainError::EmptyInput(
                "text contains no sentences".to_string(),
            ));
        }

        let mut session = journal::start_session(
            agent,
            Operation::Ingest,
            serde_json::json!({ "text": text, "segments": segments.len() }),
        );
        let mut outcome = IngestOutcome {
            nodes: Vec::with_capacity(segments.len()),
            edges: Vec::with_capacity(segments.len().saturating_sub(1)),
            journal_entry: None,
        };

        let result = self
            .ingest_segments(&segments, agent, &mut session, &mut outcome)
            .await;
        outcome.journal_entry = self.store_journal(session);
        result?;

        tracing::info!(
            agent,
            nodes = outcome.nodes.len(),
            edges = outcome.edges.len(),
            "Text ingested"
        );
        Ok(outcome)
    }

    async fn ingest_segments(
        &self,
        segments: &[&str],
        agent: &str,
        session: &mut JournalSession,
        outcome: &mut IngestOutcome,
    ) -> Result<()> {
        for segment in segments {
            let node = ids::insert_fresh(
                self.store.as_ref(),
                ids::TASK_PREFIX,
                node_types::TASK,
                segment,
                agent,
                Metadata::new(),
            )
            .await?;
            journal::record_node(session, &node);

            if let Some(previous) = outcome.nodes.last() {
                let edge = self
                    .store
                    .upsert_edge(&EdgeInput::new(
                        &node.id,
                        &previous.id,
                        edge_types::DEPENDS_ON,
                    ))
                    .await?
                    .value;
                journal::record_edge(session, &edge);
                outcome.edges.push(edge);
            }
            outcome.nodes.push(node);
        }
        Ok(())
    }

    // ── Enrichment ───────────────────────────────────────────────

    /// Run every rule in order, each against a fresh snapshot, and
    /// materialize what it proposes.
    pub async fn enrich(&self) -> Result<EnrichOutcome> {
        let rule_names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        let mut session = journal::start_session(
            brain_core::types::agents::AI,
            Operation::Enrich,
            serde_json::json!({ "rules": rule_names, "limit": self.enrich_limit }),
        );
        let mut outcome = EnrichOutcome::default();

        let result = self.run_rules(&mut session, &mut outcome).await;
        if !session.is_empty() {
            outcome.journal_entry = self.store_journal(session);
        }
        result?;

        outcome.nodes_added = outcome.nodes.len();
        outcome.edges_added = outcome.edges.len();
        tracing::info!(
            nodes_added = outcome.nodes_added,
            edges_added = outcome.edges_added,
            "Enrichment complete"
        );
        Ok(outcome)
    }

    async fn run_rules(
        &self,
        session: &mut JournalSession,
        outcome: &mut EnrichOutcome,
    ) -> Result<()> {
        for rule in &self.rules {
            let snapshot = self.store.fetch_all().await?;
            let proposal = rule.propose(&snapshot, self.enrich_limit);
            tracing::debug!(
                rule = rule.name(),
                nodes = proposal.nodes.len(),
                edges = proposal.edges.len(),
                "Rule evaluated"
            );
            if proposal.is_empty() {
                continue;
            }
            self.materialize(rule.name(), proposal, session, outcome)
                .await?;
        }
        Ok(())
    }

    async fn materialize(
        &self,
        rule: &str,
        proposal: Proposal,
        session: &mut JournalSession,
        outcome: &mut EnrichOutcome,
    ) -> Result<()> {
        let mut created_ids = Vec::with_capacity(proposal.nodes.len());
        for proposed in &proposal.nodes {
            let node = ids::insert_fresh(
                self.store.as_ref(),
                proposed.id_prefix,
                &proposed.node_type,
                &proposed.content,
                &proposed.agent,
                proposed.metadata.clone(),
            )
            .await?;
            journal::record_node(session, &node);
            created_ids.push(node.id.clone());
            outcome.nodes.push(node);
        }

        for proposed in &proposal.edges {
            let (Some(source), Some(target)) = (
                resolve(&proposed.source, &created_ids),
                resolve(&proposed.target, &created_ids),
            ) else {
                tracing::warn!(rule, "Proposed edge references an unknown proposed node, skipping");
                continue;
            };

            let upserted = self
                .store
                .upsert_edge(&EdgeInput::new(source, target, proposed.edge_type.as_str()))
                .await?;
            if upserted.created {
                journal::record_edge(session, &upserted.value);
                outcome.edges.push(upserted.value);
            }
        }
        Ok(())
    }

    // ── Explanation ──────────────────────────────────────────────

    /// Backward paths into `id` over `based_on`, `depends_on` and
    /// `assigned_to`, up to the configured hop bound.
    pub async fn explain(&self, id: &str) -> Result<Explanation> {
        validate_id(id)?;
        if self.store.fetch_node(id).await?.is_none() {
            return Err(BrainError::NodeNotFound(id.to_string()));
        }

        let mut paths = self
            .store
            .trace_paths(id, &edge_types::CAUSAL, self.explain_max_hops)
            .await?;
        explain::sort_paths(&mut paths);

        tracing::debug!(node_id = %id, paths = paths.len(), "Explanation traced");
        Ok(Explanation {
            node_id: id.to_string(),
            max_hops: self.explain_max_hops,
            relationship_types: edge_types::CAUSAL.iter().map(|t| t.to_string()).collect(),
            paths,
        })
    }

    // ── Journal ──────────────────────────────────────────────────

    /// Journal entries matching `query`, newest first. Empty when
    /// journaling is off.
    pub fn journal_entries(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>> {
        let Some(journal) = &self.journal else {
            return Ok(Vec::new());
        };
        journal
            .list(query)
            .map_err(|e| BrainError::StoreOperationFailed(format!("journal: {e}")))
    }

    fn store_journal(&self, session: JournalSession) -> Option<String> {
        let journal = self.journal.as_deref()?;
        journal::finalize_and_store(session, journal)
    }
}

fn resolve<'a>(node: &'a NodeRef, created_ids: &'a [String]) -> Option<&'a str> {
    match node {
        NodeRef::Existing(id) => Some(id.as_str()),
        NodeRef::Proposed(index) => created_ids.get(*index).map(String::as_str),
    }
}
