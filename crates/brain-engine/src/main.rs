//! CLI entry point for the `brain` knowledge graph tool.
//!
//! Every command prints one JSON envelope on stdout; logs go to stderr.
//! The exit code is non-zero whenever the envelope status is `error`.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

use brain_core::config::{BrainConfig, StoreBackend, StoreConfig};
use brain_core::types::agents;
use brain_core::{BrainError, EdgeInput, Envelope, Metadata, NodeInput};
use brain_engine::BrainEngine;
use brain_graph::{GraphClient, GraphConfig, GraphStore, MemoryGraphStore};
use brain_journal::{JournalQuery, Operation};

#[derive(Parser)]
#[command(name = "brain")]
#[command(about = "Enterprise Brain: a knowledge graph of tasks, people, issues and decisions")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: brain).
    #[arg(short, long, default_value = "brain", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Create or update a node.
    AddNode {
        #[arg(long)]
        id: String,
        /// Node type label (Task, Person, Issue, ...). Cannot change once set.
        #[arg(long = "type")]
        node_type: String,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = agents::USER)]
        agent: String,
        /// JSON object of extra properties.
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Create a typed edge between two existing nodes.
    AddEdge {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long = "type")]
        edge_type: String,
    },
    /// Print every node and edge.
    Graph,
    /// Print one node.
    Node { id: String },
    /// Split text into sentences and store them as a chain of Tasks.
    Ingest {
        /// Text to ingest; read from stdin when omitted.
        #[arg(long)]
        text: Option<String>,
        #[arg(long, default_value = agents::AI)]
        agent: String,
    },
    /// Run the enrichment rules once.
    Enrich,
    /// List causal paths leading into a node.
    Explain { id: String },
    /// Delete every node and edge.
    Reset {
        /// Confirm the irreversible delete.
        #[arg(long)]
        yes: bool,
    },
    /// Insert the demonstration graph.
    Seed,
    /// Check that the graph store is reachable.
    Health,
    /// List provenance journal entries, newest first.
    Journal {
        #[arg(long)]
        agent: Option<String>,
        #[arg(long, value_enum)]
        operation: Option<OperationArg>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OperationArg {
    Ingest,
    Enrich,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Ingest => Operation::Ingest,
            OperationArg::Enrich => Operation::Enrich,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BrainConfig::load(&cli.config).context("Failed to load configuration")?;

    let envelope = if let Err(err) = check_usage(&cli.command) {
        Envelope::error(&err)
    } else {
        match open_store(&config.store).await {
            Ok(store) => {
                let engine = BrainEngine::from_config(store, &config.engine);
                run(&engine, cli.command).await?
            }
            Err(err) => {
                tracing::error!(error = %err, "Graph store could not be opened");
                Envelope::error(&err)
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(if envelope.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Usage mistakes caught before any store is opened.
fn check_usage(command: &Command) -> Result<(), BrainError> {
    match command {
        Command::Reset { yes: false } => Err(BrainError::InvalidInput(
            "reset deletes the whole graph; pass --yes to confirm".to_string(),
        )),
        Command::AddNode { metadata, .. } => parse_metadata(metadata.as_deref()).map(|_| ()),
        _ => Ok(()),
    }
}

async fn open_store(config: &StoreConfig) -> Result<Arc<dyn GraphStore>, BrainError> {
    match config.backend {
        StoreBackend::Neo4j => {
            let client = GraphClient::connect(&GraphConfig::from(config)).await?;
            client.ensure_schema().await?;
            Ok(Arc::new(client))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; the graph is discarded on exit");
            Ok(Arc::new(MemoryGraphStore::new()))
        }
    }
}

async fn run(engine: &BrainEngine, command: Command) -> anyhow::Result<Envelope> {
    let envelope = match command {
        Command::AddNode {
            id,
            node_type,
            content,
            agent,
            metadata,
        } => {
            let metadata = match parse_metadata(metadata.as_deref()) {
                Ok(metadata) => metadata,
                Err(err) => return Ok(Envelope::error(&err)),
            };
            let input = NodeInput::new(id, node_type, content)
                .with_agent(agent)
                .with_metadata(metadata);
            Envelope::from_result(engine.add_node(&input).await, |upserted| {
                let verb = if upserted.created { "created" } else { "updated" };
                Envelope::upserted(upserted.created)
                    .with_message(format!("Node {} {verb}", upserted.value.id))
                    .with_data(json!({ "node": upserted.value }))
            })
        }
        Command::AddEdge {
            source,
            target,
            edge_type,
        } => {
            let input = EdgeInput::new(source, target, edge_type);
            Envelope::from_result(engine.add_edge(&input).await, |upserted| {
                let edge = &upserted.value;
                let message = if upserted.created {
                    format!("Edge {} -[{}]-> {} created", edge.source, edge.edge_type, edge.target)
                } else {
                    format!("Edge {} -[{}]-> {} already present", edge.source, edge.edge_type, edge.target)
                };
                Envelope::upserted(upserted.created)
                    .with_message(message)
                    .with_data(json!({ "edge": upserted.value }))
            })
        }
        Command::Graph => Envelope::from_result(engine.graph().await, |snapshot| {
            Envelope::ok()
                .with_message(format!(
                    "{} nodes, {} edges",
                    snapshot.nodes.len(),
                    snapshot.edges.len()
                ))
                .with_data(json!({ "nodes": snapshot.nodes, "edges": snapshot.edges }))
        }),
        Command::Node { id } => Envelope::from_result(engine.node(&id).await, |node| {
            Envelope::ok().with_data(json!({ "node": node }))
        }),
        Command::Ingest { text, agent } => {
            let text = match text {
                Some(text) => text,
                None => std::io::read_to_string(std::io::stdin())
                    .context("Failed to read text from stdin")?,
            };
            Envelope::from_result(engine.ingest(&text, &agent).await, |outcome| {
                Envelope::created()
                    .with_message(format!(
                        "Ingested {} sentences as Task nodes",
                        outcome.nodes.len()
                    ))
                    .with_data(json!(outcome))
            })
        }
        Command::Enrich => Envelope::from_result(engine.enrich().await, |outcome| {
            Envelope::ok()
                .with_message(format!(
                    "Enrichment added {} nodes and {} edges",
                    outcome.nodes_added, outcome.edges_added
                ))
                .with_data(json!(outcome))
        }),
        Command::Explain { id } => Envelope::from_result(engine.explain(&id).await, |explanation| {
            Envelope::ok()
                .with_message(format!(
                    "{} causal paths into {}",
                    explanation.paths.len(),
                    explanation.node_id
                ))
                .with_data(json!(explanation))
        }),
        Command::Reset { .. } => Envelope::from_result(engine.reset().await, |()| {
            Envelope::ok().with_message("Graph reset: all nodes and edges deleted")
        }),
        Command::Seed => Envelope::from_result(engine.seed().await, |report| {
            Envelope::ok()
                .with_message(format!(
                    "Seed written: {} nodes, {} edges",
                    report.nodes, report.edges
                ))
                .with_data(json!(report))
        }),
        Command::Health => Envelope::from_result(engine.health().await, |health| {
            Envelope::ok()
                .with_message(format!("{} store reachable", health.backend))
                .with_data(json!(health))
        }),
        Command::Journal {
            agent,
            operation,
            limit,
        } => {
            let query = JournalQuery {
                agent,
                operation: operation.map(Operation::from),
                ..Default::default()
            };
            let enabled = engine.journal().is_some();
            Envelope::from_result(engine.journal_entries(&query), |mut entries| {
                entries.truncate(limit);
                let envelope = Envelope::ok().with_data(json!({ "entries": entries }));
                if enabled {
                    envelope
                } else {
                    envelope.with_message("Journal disabled: set engine.journal_dir")
                }
            })
        }
    };
    Ok(envelope)
}

fn parse_metadata(raw: Option<&str>) -> Result<Metadata, BrainError> {
    match raw {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| BrainError::InvalidInput(format!("--metadata must be a JSON object: {e}"))),
        None => Ok(Metadata::new()),
    }
}
