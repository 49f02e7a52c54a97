//! Brain Graph — storage adapters for the knowledge graph.
//!
//! Everything that reads or writes persisted graph state goes through the
//! [`GraphStore`] trait. Two backends ship here: [`GraphClient`] talks to
//! Neo4j over Bolt, and [`MemoryGraphStore`] keeps the graph in process for
//! tests and local runs.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod store;
pub mod traverse;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryGraphStore;
pub use store::GraphStore;
