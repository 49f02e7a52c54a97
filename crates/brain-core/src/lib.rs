//! brain-core: Shared types, validation, configuration, and error handling for
//! Enterprise Brain.
//!
//! This crate provides the foundational pieces used across all Brain crates:
//! - Node and edge types for the property graph
//! - Identifier and type-name validation
//! - Error kinds and the uniform response envelope
//! - Configuration management

pub mod config;
pub mod envelope;
pub mod error;
pub mod types;
pub mod validate;

pub use envelope::{Envelope, Status};
pub use error::{BrainError, ErrorKind, Result};
pub use types::{
    Edge, EdgeInput, EdgeKey, GraphSnapshot, Metadata, Node, NodeInput, TracedPath, Upserted,
};
