//! Schema model extraction for storegen.
//!
//! Turns raw type metadata from a [`graph::TypeGraph`] into document models:
//! a shared arena of type nodes, one cycle-safe field tree per document root,
//! and the lifecycle hooks each type declares.

pub mod build;
pub mod config;
pub mod error;
pub mod graph;
pub mod node;
pub mod tag;
pub mod types;
pub mod validate;

/// Reserved wire name of every document's identity field.
pub const ID_FIELD: &str = "_id";

/// Synthetic path segment standing in for any key of an associative map.
pub const MAP_KEY_SEGMENT: &str = "[map]";

/// Wire name marking a field that is never persisted.
pub const TRANSIENT_WIRE_NAME: &str = "-";

use crate::error::{ConfigError, ErrorTree};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{BuildOutcome, ModelError, build_models},
        config::GeneratorConfig,
        err,
        error::{ConfigError, ErrorTree},
        graph::{SchemaGraph, TypeGraph},
        node::*,
        types::{Action, Containment, Phase, Scalar, Scope, TypeRef, Wrapper},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("schema validation failed: {0}")]
    Validation(ErrorTree),
}
