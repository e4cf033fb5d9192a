//! ## Crate layout
//! - `schema`: type graph contract, manifest provider, field trees, hook
//!   detection and the model registry.
//! - `build`: hook-dispatch traversals, field-schema trees and the
//!   emitter seam.
//! - `core`: runtime vocabulary for generated stores (criteria, queries,
//!   backend contract, hook and store errors).
//!
//! `prelude` is what generated code imports; `design::prelude` is the
//! generator-side surface.

pub use storegen_build as build;
pub use storegen_core as core;
pub use storegen_schema as schema;

/// re-exports
///
/// generated code refers to these through the facade so downstream crates
/// only need to depend on `storegen`
pub mod __reexports {
    pub use serde;
    pub use serde_json;
    pub use tracing;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use storegen_build::generate;

///
/// Runtime Prelude
///

pub mod prelude {
    pub use crate::core::{
        document::{Document, DocumentBase, DocumentId},
        error::{HookError, StoreError},
        query::{self, Criteria, FieldPath, MapPath, Query, Select, Sort},
        store::{Backend, Cursor, ResultSet, SaveOutcome, Store},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Design Prelude
///

pub mod design {
    pub mod prelude {
        pub use crate::build::{
            Emitter, JsonEmitter, ModelPlan, PlanBuilder,
            traversal::{Guard, TraversalNode, TraversalTree, build_traversal},
        };
        pub use storegen_schema::prelude::*;
    }
}
