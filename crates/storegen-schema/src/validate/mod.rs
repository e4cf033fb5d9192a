//! Model and schema validation.
//!
//! Per-model rules run while each model is built, so a failure only skips
//! that model. Rules that need every model at once run on the finished
//! schema.

pub mod naming;
pub mod wire;

use crate::{
    error::ErrorTree,
    node::{Model, Schema},
};

/// Invariants of a single model.
pub fn validate_model(model: &Model) -> Result<(), ErrorTree> {
    let mut errors = ErrorTree::new();
    naming::validate_collection_name(&model.collection, &mut errors);
    wire::validate_wire_names(model, &mut errors);

    errors.result()
}

/// Invariants that need every model at once.
pub fn validate_schema(schema: &Schema) -> Result<(), ErrorTree> {
    let mut errors = ErrorTree::new();
    naming::validate_model_naming(schema, &mut errors);

    errors.result()
}
