//! Generation-time planning for storegen: hook-dispatch traversals, field
//! accessor trees and the hand-off to an [`Emitter`].

pub mod emit;
pub mod plan;
pub mod schema;
pub mod traversal;

pub use emit::{Emitter, JsonEmitter};
pub use plan::{ModelPlan, PlanBuilder};

use std::sync::Arc;
use storegen_schema::{
    build::{ModelError, build_models},
    config::GeneratorConfig,
    error::ErrorTree,
    graph::TypeGraph,
    validate::validate_schema,
};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema validation failed: {0}")]
    Validation(ErrorTree),

    #[error("emitter failed for model '{model}': {source}")]
    Emit {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

///
/// GenerateReport
///

#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Models handed to the emitter, in name order.
    pub generated: Vec<String>,

    /// Models skipped because of configuration errors.
    pub failed: Vec<ModelError>,
}

impl GenerateReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Build every model in the graph and hand each plan to the emitter.
///
/// A configuration error skips its model and is listed in the report; the
/// other models are still generated. Cross-model validation failures and
/// emitter failures stop generation.
pub fn generate<G, E>(
    graph: &G,
    config: &GeneratorConfig,
    emitter: &mut E,
) -> Result<GenerateReport, Error>
where
    G: TypeGraph + ?Sized,
    E: Emitter,
{
    let outcome = build_models(graph, config);
    for failure in &outcome.errors {
        warn!(model = %failure.model, error = %failure.error, "model skipped");
    }

    validate_schema(&outcome.schema).map_err(Error::Validation)?;

    let schema = Arc::new(outcome.schema);
    let mut report = GenerateReport {
        generated: Vec::new(),
        failed: outcome.errors,
    };

    for model in schema.models.values() {
        let plan = PlanBuilder::new(Arc::clone(&schema), model.clone()).build();

        emitter.emit(&schema, &plan).map_err(|e| Error::Emit {
            model: model.name.clone(),
            source: Box::new(e),
        })?;

        debug!(model = %model.name, "model generated");
        report.generated.push(model.name.clone());
    }

    Ok(report)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use storegen_schema::{
        graph::{FieldDecl, SchemaGraph},
        types::{Scalar, TypeRef},
    };

    fn document(collection: &str) -> FieldDecl {
        FieldDecl::embed("storable.Document").with_tag(format!(r#"collection:"{collection}""#))
    }

    #[test]
    fn invalid_model_is_skipped_and_others_are_emitted() {
        let graph = SchemaGraph::new()
            .with_record("a.Good", vec![document("good")])
            .with_record(
                "a.Bad",
                vec![
                    document("bad"),
                    FieldDecl::new("A", TypeRef::Scalar(Scalar::Int)).with_tag(r#"bson:"k""#),
                    FieldDecl::new("B", TypeRef::Scalar(Scalar::Int)).with_tag(r#"bson:"k""#),
                ],
            );
        let mut emitter = JsonEmitter::new();

        let report = generate(&graph, &GeneratorConfig::default(), &mut emitter).unwrap();

        assert_eq!(report.generated, vec!["Good"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].model, "Bad");
        assert!(!report.is_complete());
        assert!(emitter.documents.contains_key("Good"));
        assert!(!emitter.documents.contains_key("Bad"));
    }

    #[test]
    fn shared_collection_stops_generation() {
        let graph = SchemaGraph::new()
            .with_record("a.One", vec![document("shared")])
            .with_record("a.Two", vec![document("shared")]);
        let mut emitter = JsonEmitter::new();

        let err = generate(&graph, &GeneratorConfig::default(), &mut emitter).unwrap_err();

        assert!(matches!(err, Error::Validation(_)), "got {err}");
        assert!(emitter.documents.is_empty());
    }
}
