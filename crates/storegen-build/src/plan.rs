use crate::{
    schema::{ModelSchema, build_schema},
    traversal::{TraversalTree, build_traversal},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storegen_schema::{
    node::{Model, Schema},
    types::{Action, Phase},
};

///
/// ModelPlan
///
/// Everything an emitter needs for one model: the model itself (field tree
/// and constructor included), its accessor tree, and one traversal per
/// `(phase, action)` pair.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ModelPlan {
    pub model: Model,
    pub schema: ModelSchema,
    pub traversals: Vec<TraversalTree>,
}

impl ModelPlan {
    #[must_use]
    pub fn traversal(&self, phase: Phase, action: Action) -> Option<&TraversalTree> {
        self.traversals
            .iter()
            .find(|t| t.phase == phase && t.action == action)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

///
/// PlanBuilder
///

pub struct PlanBuilder {
    pub schema: Arc<Schema>,
    pub model: Model,
}

impl PlanBuilder {
    /// Create a plan builder for a specific model.
    #[must_use]
    pub const fn new(schema: Arc<Schema>, model: Model) -> Self {
        Self { schema, model }
    }

    /// Build the accessor tree and all six traversals.
    #[must_use]
    pub fn build(self) -> ModelPlan {
        let traversals = Phase::ALL
            .into_iter()
            .flat_map(|phase| Action::ALL.into_iter().map(move |action| (phase, action)))
            .map(|(phase, action)| build_traversal(&self.schema, &self.model, phase, action))
            .collect();

        ModelPlan {
            schema: build_schema(&self.schema, &self.model),
            traversals,
            model: self.model,
        }
    }
}
