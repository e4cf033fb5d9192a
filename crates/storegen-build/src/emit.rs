use crate::plan::ModelPlan;
use std::collections::BTreeMap;
use storegen_schema::node::Schema;

///
/// Emitter
///
/// Renders plans into source text. Rendering, formatting and file output
/// are entirely the emitter's business.
///

pub trait Emitter {
    type Error: std::error::Error + Send + Sync + 'static;

    fn emit(&mut self, schema: &Schema, plan: &ModelPlan) -> Result<(), Self::Error>;
}

///
/// JsonEmitter
///
/// Collects each plan as pretty JSON, keyed by model name, for emitters
/// that run out of process.
///

#[derive(Debug, Default)]
pub struct JsonEmitter {
    pub documents: BTreeMap<String, String>,
}

impl JsonEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for JsonEmitter {
    type Error = serde_json::Error;

    fn emit(&mut self, _schema: &Schema, plan: &ModelPlan) -> Result<(), Self::Error> {
        self.documents
            .insert(plan.model.name.clone(), plan.to_json()?);

        Ok(())
    }
}
