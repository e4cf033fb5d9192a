use crate::{
    graph::{FieldDecl, FunctionSig, MethodSig, TypeDecl, TypeGraph},
    types::Scalar,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// SchemaGraph
///
/// In-memory type graph, built in code or loaded from a JSON manifest.
///
/// ```json
/// {
///   "types": {
///     "fixture.Other": { "kind": { "record": [] }, "methods": [] }
///   },
///   "functions": []
/// }
/// ```
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaGraph {
    #[serde(default)]
    types: BTreeMap<String, TypeDecl>,

    #[serde(default)]
    functions: Vec<FunctionSig>,
}

impl SchemaGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub fn with_record(mut self, path: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        self.insert(path, TypeDecl::record(fields));
        self
    }

    #[must_use]
    pub fn with_scalar(mut self, path: impl Into<String>, scalar: Scalar) -> Self {
        self.insert(path, TypeDecl::scalar(scalar));
        self
    }

    /// Attach a method to an already declared type. Unknown paths are ignored.
    #[must_use]
    pub fn with_method(mut self, path: &str, method: MethodSig) -> Self {
        if let Some(decl) = self.types.get_mut(path) {
            decl.methods.push(method);
        }
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: FunctionSig) -> Self {
        self.functions.push(function);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, decl: TypeDecl) {
        self.types.insert(path.into(), decl);
    }
}

impl TypeGraph for SchemaGraph {
    fn type_paths(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    fn resolve(&self, path: &str) -> Option<&TypeDecl> {
        self.types.get(path)
    }

    fn methods(&self, path: &str) -> &[MethodSig] {
        self.types
            .get(path)
            .map(|decl| decl.methods.as_slice())
            .unwrap_or_default()
    }

    fn functions(&self) -> &[FunctionSig] {
        &self.functions
    }
}

///
/// TESTS
///
