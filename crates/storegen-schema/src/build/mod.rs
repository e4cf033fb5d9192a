mod constructor;
mod field_tree;
mod hooks;
mod resolve;

pub use constructor::match_constructor;
pub use field_tree::build_field_tree;
pub use hooks::{HookScan, detect_hooks, detect_init};
pub use resolve::TypeResolver;

use crate::{
    ID_FIELD,
    config::GeneratorConfig,
    error::{ConfigError, ErrorTree},
    graph::TypeGraph,
    node::{Element, Model, Schema, TypeArena, TypeId},
    types::simple_name,
    validate::{validate_model, validate_schema},
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

///
/// ModelError
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ModelError {
    pub model: String,
    pub error: ConfigError,
}

///
/// BuildOutcome
///
/// Models that built cleanly plus the errors of those that did not. A
/// failing model never prevents the others from being built.
///

#[derive(Clone, Debug, Default)]
pub struct BuildOutcome {
    pub schema: Schema,
    pub errors: Vec<ModelError>,
}

impl BuildOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every model error, routed by model name.
    #[must_use]
    pub fn error_tree(&self) -> ErrorTree {
        let mut errs = ErrorTree::new();
        for e in &self.errors {
            errs.add_for(e.model.clone(), &e.error);
        }

        errs
    }

    /// All-or-nothing view: the schema only if every model built and the
    /// cross-model rules hold.
    pub fn into_result(self) -> Result<Schema, ErrorTree> {
        let mut errs = self.error_tree();
        if let Err(tree) = validate_schema(&self.schema) {
            errs.merge_for("schema", tree);
        }
        errs.result()?;

        Ok(self.schema)
    }
}

/// Discover every document root in the graph and build one model per root.
pub fn build_models<G: TypeGraph + ?Sized>(graph: &G, config: &GeneratorConfig) -> BuildOutcome {
    let mut resolver = TypeResolver::new(graph, config);
    resolver.intern_all();
    let arena = resolver.into_arena();

    let mut by_name: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for node in arena.iter().filter(|n| n.is_record() && n.is_root()) {
        by_name
            .entry(node.name.as_str())
            .or_default()
            .push(node.path.as_str());
    }

    let mut errors = Vec::new();
    let mut roots = Vec::new();
    for (name, paths) in by_name {
        if paths.len() > 1 {
            warn!(model = name, "ambiguous model name");
            errors.push(ModelError {
                model: name.to_string(),
                error: ConfigError::AmbiguousModel {
                    name: name.to_string(),
                    paths: paths.iter().map(ToString::to_string).collect(),
                },
            });
            continue;
        }
        if let Some(id) = paths.first().and_then(|path| arena.lookup(path)) {
            roots.push(id);
        }
    }

    let mut models = BTreeMap::new();
    for root in roots {
        match build_model(graph, config, &arena, root) {
            Ok(model) => {
                debug!(model = %model.name, collection = %model.collection, "model discovered");
                models.insert(model.name.clone(), model);
            }
            Err(model_errors) => errors.extend(model_errors),
        }
    }

    BuildOutcome {
        schema: Schema { arena, models },
        errors,
    }
}

/// Build the model for one interned document root.
pub fn build_model<G: TypeGraph + ?Sized>(
    graph: &G,
    config: &GeneratorConfig,
    arena: &TypeArena,
    root: TypeId,
) -> Result<Model, Vec<ModelError>> {
    let node = arena.get(root).ok_or_else(|| {
        vec![ModelError {
            model: root.to_string(),
            error: ConfigError::UnresolvedType {
                path: root.to_string(),
            },
        }]
    })?;
    let fail = |error: ConfigError| ModelError {
        model: node.name.clone(),
        error,
    };

    let fields = build_field_tree(arena, root).map_err(|e| vec![fail(e)])?;

    // malformed hooks anywhere the traversal can reach are fatal
    let mut reached = BTreeSet::from([root]);
    reached.extend(fields.iter().filter_map(|f| match f.element {
        Element::Type(id) => Some(id),
        Element::Scalar(_) => None,
    }));
    let defects = reached
        .iter()
        .filter_map(|id| arena.get(*id))
        .flat_map(|n| n.defects.iter().cloned())
        .map(fail)
        .collect::<Vec<_>>();
    if !defects.is_empty() {
        return Err(defects);
    }

    let constructor =
        match_constructor(graph, config, &node.name, &node.path).map_err(|e| vec![fail(e)])?;

    let model = Model {
        name: node.name.clone(),
        path: node.path.clone(),
        ty: root,
        collection: node.collection.clone().unwrap_or_default(),
        store_name: config.store_name(&node.name),
        query_name: config.query_name(&node.name),
        result_set_name: config.result_set_name(&node.name),
        id_field: ID_FIELD.to_string(),
        fields,
        constructor,
        init: node.init,
    };

    // per-model rules fail this model only
    validate_model(&model).map_err(|tree| {
        tree.flatten()
            .into_iter()
            .map(|(_, reason)| {
                fail(ConfigError::InvalidModel {
                    ty: node.path.clone(),
                    reason,
                })
            })
            .collect::<Vec<_>>()
    })?;

    Ok(model)
}

/// Build the model of a single root named by path.
pub fn build_model_for<G: TypeGraph + ?Sized>(
    graph: &G,
    config: &GeneratorConfig,
    path: &str,
) -> Result<(TypeArena, Model), Vec<ModelError>> {
    let unresolved = || {
        vec![ModelError {
            model: simple_name(path).to_string(),
            error: ConfigError::UnresolvedType {
                path: path.to_string(),
            },
        }]
    };

    let mut resolver = TypeResolver::new(graph, config);
    let root = resolver.intern(path).ok_or_else(unresolved)?;
    let arena = resolver.into_arena();
    let model = build_model(graph, config, &arena, root)?;

    Ok((arena, model))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::{FieldDecl, FunctionSig, MethodSig, SchemaGraph},
        types::{Scalar, TypeRef},
    };

    fn document(collection: &str) -> FieldDecl {
        FieldDecl::embed("storable.Document").with_tag(format!(r#"collection:"{collection}""#))
    }

    #[test]
    fn roots_need_marker_and_collection() {
        let graph = SchemaGraph::new()
            .with_record(
                "fixture.Recur",
                vec![document("recur"), FieldDecl::new("Foo", TypeRef::Scalar(Scalar::Text))],
            )
            .with_record(
                "fixture.Untagged",
                vec![FieldDecl::embed("storable.Document")],
            )
            .with_record(
                "fixture.Plain",
                vec![FieldDecl::new("Foo", TypeRef::Scalar(Scalar::Text))],
            );

        let outcome = build_models(&graph, &GeneratorConfig::default());
        assert!(outcome.is_ok());

        let names: Vec<_> = outcome.schema.models.keys().cloned().collect();
        assert_eq!(names, vec!["Recur"]);

        let model = outcome.schema.model("Recur").unwrap();
        assert_eq!(model.collection, "recur");
        assert_eq!(model.store_name, "RecurStore");
        assert_eq!(model.query_name, "RecurQuery");
        assert_eq!(model.result_set_name, "RecurResultSet");
        assert_eq!(model.id_field, "_id");
        assert_eq!(model.fields.len(), 1);
    }

    #[test]
    fn ambiguous_names_fail_only_those_models() {
        let graph = SchemaGraph::new()
            .with_record("a.Item", vec![document("items_a")])
            .with_record("b.Item", vec![document("items_b")])
            .with_record("a.Other", vec![document("others")]);

        let outcome = build_models(&graph, &GeneratorConfig::default());

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].model, "Item");
        assert!(matches!(
            &outcome.errors[0].error,
            ConfigError::AmbiguousModel { paths, .. } if paths == &["a.Item", "b.Item"]
        ));
        assert!(outcome.schema.model("Other").is_some());
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn malformed_hook_on_reachable_type_fails_model() {
        let graph = SchemaGraph::new()
            .with_record(
                "fixture.Recur",
                vec![
                    document("recur"),
                    FieldDecl::new("O", TypeRef::pointer(TypeRef::named("fixture.Other"))),
                ],
            )
            .with_record("fixture.Other", vec![])
            .with_method(
                "fixture.Other",
                MethodSig::new(
                    "BeforeSave",
                    vec![TypeRef::Scalar(Scalar::Int), TypeRef::Scalar(Scalar::Int)],
                    vec![TypeRef::Error],
                ),
            )
            .with_record("fixture.Fine", vec![document("fine")]);

        let outcome = build_models(&graph, &GeneratorConfig::default());

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].model, "Recur");
        assert!(outcome.schema.model("Fine").is_some());
        assert!(outcome.schema.model("Recur").is_none());
    }

    #[test]
    fn nested_store_shaped_hook_is_ignored() {
        let graph = SchemaGraph::new()
            .with_record(
                "fixture.Recur",
                vec![
                    document("recur"),
                    FieldDecl::new("T", TypeRef::pointer(TypeRef::named("fixture.Thing"))),
                ],
            )
            .with_record("fixture.Thing", vec![])
            .with_method(
                "fixture.Thing",
                MethodSig::new(
                    "BeforeSave",
                    vec![TypeRef::pointer(TypeRef::named("fixture.RecurStore"))],
                    vec![TypeRef::Error],
                ),
            );

        let outcome = build_models(&graph, &GeneratorConfig::default());

        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        assert!(outcome.schema.model("Recur").is_some());
    }

    #[test]
    fn invalid_model_does_not_block_the_others() {
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

        let outcome = build_models(&graph, &GeneratorConfig::default());

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].model, "Bad");
        assert!(matches!(
            &outcome.errors[0].error,
            ConfigError::InvalidModel { ty, reason } if ty == "a.Bad" && reason.contains("'k'")
        ));
        assert!(outcome.schema.model("Good").is_some());
        assert!(outcome.schema.model("Bad").is_none());
    }

    #[test]
    fn init_is_promoted_from_embedded_members() {
        let graph = SchemaGraph::new()
            .with_record(
                "fixture.InitEmbedded",
                vec![document("init"), FieldDecl::embed("fixture.OtherWithInit")],
            )
            .with_record("fixture.OtherWithInit", vec![])
            .with_method(
                "fixture.OtherWithInit",
                MethodSig::new(
                    "Init",
                    vec![TypeRef::named("storable.DocumentBase")],
                    vec![TypeRef::Error],
                ),
            );

        let outcome = build_models(&graph, &GeneratorConfig::default());
        assert!(outcome.schema.model("InitEmbedded").unwrap().init);
    }

    #[test]
    fn constructor_is_attached() {
        let graph = SchemaGraph::new()
            .with_record("fixture.Recur", vec![document("recur")])
            .with_function(FunctionSig {
                name: "newRecur".to_string(),
                params: vec![],
                results: vec![TypeRef::named("fixture.Recur")],
            });

        let outcome = build_models(&graph, &GeneratorConfig::default());
        let model = outcome.schema.model("Recur").unwrap();

        assert_eq!(
            model.constructor.as_ref().map(|c| c.function.as_str()),
            Some("newRecur")
        );
    }

    #[test]
    fn unknown_root_path_is_unresolved() {
        let err = build_model_for(&SchemaGraph::new(), &GeneratorConfig::default(), "x.Missing")
            .unwrap_err();

        assert!(matches!(err[0].error, ConfigError::UnresolvedType { .. }));
    }
}
