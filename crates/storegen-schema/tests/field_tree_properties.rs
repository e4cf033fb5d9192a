use proptest::prelude::*;
use std::collections::BTreeSet;
use storegen_schema::{
    build::{build_field_tree, build_models},
    config::GeneratorConfig,
    error::ConfigError,
    graph::{FieldDecl, SchemaGraph},
    node::Schema,
    types::{Scalar, TypeRef},
};

///
/// FieldShape
///

#[derive(Clone, Debug)]
struct FieldShape {
    target: Option<usize>,
    wrapper: u8,
}

fn arb_field(types: usize) -> impl Strategy<Value = FieldShape> {
    (prop::option::of(0..types), 0u8..4).prop_map(|(target, wrapper)| FieldShape { target, wrapper })
}

fn arb_graph() -> impl Strategy<Value = Vec<Vec<FieldShape>>> {
    (1usize..6).prop_flat_map(|types| {
        prop::collection::vec(prop::collection::vec(arb_field(types), 0..4), types)
    })
}

fn type_path(i: usize) -> String {
    format!("gen.T{i}")
}

// wrapper 0 is direct, 1 pointer, 2 sequence, 3 map
fn wrap(inner: TypeRef, wrapper: u8) -> TypeRef {
    match wrapper {
        0 => inner,
        1 => TypeRef::pointer(inner),
        2 => TypeRef::sequence(inner),
        _ => TypeRef::map(TypeRef::Scalar(Scalar::Text), inner),
    }
}

fn to_graph(shape: &[Vec<FieldShape>], acyclic: bool) -> SchemaGraph {
    let mut graph = SchemaGraph::new();

    for (i, fields) in shape.iter().enumerate() {
        let mut decls = Vec::new();
        if i == 0 {
            decls.push(FieldDecl::embed("storable.Document").with_tag(r#"collection:"root""#));
        }

        for (k, field) in fields.iter().enumerate() {
            let target = field.target.filter(|t| !acyclic || *t > i);
            let inner = target.map_or(TypeRef::Scalar(Scalar::Int), |t| TypeRef::named(type_path(t)));
            decls.push(FieldDecl::new(format!("F{k}"), wrap(inner, field.wrapper)));
        }

        graph = graph.with_record(type_path(i), decls);
    }

    graph
}

fn build(graph: &SchemaGraph) -> Schema {
    build_models(graph, &GeneratorConfig::default()).schema
}

proptest! {
    #[test]
    fn field_trees_terminate_on_any_graph(shape in arb_graph()) {
        let graph = to_graph(&shape, false);
        let outcome = build_models(&graph, &GeneratorConfig::default());

        for error in &outcome.errors {
            let infinite = matches!(error.error, ConfigError::InfiniteSize { .. });
            prop_assert!(infinite, "unexpected error {:?}", error);
        }
        for model in outcome.schema.models.values() {
            for field in model.fields.iter() {
                if field.truncated {
                    prop_assert!(field.children.is_empty());
                }
                // parent links always point backwards, so walking them ends
                if let Some(parent) = field.parent {
                    prop_assert!(parent < field.id);
                }
            }
        }
    }

    #[test]
    fn acyclic_paths_are_unique_and_resolve(shape in arb_graph()) {
        let graph = to_graph(&shape, true);
        let schema = build(&graph);
        let model = schema.model("T0").expect("root model");

        let mut seen = BTreeSet::new();
        for field in model.fields.iter() {
            let path = model.fields.path(field.id);
            prop_assert!(seen.insert(path.clone()), "duplicate path {}", path);
            prop_assert_eq!(model.fields.resolve_path(&path), Some(field.id));
            prop_assert!(!field.truncated);
        }
    }

    #[test]
    fn building_is_idempotent(shape in arb_graph()) {
        let graph = to_graph(&shape, false);
        prop_assert_eq!(build(&graph), build(&graph));
    }
}

#[test]
fn tree_for_root_matches_model_tree() {
    let graph = to_graph(
        &[vec![FieldShape {
            target: Some(0),
            wrapper: 1,
        }]],
        false,
    );
    let schema = build(&graph);
    let model = schema.model("T0").unwrap();

    assert_eq!(build_field_tree(&schema.arena, model.ty).unwrap(), model.fields);
    assert_eq!(model.fields.path(model.fields.top_level()[0]), "f0");
}
