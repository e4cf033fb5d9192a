use crate::{
    err,
    error::ErrorTree,
    node::{FieldId, FieldTree, Model},
};
use std::collections::BTreeMap;

/// Sibling fields must not share a wire name once inline fields are
/// flattened into their parent.
pub fn validate_wire_names(model: &Model, errs: &mut ErrorTree) {
    check_level(&model.fields, model.fields.top_level(), "", errs);
}

fn check_level(tree: &FieldTree, level: &[FieldId], parent: &str, errs: &mut ErrorTree) {
    let mut seen = BTreeMap::new();
    let mut flat = Vec::new();
    flatten_inline(tree, level, &mut flat);

    for id in flat {
        let Some(field) = tree.get(id) else {
            continue;
        };
        if field.transient {
            continue;
        }

        if let Some(prev) = seen.insert(field.wire_name.as_str(), field.name.as_str()) {
            let at = if parent.is_empty() { "<root>" } else { parent };
            err!(
                errs,
                "fields '{prev}' and '{}' share wire name '{}' under {at}",
                field.name,
                field.wire_name
            );
        }

        if !field.children.is_empty() {
            check_level(tree, &field.children, &tree.path(id), errs);
        }
    }
}

// inline fields own no key, so their children sit at this level
fn flatten_inline(tree: &FieldTree, level: &[FieldId], out: &mut Vec<FieldId>) {
    for id in level {
        match tree.get(*id) {
            Some(field) if field.inline => flatten_inline(tree, &field.children, out),
            Some(_) => out.push(*id),
            None => {}
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{
        build::build_models,
        config::GeneratorConfig,
        error::ConfigError,
        graph::{FieldDecl, SchemaGraph},
        types::{Scalar, TypeRef},
    };

    #[test]
    fn inline_collisions_fail_the_model() {
        let graph = SchemaGraph::new()
            .with_record(
                "fixture.Doc",
                vec![
                    FieldDecl::embed("storable.Document").with_tag(r#"collection:"docs""#),
                    FieldDecl::new("Name", TypeRef::Scalar(Scalar::Text)),
                    FieldDecl::new("Meta", TypeRef::named("fixture.Meta"))
                        .with_tag(r#"bson:",inline""#),
                ],
            )
            .with_record(
                "fixture.Meta",
                vec![FieldDecl::new("Title", TypeRef::Scalar(Scalar::Text))
                    .with_tag(r#"bson:"name""#)],
            );

        let outcome = build_models(&graph, &GeneratorConfig::default());

        assert!(outcome.schema.model("Doc").is_none());
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            &outcome.errors[0].error,
            ConfigError::InvalidModel { reason, .. }
                if reason.contains("'Name' and 'Title'") && reason.contains("'name'")
        ));
    }

    #[test]
    fn transient_fields_may_share_a_wire_name() {
        let graph = SchemaGraph::new().with_record(
            "fixture.Doc",
            vec![
                FieldDecl::embed("storable.Document").with_tag(r#"collection:"docs""#),
                FieldDecl::new("A", TypeRef::Scalar(Scalar::Int)).with_tag(r#"bson:"-""#),
                FieldDecl::new("B", TypeRef::Scalar(Scalar::Int)).with_tag(r#"bson:"-""#),
            ],
        );

        let outcome = build_models(&graph, &GeneratorConfig::default());

        assert!(outcome.is_ok(), "{:?}", outcome.errors);
    }
}
