use crate::{
    error::ConfigError,
    node::{Field, FieldId, FieldTree, TypeArena, TypeId},
    types::Containment,
};
use tracing::trace;

///
/// Frame
///
/// A record type being expanded on the current root-to-here path, and
/// whether it was entered without indirection.
///

struct Frame {
    ty: TypeId,
    direct: bool,
}

/// Build the field tree of `root`.
///
/// Each record type is expanded at most once per path: a field whose
/// element type is already being expanded above it is kept, but marked
/// truncated and given no children. A cycle made only of direct members
/// describes a value of infinite size and is reported instead.
pub fn build_field_tree(arena: &TypeArena, root: TypeId) -> Result<FieldTree, ConfigError> {
    let mut builder = FieldTreeBuilder {
        arena,
        tree: FieldTree::new(root),
        visited: Vec::new(),
    };
    builder.expand(root, None)?;

    Ok(builder.tree)
}

struct FieldTreeBuilder<'a> {
    arena: &'a TypeArena,
    tree: FieldTree,
    visited: Vec<Frame>,
}

impl FieldTreeBuilder<'_> {
    fn expand(&mut self, ty: TypeId, parent: Option<FieldId>) -> Result<(), ConfigError> {
        let arena = self.arena;
        let node = arena.get(ty).ok_or_else(|| ConfigError::UnresolvedType {
            path: ty.to_string(),
        })?;

        for member in &node.members {
            let id = self.tree.push(Field {
                id: FieldId(0),
                name: member.name.clone(),
                wire_name: member.wire_name.clone(),
                containment: member.containment,
                wrappers: member.wrappers.clone(),
                element: member.element,
                parent,
                inline: member.inline,
                omit_empty: member.omit_empty,
                transient: member.transient,
                children: Vec::new(),
                truncated: false,
            });

            let Some(child) = member
                .element
                .type_id()
                .filter(|child| arena.get(*child).is_some_and(|n| n.is_record()))
            else {
                continue;
            };
            let direct = member.containment == Containment::Direct;

            if let Some(pos) = self.visited.iter().position(|frame| frame.ty == child) {
                if direct && self.visited[pos + 1..].iter().all(|frame| frame.direct) {
                    return Err(ConfigError::InfiniteSize {
                        ty: node.path.clone(),
                        field: member.name.clone(),
                    });
                }

                trace!(ty = %node.path, field = %member.name, "field tree truncated at cycle");
                self.tree.mark_truncated(id);
                continue;
            }

            self.visited.push(Frame { ty: child, direct });
            self.expand(child, Some(id))?;
            self.visited.pop();
        }

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        build::resolve::TypeResolver,
        config::GeneratorConfig,
        graph::{FieldDecl, SchemaGraph},
        types::{Scalar, TypeRef},
    };

    fn tree_for(graph: &SchemaGraph, root: &str) -> Result<FieldTree, ConfigError> {
        let config = GeneratorConfig::default();
        let mut resolver = TypeResolver::new(graph, &config);
        let id = resolver.intern(root).unwrap();

        build_field_tree(resolver.arena(), id)
    }

    fn child_named<'a>(tree: &'a FieldTree, parent: FieldId, name: &str) -> &'a Field {
        tree.children(parent).find(|f| f.name == name).unwrap()
    }

    #[test]
    fn self_reference_is_expanded_once() {
        let graph = SchemaGraph::new().with_record(
            "fixture.Recur",
            vec![
                FieldDecl::new("Foo", TypeRef::Scalar(Scalar::Text)),
                FieldDecl::new("R", TypeRef::pointer(TypeRef::named("fixture.Recur"))),
            ],
        );
        let tree = tree_for(&graph, "fixture.Recur").unwrap();

        let r = tree.get(tree.top_level()[1]).unwrap();
        assert!(!r.truncated);

        let rr = child_named(&tree, r.id, "R");
        assert!(rr.truncated);
        assert!(rr.children.is_empty());
        assert_eq!(rr.element, r.element);
        assert_eq!(tree.path(rr.id), "r.r");
    }

    #[test]
    fn mutual_recursion_terminates() {
        let graph = SchemaGraph::new()
            .with_record(
                "fixture.Recur",
                vec![
                    FieldDecl::new("Foo", TypeRef::Scalar(Scalar::Text)),
                    FieldDecl::new("R", TypeRef::pointer(TypeRef::named("fixture.Other"))),
                ],
            )
            .with_record(
                "fixture.Other",
                vec![FieldDecl::new(
                    "R",
                    TypeRef::pointer(TypeRef::named("fixture.Recur")),
                )],
            );
        let tree = tree_for(&graph, "fixture.Recur").unwrap();

        let r = tree.get(tree.top_level()[1]).unwrap();
        let rr = child_named(&tree, r.id, "R");
        let rrr = child_named(&tree, rr.id, "R");

        assert!(!rr.truncated);
        assert!(rrr.truncated);
        assert_eq!(rrr.element, r.element);
        assert!(rrr.children.is_empty());
    }

    #[test]
    fn direct_cycle_is_infinite() {
        let graph = SchemaGraph::new()
            .with_record(
                "fixture.A",
                vec![FieldDecl::new("B", TypeRef::named("fixture.B"))],
            )
            .with_record(
                "fixture.B",
                vec![FieldDecl::new("A", TypeRef::named("fixture.A"))],
            );

        let err = tree_for(&graph, "fixture.A").unwrap_err();
        assert!(matches!(err, ConfigError::InfiniteSize { .. }), "got {err:?}");
    }

    #[test]
    fn collections_break_direct_cycles() {
        let graph = SchemaGraph::new().with_record(
            "fixture.Node",
            vec![FieldDecl::new(
                "Children",
                TypeRef::sequence(TypeRef::named("fixture.Node")),
            )],
        );
        let tree = tree_for(&graph, "fixture.Node").unwrap();

        assert_eq!(tree.len(), 2);
        assert!(tree.iter().last().unwrap().truncated);
    }
}
