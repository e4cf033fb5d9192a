use crate::{
    build::hooks::{detect_hooks, detect_init},
    config::GeneratorConfig,
    graph::{FieldDecl, TypeGraph, TypeKind},
    node::{Element, Member, NodeKind, TypeArena, TypeId},
    tag::{Tag, WireTag},
    types::{Containment, Scalar, TypeRef},
};
use tracing::{debug, trace};

///
/// TypeResolver
///
/// Interns named types from a [`TypeGraph`] into a [`TypeArena`], one node
/// per distinct path.
///

pub struct TypeResolver<'a, G: TypeGraph + ?Sized> {
    graph: &'a G,
    config: &'a GeneratorConfig,
    arena: TypeArena,
}

impl<'a, G: TypeGraph + ?Sized> TypeResolver<'a, G> {
    pub const fn new(graph: &'a G, config: &'a GeneratorConfig) -> Self {
        Self {
            graph,
            config,
            arena: TypeArena::new(),
        }
    }

    pub const fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn into_arena(self) -> TypeArena {
        self.arena
    }

    /// Intern every type the graph declares.
    pub fn intern_all(&mut self) {
        let graph = self.graph;
        for path in graph.type_paths() {
            self.intern(path);
        }
    }

    /// Intern a named type and, transitively, every type its members name.
    /// Returns `None` when the graph does not know the path.
    pub fn intern(&mut self, path: &str) -> Option<TypeId> {
        if let Some(id) = self.arena.lookup(path) {
            return Some(id);
        }

        let graph = self.graph;
        let decl = graph.resolve(path)?;
        let id = self.arena.reserve(path);

        let mut kind = NodeKind::Record;
        let mut members = Vec::new();
        let mut is_document = false;
        let mut collection = None;

        match &decl.kind {
            TypeKind::Scalar(scalar) => kind = NodeKind::Scalar(*scalar),
            TypeKind::Record(fields) => {
                for field in fields {
                    if self.is_base_embedding(field) {
                        is_document = true;
                        collection = Tag::parse(&field.tag)
                            .get(&self.config.collection_tag)
                            .filter(|c| !c.is_empty())
                            .map(ToString::to_string);
                        continue;
                    }
                    if !self.config.include_private && !field.is_exported() {
                        trace!(ty = path, field = %field.name, "skipping unexported member");
                        continue;
                    }

                    members.push(self.member(field));
                }
            }
        }

        let methods = graph.methods(path);
        let is_root = is_document && collection.is_some();
        let scan = detect_hooks(path, methods, is_root, self.config);
        let init = detect_init(methods, self.config)
            || members.iter().any(|m| m.embedded && self.element_has_init(m.element));

        if let Some(node) = self.arena.get_mut(id) {
            node.kind = kind;
            node.members = members;
            node.is_document = is_document;
            node.collection = collection;
            node.hooks = scan.hooks;
            node.defects = scan.defects;
            node.init = init;
        }

        Some(id)
    }

    fn is_base_embedding(&self, field: &FieldDecl) -> bool {
        field.embedded
            && field
                .ty
                .terminal_name()
                .is_some_and(|path| self.config.is_base_marker(path))
    }

    fn element_has_init(&self, element: Element) -> bool {
        element
            .type_id()
            .and_then(|id| self.arena.get(id))
            .is_some_and(|node| node.init)
    }

    fn member(&mut self, field: &FieldDecl) -> Member {
        let wire = WireTag::from_tag(&Tag::parse(&field.tag), &self.config.wire_tag);
        let (wrappers, terminal) = field.ty.peel();

        let element = match terminal {
            TypeRef::Scalar(scalar) => Element::Scalar(*scalar),
            TypeRef::Named(path) => match self.intern(path) {
                Some(id) => Element::Type(id),
                None => {
                    debug!(ty = %path, field = %field.name, "unresolved type treated as opaque");
                    Element::Scalar(Scalar::Opaque)
                }
            },
            _ => Element::Scalar(Scalar::Opaque),
        };

        Member {
            name: field.name.clone(),
            wire_name: wire.wire_name(&field.name),
            containment: Containment::classify(&wrappers),
            wrappers,
            element,
            inline: wire.inline,
            omit_empty: wire.omit_empty,
            transient: wire.is_transient(),
            embedded: field.embedded,
        }
    }
}

///
/// TESTS
///
