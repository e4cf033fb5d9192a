use crate::{
    MAP_KEY_SEGMENT,
    node::{Element, TypeId},
    types::{Containment, Wrapper},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// FieldId
///
/// Index into a [`FieldTree`]. A parent is always pushed before its
/// children, so parent ids are strictly smaller than child ids.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct FieldId(pub usize);

///
/// Field
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub wire_name: String,
    pub containment: Containment,
    pub wrappers: Vec<Wrapper>,
    pub element: Element,
    pub parent: Option<FieldId>,
    pub inline: bool,
    pub omit_empty: bool,
    pub transient: bool,
    pub children: Vec<FieldId>,

    /// Expansion stopped because the element type was already being
    /// expanded further up this path.
    pub truncated: bool,
}

///
/// FieldTree
///
/// Fields reachable from one document root, stored flat with parent links.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldTree {
    root: TypeId,
    fields: Vec<Field>,
    top: Vec<FieldId>,
}

impl FieldTree {
    #[must_use]
    pub const fn new(root: TypeId) -> Self {
        Self {
            root,
            fields: Vec::new(),
            top: Vec::new(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> TypeId {
        self.root
    }

    /// Append a field under `field.parent`, assigning its id.
    pub fn push(&mut self, mut field: Field) -> FieldId {
        let id = FieldId(self.fields.len());
        field.id = id;
        field.children.clear();

        match field.parent.and_then(|p| self.fields.get_mut(p.0)) {
            Some(parent) => parent.children.push(id),
            None => {
                field.parent = None;
                self.top.push(id);
            }
        }
        self.fields.push(field);

        id
    }

    pub fn mark_truncated(&mut self, id: FieldId) {
        if let Some(field) = self.fields.get_mut(id.0) {
            field.truncated = true;
        }
    }

    #[must_use]
    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.0)
    }

    /// Fields declared directly on the root type.
    #[must_use]
    pub fn top_level(&self) -> &[FieldId] {
        &self.top
    }

    pub fn children(&self, id: FieldId) -> impl Iterator<Item = &Field> {
        self.get(id)
            .map(|f| f.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.get(*child))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parents of a field, nearest first.
    pub fn ancestors(&self, id: FieldId) -> impl Iterator<Item = &Field> {
        std::iter::successors(
            self.get(id).and_then(|f| f.parent).and_then(|p| self.get(p)),
            |f| f.parent.and_then(|p| self.get(p)),
        )
    }

    /// Wire path segments from the root down to `id`. Inline fields add no
    /// segment; map fields add [`MAP_KEY_SEGMENT`] after their own name.
    #[must_use]
    pub fn segments(&self, id: FieldId) -> Vec<String> {
        let mut reversed = Vec::new();
        let chain = self.get(id).into_iter().chain(self.ancestors(id));

        for field in chain {
            if field.containment == Containment::Map {
                reversed.push(MAP_KEY_SEGMENT.to_string());
            }
            if !field.inline {
                reversed.push(field.wire_name.clone());
            }
        }
        reversed.reverse();

        reversed
    }

    /// Dotted wire path, e.g. `things.[map].name`.
    #[must_use]
    pub fn path(&self, id: FieldId) -> String {
        self.segments(id).join(".")
    }

    /// Find the field whose [`path`](Self::path) is `path`.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> Option<FieldId> {
        let mut scope = self.top.clone();
        let mut current = None;
        let mut segments = path.split('.');

        while let Some(segment) = segments.next() {
            let id = self.find_in(&scope, segment)?;
            let field = self.get(id)?;

            if field.containment == Containment::Map && segments.next() != Some(MAP_KEY_SEGMENT) {
                return None;
            }

            scope.clone_from(&field.children);
            current = Some(id);
        }

        current
    }

    // looks through inline fields, which own no segment
    fn find_in(&self, scope: &[FieldId], segment: &str) -> Option<FieldId> {
        scope.iter().find_map(|id| {
            let field = self.get(*id)?;
            if field.inline {
                self.find_in(&field.children, segment)
            } else {
                (field.wire_name == segment).then_some(*id)
            }
        })
    }

    /// Whether the field or one of its parents is a map.
    #[must_use]
    pub fn contains_map(&self, id: FieldId) -> bool {
        self.get(id)
            .into_iter()
            .chain(self.ancestors(id))
            .any(|f| f.containment == Containment::Map)
    }

    /// Transient fields, and everything under them, are never persisted.
    #[must_use]
    pub fn is_queryable(&self, id: FieldId) -> bool {
        self.get(id).is_some()
            && !self
                .get(id)
                .into_iter()
                .chain(self.ancestors(id))
                .any(|f| f.transient)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scalar;

    fn field(name: &str, parent: Option<FieldId>, containment: Containment) -> Field {
        Field {
            id: FieldId(0),
            name: name.to_string(),
            wire_name: name.to_lowercase(),
            containment,
            wrappers: Vec::new(),
            element: Element::Scalar(Scalar::Text),
            parent,
            inline: false,
            omit_empty: false,
            transient: false,
            children: Vec::new(),
            truncated: false,
        }
    }

    fn sample() -> (FieldTree, FieldId, FieldId, FieldId) {
        let mut tree = FieldTree::new(TypeId(0));
        let things = tree.push(field("Things", None, Containment::Map));
        let name = tree.push(field("Name", Some(things), Containment::Direct));
        let embedded = tree.push(Field {
            inline: true,
            ..field("Base", None, Containment::Direct)
        });
        let created = tree.push(field("Created", Some(embedded), Containment::Direct));

        (tree, things, name, created)
    }

    #[test]
    fn map_fields_insert_key_placeholder() {
        let (tree, things, name, _) = sample();

        assert_eq!(tree.path(things), "things.[map]");
        assert_eq!(tree.path(name), "things.[map].name");
        assert!(tree.contains_map(name));
    }

    #[test]
    fn inline_fields_contribute_no_segment() {
        let (tree, _, _, created) = sample();

        assert_eq!(tree.path(created), "created");
        assert!(!tree.contains_map(created));
    }

    #[test]
    fn paths_resolve_back_to_fields() {
        let (tree, things, name, created) = sample();

        for id in [things, name, created] {
            assert_eq!(tree.resolve_path(&tree.path(id)), Some(id));
        }
        assert_eq!(tree.resolve_path("things"), None);
        assert_eq!(tree.resolve_path("missing"), None);
    }

    #[test]
    fn transient_parents_hide_children() {
        let mut tree = FieldTree::new(TypeId(0));
        let cache = tree.push(Field {
            transient: true,
            wire_name: "-".to_string(),
            ..field("Cache", None, Containment::Pointer)
        });
        let inner = tree.push(field("Hits", Some(cache), Containment::Direct));

        assert!(!tree.is_queryable(cache));
        assert!(!tree.is_queryable(inner));
        assert_eq!(tree.path(inner), "-.hits");
    }
}
