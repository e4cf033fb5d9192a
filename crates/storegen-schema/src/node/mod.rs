mod field;
mod hook;
mod model;

pub use field::*;
pub use hook::*;
pub use model::*;

use crate::{
    error::ConfigError,
    types::{Containment, Scalar, Wrapper},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// TypeId
///
/// Index of a [`TypeNode`] in its [`TypeArena`]. Equal ids mean the same
/// declared type.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("#{_0}")]
pub struct TypeId(pub usize);

///
/// NodeKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Record,
    Scalar(Scalar),
}

///
/// Element
///
/// What a member holds once its wrappers are peeled: a builtin scalar or a
/// named type from the arena.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Scalar(Scalar),
    Type(TypeId),
}

impl Element {
    #[must_use]
    pub const fn type_id(self) -> Option<TypeId> {
        match self {
            Self::Type(id) => Some(id),
            Self::Scalar(_) => None,
        }
    }
}

///
/// Member
///
/// A resolved, visible field declaration of a record type.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Member {
    pub name: String,
    pub wire_name: String,
    pub wrappers: Vec<Wrapper>,
    pub containment: Containment,
    pub element: Element,
    pub inline: bool,
    pub omit_empty: bool,
    pub transient: bool,
    pub embedded: bool,
}

///
/// TypeNode
///
/// One distinct declared type. Built once, then shared by id across every
/// field that refers to it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeNode {
    pub id: TypeId,
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    pub members: Vec<Member>,
    pub is_document: bool,
    pub collection: Option<String>,
    pub hooks: HookSet,
    pub init: bool,

    /// Malformed hook declarations found on this type.
    pub defects: Vec<ConfigError>,
}

impl TypeNode {
    #[must_use]
    pub fn stub(id: TypeId, path: &str) -> Self {
        Self {
            id,
            path: path.to_string(),
            name: crate::types::simple_name(path).to_string(),
            kind: NodeKind::Record,
            members: Vec::new(),
            is_document: false,
            collection: None,
            hooks: HookSet::new(),
            init: false,
            defects: Vec::new(),
        }
    }

    /// A document root carries the base marker and a collection name.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.is_document && self.collection.is_some()
    }

    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self.kind, NodeKind::Record)
    }
}

///
/// TypeArena
///
/// Owner of every [`TypeNode`], keyed by type path.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeArena {
    nodes: Vec<TypeNode>,
    by_path: BTreeMap<String, TypeId>,
}

impl TypeArena {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_path: BTreeMap::new(),
        }
    }

    /// Reserve a node for `path` so that recursive references resolve to
    /// it while its members are still being built.
    pub fn reserve(&mut self, path: &str) -> TypeId {
        if let Some(id) = self.by_path.get(path) {
            return *id;
        }

        let id = TypeId(self.nodes.len());
        self.nodes.push(TypeNode::stub(id, path));
        self.by_path.insert(path.to_string(), id);

        id
    }

    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<TypeId> {
        self.by_path.get(path).copied()
    }

    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<&TypeNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Display name of an element, `int` or the type's simple name.
    #[must_use]
    pub fn element_name(&self, element: Element) -> String {
        match element {
            Element::Scalar(scalar) => scalar.as_str().to_string(),
            Element::Type(id) => self
                .get(id)
                .map_or_else(|| id.to_string(), |node| node.name.clone()),
        }
    }
}

///
/// TESTS
///
