mod manifest;

pub use manifest::SchemaGraph;

use crate::types::{Scalar, TypeRef};
use serde::{Deserialize, Serialize};

///
/// TypeGraph
///
/// Source of raw type metadata. Implementations must report stable paths:
/// two lookups of the same declared type yield the same path string.
/// Method sets are the full set callable on the type, promotions included.
///

pub trait TypeGraph {
    /// All declared type paths, sorted.
    fn type_paths(&self) -> Vec<&str>;

    fn resolve(&self, path: &str) -> Option<&TypeDecl>;

    fn methods(&self, path: &str) -> &[MethodSig];

    /// Free functions visible next to the declared types.
    fn functions(&self) -> &[FunctionSig];

    fn fields(&self, path: &str) -> &[FieldDecl] {
        match self.resolve(path).map(|decl| &decl.kind) {
            Some(TypeKind::Record(fields)) => fields.as_slice(),
            _ => &[],
        }
    }

    fn function(&self, name: &str) -> Option<&FunctionSig> {
        self.functions().iter().find(|f| f.name == name)
    }
}

///
/// TypeDecl
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeDecl {
    pub kind: TypeKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodSig>,
}

impl TypeDecl {
    #[must_use]
    pub const fn record(fields: Vec<FieldDecl>) -> Self {
        Self {
            kind: TypeKind::Record(fields),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub const fn scalar(scalar: Scalar) -> Self {
        Self {
            kind: TypeKind::Scalar(scalar),
            methods: Vec::new(),
        }
    }
}

///
/// TypeKind
///
/// A named type is either a record with fields or a named scalar such as
/// `type Thing int`. Named scalars can still declare hooks.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Record(Vec<FieldDecl>),
    Scalar(Scalar),
}

///
/// FieldDecl
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,

    /// Raw struct tag, `key:"value"` pairs.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub embedded: bool,
}

impl FieldDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: String::new(),
            embedded: false,
        }
    }

    /// Anonymous member named after its type.
    #[must_use]
    pub fn embed(path: &str) -> Self {
        Self {
            embedded: true,
            ..Self::new(crate::types::simple_name(path), TypeRef::named(path))
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Exported members start with an upper-case letter.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

///
/// MethodSig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MethodSig {
    pub name: String,

    #[serde(default)]
    pub params: Vec<TypeRef>,

    #[serde(default)]
    pub results: Vec<TypeRef>,
}

impl MethodSig {
    #[must_use]
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>, results: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            params,
            results,
        }
    }

    /// `Name() error`
    #[must_use]
    pub fn returning_error(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), vec![TypeRef::Error])
    }
}

///
/// FunctionSig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FunctionSig {
    pub name: String,

    #[serde(default)]
    pub params: Vec<ParamDecl>,

    #[serde(default)]
    pub results: Vec<TypeRef>,
}

///
/// ParamDecl
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
}

impl ParamDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}
