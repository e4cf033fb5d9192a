use crate::{
    node::{FieldTree, TypeArena, TypeId, TypeNode},
    types::TypeRef,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Model
///
/// One document root and everything generation needs to know about it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Model {
    pub name: String,
    pub path: String,
    pub ty: TypeId,
    pub collection: String,
    pub store_name: String,
    pub query_name: String,
    pub result_set_name: String,
    pub id_field: String,
    pub fields: FieldTree,
    pub constructor: Option<Constructor>,
    pub init: bool,
}

///
/// Constructor
///
/// A `new{Name}` function whose arguments generated construction code
/// forwards.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Constructor {
    pub function: String,
    pub params: Vec<ConstructorParam>,
    pub returns: Vec<ConstructorReturn>,
}

impl Constructor {
    /// `name type, name2 type2`
    #[must_use]
    pub fn param_list(&self) -> String {
        self.params
            .iter()
            .map(|p| format!("{} {}", p.name, p.ty))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `name, name2`
    #[must_use]
    pub fn arg_list(&self) -> String {
        self.params
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Return variable names: `doc`, `err`, then `r{i}` by position.
    #[must_use]
    pub fn return_vars(&self) -> Vec<String> {
        self.returns
            .iter()
            .enumerate()
            .map(|(i, ret)| match ret.role {
                ReturnRole::Document => "doc".to_string(),
                ReturnRole::Error => "err".to_string(),
                ReturnRole::Other => format!("r{i}"),
            })
            .collect()
    }
}

///
/// ConstructorParam
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConstructorParam {
    pub name: String,
    pub ty: TypeRef,
}

///
/// ConstructorReturn
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConstructorReturn {
    pub ty: TypeRef,
    pub role: ReturnRole,
}

///
/// ReturnRole
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnRole {
    Document,
    /// The first error-kind result only.
    Error,
    Other,
}

///
/// Schema
///
/// The shared type arena plus every successfully built model, by name.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schema {
    pub arena: TypeArena,
    pub models: BTreeMap<String, Model>,
}

impl Schema {
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    #[must_use]
    pub fn node(&self, id: TypeId) -> Option<&TypeNode> {
        self.arena.get(id)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scalar;

    #[test]
    fn constructor_renders_argument_and_return_lists() {
        let ctor = Constructor {
            function: "newRecur".to_string(),
            params: vec![
                ConstructorParam {
                    name: "foo".to_string(),
                    ty: TypeRef::Scalar(Scalar::Text),
                },
                ConstructorParam {
                    name: "n".to_string(),
                    ty: TypeRef::Scalar(Scalar::Int),
                },
            ],
            returns: vec![
                ConstructorReturn {
                    ty: TypeRef::pointer(TypeRef::named("fixture.Recur")),
                    role: ReturnRole::Document,
                },
                ConstructorReturn {
                    ty: TypeRef::Scalar(Scalar::Bool),
                    role: ReturnRole::Other,
                },
                ConstructorReturn {
                    ty: TypeRef::Error,
                    role: ReturnRole::Error,
                },
            ],
        };

        assert_eq!(ctor.param_list(), "foo text, n int");
        assert_eq!(ctor.arg_list(), "foo, n");
        assert_eq!(ctor.return_vars(), vec!["doc", "r1", "err"]);
    }
}
