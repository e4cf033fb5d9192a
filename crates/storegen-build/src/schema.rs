use serde::{Deserialize, Serialize};
use storegen_schema::{
    node::{Element, FieldId, FieldTree, Model, NodeKind, Schema},
    types::Scalar,
};

///
/// ModelSchema
///
/// Accessor tree of the queryable fields of one model. Generated code turns
/// each leaf into a typed field handle carrying the dotted wire path.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ModelSchema {
    pub struct_name: String,
    pub fields: Vec<SchemaNode>,
}

impl ModelSchema {
    /// Every leaf, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<&SchemaLeaf> {
        let mut out = Vec::new();
        for node in &self.fields {
            node.collect_leaves(&mut out);
        }

        out
    }

    /// Every nested struct, depth first.
    #[must_use]
    pub fn records(&self) -> Vec<&SchemaRecord> {
        let mut out = Vec::new();
        for node in &self.fields {
            node.collect_records(&mut out);
        }

        out
    }
}

///
/// SchemaNode
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaNode {
    Leaf(SchemaLeaf),
    Record(SchemaRecord),
}

impl SchemaNode {
    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a SchemaLeaf>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf),
            Self::Record(record) => {
                for node in &record.fields {
                    node.collect_leaves(out);
                }
            }
        }
    }

    fn collect_records<'a>(&'a self, out: &mut Vec<&'a SchemaRecord>) {
        if let Self::Record(record) = self {
            out.push(record);
            for node in &record.fields {
                node.collect_records(out);
            }
        }
    }
}

///
/// SchemaLeaf
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SchemaLeaf {
    pub name: String,
    pub kind: LeafKind,
    pub path: String,
    pub type_name: String,
}

///
/// LeafKind
///
/// `Map` leaves sit under an associative map; their path holds the key
/// placeholder and generated handles substitute a concrete key.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Field,
    Map,
}

///
/// SchemaRecord
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SchemaRecord {
    pub name: String,
    pub struct_name: String,
    pub fields: Vec<SchemaNode>,

    /// Cut at a cycle; emitted as an empty struct.
    pub truncated: bool,
}

/// Build the accessor tree of a model. Transient and opaque fields are
/// left out.
#[must_use]
pub fn build_schema(schema: &Schema, model: &Model) -> ModelSchema {
    let struct_name = format!("schema{}", model.name);
    let fields = level(schema, &model.fields, model.fields.top_level(), &struct_name);

    ModelSchema {
        struct_name,
        fields,
    }
}

fn level(schema: &Schema, tree: &FieldTree, ids: &[FieldId], prefix: &str) -> Vec<SchemaNode> {
    ids.iter()
        .filter(|id| tree.is_queryable(**id))
        .filter_map(|id| tree.get(*id))
        .filter_map(|field| {
            let scalar = match field.element {
                Element::Scalar(scalar) => scalar,
                Element::Type(ty) => match schema.node(ty).map(|n| n.kind) {
                    Some(NodeKind::Scalar(scalar)) => scalar,
                    Some(NodeKind::Record) => {
                        let struct_name = format!("{prefix}{}", field.name);
                        return Some(SchemaNode::Record(SchemaRecord {
                            name: field.name.clone(),
                            fields: level(schema, tree, &field.children, &struct_name),
                            struct_name,
                            truncated: field.truncated,
                        }));
                    }
                    None => Scalar::Opaque,
                },
            };

            scalar.is_findable().then(|| {
                SchemaNode::Leaf(SchemaLeaf {
                    name: field.name.clone(),
                    kind: if tree.contains_map(field.id) {
                        LeafKind::Map
                    } else {
                        LeafKind::Field
                    },
                    path: tree.path(field.id),
                    type_name: scalar.as_str().to_string(),
                })
            })
        })
        .collect()
}

///
/// TESTS
///
