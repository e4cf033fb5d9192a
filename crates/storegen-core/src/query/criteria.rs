use super::FieldPath;
use serde_json::{Map, Value, json};

///
/// Criteria
///
/// Predicate tree over document fields, rendered into the backend's
/// document syntax by [`Criteria::to_document`].
///

#[derive(Clone, Debug, PartialEq)]
pub enum Criteria {
    Field { path: FieldPath, op: FieldOp },
    And(Vec<Self>),
    Or(Vec<Self>),
    Nor(Vec<Self>),
    Not(Box<Self>),
    Text { search: String, language: String },
    Where(String),
    Comment(String),
}

///
/// FieldOp
///

#[derive(Clone, Debug, PartialEq)]
#[remain::sorted]
pub enum FieldOp {
    All(Vec<Value>),
    Eq(Value),
    Exists(bool),
    Gt(Value),
    Gte(Value),
    In(Vec<Value>),
    Lt(Value),
    Lte(Value),
    Mod { divisor: i64, remainder: i64 },
    Ne(Value),
    Nin(Vec<Value>),
    Regex { pattern: String, options: String },
    Size(usize),
    Type(ValueType),
}

impl FieldOp {
    fn to_document(&self) -> Value {
        match self {
            Self::All(values) => json!({ "$all": values }),
            Self::Eq(v) => json!({ "$eq": v }),
            Self::Exists(b) => json!({ "$exists": b }),
            Self::Gt(v) => json!({ "$gt": v }),
            Self::Gte(v) => json!({ "$gte": v }),
            Self::In(values) => json!({ "$in": values }),
            Self::Lt(v) => json!({ "$lt": v }),
            Self::Lte(v) => json!({ "$lte": v }),
            Self::Mod { divisor, remainder } => json!({ "$mod": [divisor, remainder] }),
            Self::Ne(v) => json!({ "$ne": v }),
            Self::Nin(values) => json!({ "$nin": values }),
            Self::Regex { pattern, options } => {
                json!({ "$regex": pattern, "$options": options })
            }
            Self::Size(n) => json!({ "$size": n }),
            Self::Type(ty) => json!({ "$type": *ty as u8 }),
        }
    }
}

///
/// ValueType
///
/// Stored value type codes accepted by `$type`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ValueType {
    Double = 1,
    String = 2,
    Object = 3,
    Array = 4,
    Binary = 5,
    ObjectId = 7,
    Boolean = 8,
    Date = 9,
    Null = 10,
    Regex = 11,
    Int32 = 16,
    Timestamp = 17,
    Int64 = 18,
}

impl Criteria {
    #[must_use]
    pub fn to_document(&self) -> Value {
        match self {
            Self::Field { path, op } => {
                let mut map = Map::new();
                map.insert(path.to_string(), op.to_document());
                Value::Object(map)
            }
            Self::And(list) => json!({ "$and": render_all(list) }),
            Self::Or(list) => json!({ "$or": render_all(list) }),
            Self::Nor(list) => json!({ "$nor": render_all(list) }),
            Self::Not(inner) => json!({ "$not": inner.to_document() }),
            Self::Text { search, language } => {
                json!({ "$text": { "$search": search, "$language": language } })
            }
            Self::Where(code) => json!({ "$where": code }),
            Self::Comment(text) => json!({ "$comment": text }),
        }
    }
}

fn render_all(list: &[Criteria]) -> Vec<Value> {
    list.iter().map(Criteria::to_document).collect()
}

fn field(path: impl Into<FieldPath>, op: FieldOp) -> Criteria {
    Criteria::Field {
        path: path.into(),
        op,
    }
}

fn values<I, V>(items: I) -> Vec<Value>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    items.into_iter().map(Into::into).collect()
}

// comparison

pub fn eq(path: impl Into<FieldPath>, value: impl Into<Value>) -> Criteria {
    field(path, FieldOp::Eq(value.into()))
}

pub fn ne(path: impl Into<FieldPath>, value: impl Into<Value>) -> Criteria {
    field(path, FieldOp::Ne(value.into()))
}

pub fn gt(path: impl Into<FieldPath>, value: impl Into<Value>) -> Criteria {
    field(path, FieldOp::Gt(value.into()))
}

pub fn gte(path: impl Into<FieldPath>, value: impl Into<Value>) -> Criteria {
    field(path, FieldOp::Gte(value.into()))
}

pub fn lt(path: impl Into<FieldPath>, value: impl Into<Value>) -> Criteria {
    field(path, FieldOp::Lt(value.into()))
}

pub fn lte(path: impl Into<FieldPath>, value: impl Into<Value>) -> Criteria {
    field(path, FieldOp::Lte(value.into()))
}

pub fn in_<I, V>(path: impl Into<FieldPath>, items: I) -> Criteria
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    field(path, FieldOp::In(values(items)))
}

pub fn nin<I, V>(path: impl Into<FieldPath>, items: I) -> Criteria
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    field(path, FieldOp::Nin(values(items)))
}

// element

pub fn exists(path: impl Into<FieldPath>, present: bool) -> Criteria {
    field(path, FieldOp::Exists(present))
}

pub fn type_(path: impl Into<FieldPath>, ty: ValueType) -> Criteria {
    field(path, FieldOp::Type(ty))
}

// array

pub fn all<I, V>(path: impl Into<FieldPath>, items: I) -> Criteria
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    field(path, FieldOp::All(values(items)))
}

pub fn size(path: impl Into<FieldPath>, count: usize) -> Criteria {
    field(path, FieldOp::Size(count))
}

// evaluation

pub fn modulo(path: impl Into<FieldPath>, divisor: i64, remainder: i64) -> Criteria {
    field(path, FieldOp::Mod { divisor, remainder })
}

pub fn regex(
    path: impl Into<FieldPath>,
    pattern: impl Into<String>,
    options: impl Into<String>,
) -> Criteria {
    field(
        path,
        FieldOp::Regex {
            pattern: pattern.into(),
            options: options.into(),
        },
    )
}

/// Full-text search over the collection's text index.
pub fn text(search: impl Into<String>, language: impl Into<String>) -> Criteria {
    Criteria::Text {
        search: search.into(),
        language: language.into(),
    }
}

pub fn where_(code: impl Into<String>) -> Criteria {
    Criteria::Where(code.into())
}

pub fn comment(text: impl Into<String>) -> Criteria {
    Criteria::Comment(text.into())
}

// logical

#[must_use]
pub const fn and(list: Vec<Criteria>) -> Criteria {
    Criteria::And(list)
}

#[must_use]
pub const fn or(list: Vec<Criteria>) -> Criteria {
    Criteria::Or(list)
}

#[must_use]
pub const fn nor(list: Vec<Criteria>) -> Criteria {
    Criteria::Nor(list)
}

#[must_use]
pub fn not(criteria: Criteria) -> Criteria {
    Criteria::Not(Box::new(criteria))
}

///
/// TESTS
///
