//! Query vocabulary used by generated stores and queries: field paths,
//! criteria, sort and projection modifiers.

mod criteria;

pub use criteria::*;

use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Wire name of the identity field of every document.
pub const ID_FIELD: &str = "_id";

/// Segment standing for "any key" in paths under an associative map.
pub const MAP_KEY: &str = "[map]";

///
/// FieldPath
///
/// Dotted wire path of a queryable field, e.g. `r.foo`.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn id() -> Self {
        Self::new(ID_FIELD)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(path: &FieldPath) -> Self {
        path.clone()
    }
}

///
/// MapPath
///
/// Path under an associative map. Every `[map]` segment is replaced by a
/// concrete key before the path can be queried.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MapPath(String);

impl MapPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn key(&self, key: &str) -> FieldPath {
        FieldPath(self.0.replace(MAP_KEY, key))
    }
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

///
/// Sort
///
/// Ordered sort keys; rendered as `-a,b` for descending `a` then
/// ascending `b`.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Sort(Vec<(FieldPath, Direction)>);

impl Sort {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn asc(mut self, field: impl Into<FieldPath>) -> Self {
        self.0.push((field.into(), Direction::Asc));
        self
    }

    #[must_use]
    pub fn desc(mut self, field: impl Into<FieldPath>) -> Self {
        self.0.push((field.into(), Direction::Desc));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FieldPath, Direction)> {
        self.0.iter()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, dir)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if *dir == Direction::Desc {
                f.write_str("-")?;
            }
            f.write_str(field)?;
        }

        Ok(())
    }
}

///
/// Select
///
/// Projection: fields to include (`1`) or exclude (`0`).
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Select(Vec<(FieldPath, bool)>);

impl Select {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include(mut self, field: impl Into<FieldPath>) -> Self {
        self.0.push((field.into(), true));
        self
    }

    #[must_use]
    pub fn exclude(mut self, field: impl Into<FieldPath>) -> Self {
        self.0.push((field.into(), false));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn to_document(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(field, include)| (field.to_string(), Value::from(u8::from(*include))))
            .collect();

        Value::Object(map)
    }
}

///
/// Query
///
/// Conjunction of criteria plus modifiers. A skip or limit of zero means
/// "not set".
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    criteria: Vec<Criteria>,
    pub sort: Sort,
    pub select: Select,
    pub skip: usize,
    pub limit: usize,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query matching a single document by identity.
    #[must_use]
    pub fn find_by_id(id: impl Into<Value>) -> Self {
        Self::new().filter(eq(ID_FIELD, id))
    }

    /// Query matching any of the given identities.
    pub fn find_by_ids<I, V>(ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new().filter(in_(ID_FIELD, ids))
    }

    #[must_use]
    pub fn filter(mut self, criteria: Criteria) -> Self {
        self.add_criteria(criteria);
        self
    }

    pub fn add_criteria(&mut self, criteria: Criteria) {
        self.criteria.push(criteria);
    }

    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn select(mut self, select: Select) -> Self {
        self.select = select;
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn has_criteria(&self) -> bool {
        !self.criteria.is_empty()
    }

    /// Combined criteria: `None` when empty, the criterion itself when
    /// single, `$and` otherwise.
    #[must_use]
    pub fn criteria(&self) -> Option<Criteria> {
        match self.criteria.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(and(many.to_vec())),
        }
    }

    /// Rendered criteria; an empty query renders as `{}`.
    #[must_use]
    pub fn to_document(&self) -> Value {
        self.criteria()
            .map_or_else(|| Value::Object(Map::new()), |c| c.to_document())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sort_renders_direction_prefix() {
        let sort = Sort::new().desc("a").asc("b.c");

        assert_eq!(sort.to_string(), "-a,b.c");
        assert!(Sort::new().is_empty());
    }

    #[test]
    fn map_path_substitutes_key() {
        let path = MapPath::new("things.[map].name");

        assert_eq!(path.key("bar").as_str(), "things.bar.name");
    }

    #[test]
    fn query_combines_multiple_criteria_with_and() {
        let q = Query::new().filter(eq("foo", "bar"));
        assert_eq!(q.to_document(), json!({"foo": {"$eq": "bar"}}));

        let q = q.filter(gt("n", 3));
        assert_eq!(
            q.to_document(),
            json!({"$and": [{"foo": {"$eq": "bar"}}, {"n": {"$gt": 3}}]})
        );

        assert_eq!(Query::new().to_document(), json!({}));
        assert!(!Query::new().has_criteria());
    }

    #[test]
    fn find_by_ids_uses_in() {
        let q = Query::find_by_ids(["a", "b"]);

        assert_eq!(q.to_document(), json!({"_id": {"$in": ["a", "b"]}}));
    }

    #[test]
    fn select_renders_flags() {
        let select = Select::new().include("foo").exclude(ID_FIELD);

        assert_eq!(select.to_document(), json!({"foo": 1, "_id": 0}));
    }
}
