use crate::{
    query::{Direction, Query},
    store::{Backend, Cursor, SaveOutcome},
};
use serde_json::{Map, Value};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, VecDeque},
};
use thiserror::Error as ThisError;

///
/// MemoryError
///

#[derive(Debug, ThisError)]
pub enum MemoryError {
    #[error("criteria must be a document, got {0}")]
    InvalidCriteria(Value),

    #[error("update must be a document of operators, got {0}")]
    InvalidUpdate(Value),

    #[error("operator '{0}' is not supported by the memory backend")]
    Unsupported(String),
}

///
/// MemoryBackend
///
/// In-process backend for tests of generated code. Understands the
/// logical, comparison, set and `$exists` query operators and the `$set`
/// and `$unset` update operators; anything else is rejected rather than
/// ignored.
///

#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: BTreeMap<String, Vec<Value>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents in a collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, Vec::len)
    }

    fn docs_mut(&mut self, collection: &str) -> &mut Vec<Value> {
        self.collections.entry(collection.to_string()).or_default()
    }
}

impl Backend for MemoryBackend {
    type Error = MemoryError;
    type Cursor = MemoryCursor;

    fn insert(&mut self, collection: &str, doc: Value) -> Result<(), Self::Error> {
        self.docs_mut(collection).push(doc);

        Ok(())
    }

    fn update(&mut self, collection: &str, criteria: &Value, doc: Value) -> Result<bool, Self::Error> {
        for stored in self.docs_mut(collection).iter_mut() {
            if matches(stored, criteria)? {
                *stored = doc;
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn upsert(
        &mut self,
        collection: &str,
        criteria: &Value,
        doc: Value,
    ) -> Result<SaveOutcome, Self::Error> {
        if self.update(collection, criteria, doc.clone())? {
            Ok(SaveOutcome::Updated)
        } else {
            self.insert(collection, doc)?;
            Ok(SaveOutcome::Inserted)
        }
    }

    fn raw_update(
        &mut self,
        collection: &str,
        criteria: &Value,
        update: &Value,
    ) -> Result<bool, Self::Error> {
        let ops = update_ops(update)?;

        for stored in self.docs_mut(collection).iter_mut() {
            if matches(stored, criteria)? {
                let mut updated = stored.clone();
                apply_update(&mut updated, ops)?;
                *stored = updated;

                return Ok(true);
            }
        }

        Ok(false)
    }

    fn remove(&mut self, collection: &str, criteria: &Value) -> Result<usize, Self::Error> {
        let docs = self.docs_mut(collection);
        let hits = docs
            .iter()
            .map(|doc| matches(doc, criteria))
            .collect::<Result<Vec<_>, _>>()?;
        let removed = hits.iter().filter(|hit| **hit).count();

        let mut hits = hits.into_iter();
        docs.retain(|_| !hits.next().unwrap_or(false));

        Ok(removed)
    }

    fn find(&self, collection: &str, query: &Query) -> Result<Self::Cursor, Self::Error> {
        let criteria = query.to_document();
        let mut found = Vec::new();
        for doc in self.collections.get(collection).into_iter().flatten() {
            if matches(doc, &criteria)? {
                found.push(doc.clone());
            }
        }

        if !query.sort.is_empty() {
            found.sort_by(|a, b| {
                for (field, dir) in query.sort.iter() {
                    let ord = compare(lookup(a, field), lookup(b, field)).unwrap_or(Ordering::Equal);
                    let ord = match dir {
                        Direction::Asc => ord,
                        Direction::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let mut docs: VecDeque<Value> = found.into_iter().skip(query.skip).collect();
        if query.limit > 0 {
            docs.truncate(query.limit);
        }

        Ok(MemoryCursor { docs })
    }
}

///
/// MemoryCursor
///

#[derive(Debug)]
pub struct MemoryCursor {
    docs: VecDeque<Value>,
}

impl Cursor for MemoryCursor {
    type Error = MemoryError;

    fn next(&mut self) -> Result<Option<Value>, Self::Error> {
        Ok(self.docs.pop_front())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.docs.clear();

        Ok(())
    }
}

fn matches(doc: &Value, criteria: &Value) -> Result<bool, MemoryError> {
    let Value::Object(clauses) = criteria else {
        return Err(MemoryError::InvalidCriteria(criteria.clone()));
    };

    for (key, arg) in clauses {
        let ok = match key.as_str() {
            "$and" => all_of(doc, arg, |results| results.iter().all(|r| *r))?,
            "$or" => all_of(doc, arg, |results| results.iter().any(|r| *r))?,
            "$nor" => all_of(doc, arg, |results| !results.iter().any(|r| *r))?,
            "$not" => !matches(doc, arg)?,
            op if op.starts_with('$') => return Err(MemoryError::Unsupported(op.to_string())),
            path => field_matches(lookup(doc, path), arg)?,
        };
        if !ok {
            return Ok(false);
        }
    }

    Ok(true)
}

fn all_of(doc: &Value, arg: &Value, fold: impl Fn(&[bool]) -> bool) -> Result<bool, MemoryError> {
    let Value::Array(list) = arg else {
        return Err(MemoryError::InvalidCriteria(arg.clone()));
    };
    let results = list
        .iter()
        .map(|c| matches(doc, c))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(fold(&results))
}

fn field_matches(value: Option<&Value>, ops: &Value) -> Result<bool, MemoryError> {
    let Value::Object(ops) = ops else {
        return Ok(value == Some(ops));
    };

    for (op, arg) in ops {
        let ok = match op.as_str() {
            "$eq" => value == Some(arg),
            "$ne" => value != Some(arg),
            "$gt" => compare(value, Some(arg)) == Some(Ordering::Greater),
            "$gte" => matches!(compare(value, Some(arg)), Some(Ordering::Greater | Ordering::Equal)),
            "$lt" => compare(value, Some(arg)) == Some(Ordering::Less),
            "$lte" => matches!(compare(value, Some(arg)), Some(Ordering::Less | Ordering::Equal)),
            "$in" => set(arg)?.iter().any(|v| Some(v) == value),
            "$nin" => !set(arg)?.iter().any(|v| Some(v) == value),
            "$exists" => value.is_some() == arg.as_bool().unwrap_or(true),
            // read together with `$regex`
            "$options" => true,
            other => return Err(MemoryError::Unsupported(other.to_string())),
        };
        if !ok {
            return Ok(false);
        }
    }

    Ok(true)
}

fn update_ops(update: &Value) -> Result<&Map<String, Value>, MemoryError> {
    let Value::Object(ops) = update else {
        return Err(MemoryError::InvalidUpdate(update.clone()));
    };

    for (op, arg) in ops {
        match op.as_str() {
            "$set" | "$unset" if arg.is_object() => {}
            "$set" | "$unset" => return Err(MemoryError::InvalidUpdate(update.clone())),
            other if other.starts_with('$') => {
                return Err(MemoryError::Unsupported(other.to_string()));
            }
            _ => return Err(MemoryError::InvalidUpdate(update.clone())),
        }
    }

    Ok(ops)
}

fn apply_update(doc: &mut Value, ops: &Map<String, Value>) -> Result<(), MemoryError> {
    for (op, fields) in ops {
        for (path, value) in fields.as_object().into_iter().flatten() {
            if op == "$set" {
                set_path(doc, path, value.clone())?;
            } else {
                unset_path(doc, path);
            }
        }
    }

    Ok(())
}

fn set_path(doc: &mut Value, path: &str, value: Value) -> Result<(), MemoryError> {
    let Value::Object(map) = doc else {
        return Err(MemoryError::InvalidUpdate(doc.clone()));
    };

    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
            Ok(())
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_path(child, rest, value)
        }
    }
}

fn unset_path(doc: &mut Value, path: &str) {
    let Value::Object(map) = doc else {
        return;
    };

    match path.split_once('.') {
        None => {
            map.remove(path);
        }
        Some((head, rest)) => {
            if let Some(child) = map.get_mut(head) {
                unset_path(child, rest);
            }
        }
    }
}

fn set(arg: &Value) -> Result<&[Value], MemoryError> {
    arg.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| MemoryError::InvalidCriteria(arg.clone()))
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
        _ => None,
    })
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    match (a?, b?) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

///
/// TESTS
///
