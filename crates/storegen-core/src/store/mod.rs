//! Persistence backend contract and the typed store generated code wraps.

mod memory;
mod result_set;

pub use memory::{MemoryBackend, MemoryCursor};
pub use result_set::ResultSet;

use crate::{
    document::{Document, DocumentId},
    error::{BoxError, StoreError},
    query::Query,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

///
/// SaveOutcome
///
/// Which write a save performed. Generated code picks the insert or update
/// after-hooks from this value.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Inserted,
    Updated,
}

///
/// Backend
///
/// Document store the generated code runs against. Criteria and updates
/// arrive as rendered documents. `upsert` must report whether an existing
/// document was matched.
///

pub trait Backend {
    type Error: Into<BoxError>;
    type Cursor: Cursor;

    fn insert(&mut self, collection: &str, doc: Value) -> Result<(), Self::Error>;

    /// Replace the first match. Returns `false` if nothing matched.
    fn update(&mut self, collection: &str, criteria: &Value, doc: Value)
    -> Result<bool, Self::Error>;

    fn upsert(
        &mut self,
        collection: &str,
        criteria: &Value,
        doc: Value,
    ) -> Result<SaveOutcome, Self::Error>;

    /// Apply an update operator document (`$set`, `$unset`, ...) to the
    /// first match. Returns `false` if nothing matched.
    fn raw_update(
        &mut self,
        collection: &str,
        criteria: &Value,
        update: &Value,
    ) -> Result<bool, Self::Error>;

    /// Remove every match. Returns the number removed.
    fn remove(&mut self, collection: &str, criteria: &Value) -> Result<usize, Self::Error>;

    fn find(&self, collection: &str, query: &Query) -> Result<Self::Cursor, Self::Error>;
}

///
/// Cursor
///

pub trait Cursor {
    type Error: Into<BoxError>;

    fn next(&mut self) -> Result<Option<Value>, Self::Error>;

    fn close(&mut self) -> Result<(), Self::Error>;
}

///
/// Store
///
/// One collection on a backend. Enforces the document new-state rules
/// that hook dispatch relies on.
///

#[derive(Debug)]
pub struct Store<B> {
    collection: String,
    backend: B,
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B, collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            backend,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Insert a new document, assigning it a fresh identity. A failed
    /// write leaves the document as it was.
    pub fn insert<D: Document>(&mut self, doc: &mut D) -> Result<(), StoreError> {
        if !doc.is_new() {
            return Err(StoreError::NonNewDocument);
        }

        let previous = doc.id();
        let id = DocumentId::generate();
        doc.set_id(Some(id));

        let written = serde_json::to_value(&*doc)
            .map_err(StoreError::from)
            .and_then(|encoded| {
                self.backend
                    .insert(&self.collection, encoded)
                    .map_err(StoreError::backend)
            });
        if let Err(err) = written {
            doc.set_id(previous);
            return Err(err);
        }
        doc.set_is_new(false);

        debug!(collection = %self.collection, %id, "document inserted");

        Ok(())
    }

    /// Replace a stored document by identity.
    pub fn update<D: Document>(&mut self, doc: &D) -> Result<(), StoreError> {
        if doc.is_new() {
            return Err(StoreError::NewDocument);
        }

        let criteria = Self::identity(doc)?;
        let encoded = serde_json::to_value(doc)?;
        let matched = self
            .backend
            .update(&self.collection, &criteria, encoded)
            .map_err(StoreError::backend)?;

        if matched {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    /// Insert a new document or upsert a loaded one. The outcome of an
    /// upsert is whatever the backend reports.
    pub fn save<D: Document>(&mut self, doc: &mut D) -> Result<SaveOutcome, StoreError> {
        if doc.is_new() {
            self.insert(doc)?;
            return Ok(SaveOutcome::Inserted);
        }

        let criteria = Self::identity(doc)?;
        let encoded = serde_json::to_value(&*doc)?;
        let outcome = self
            .backend
            .upsert(&self.collection, &criteria, encoded)
            .map_err(StoreError::backend)?;

        trace!(collection = %self.collection, ?outcome, "document saved");

        Ok(outcome)
    }

    pub fn delete<D: Document>(&mut self, doc: &D) -> Result<(), StoreError> {
        let criteria = Self::identity(doc)?;
        let removed = self
            .backend
            .remove(&self.collection, &criteria)
            .map_err(StoreError::backend)?;

        if removed == 0 {
            Err(StoreError::NotFound)
        } else {
            Ok(())
        }
    }

    pub fn find(&self, query: &Query) -> Result<ResultSet<B::Cursor>, StoreError> {
        let cursor = self
            .backend
            .find(&self.collection, query)
            .map_err(StoreError::backend)?;

        Ok(ResultSet::new(cursor))
    }

    /// Apply a raw update operator document to the first match.
    pub fn raw_update(&mut self, query: &Query, update: &Value) -> Result<(), StoreError> {
        let criteria = Self::raw_criteria(query)?;
        let matched = self
            .backend
            .raw_update(&self.collection, &criteria, update)
            .map_err(StoreError::backend)?;

        if matched {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    /// Remove every match.
    pub fn raw_remove(&mut self, query: &Query) -> Result<usize, StoreError> {
        let criteria = Self::raw_criteria(query)?;

        self.backend
            .remove(&self.collection, &criteria)
            .map_err(StoreError::backend)
    }

    fn raw_criteria(query: &Query) -> Result<Value, StoreError> {
        if query.has_criteria() {
            Ok(query.to_document())
        } else {
            Err(StoreError::EmptyQueryInRaw)
        }
    }

    fn identity<D: Document>(doc: &D) -> Result<Value, StoreError> {
        let id = doc.id().ok_or(StoreError::NotFound)?;

        Ok(Query::find_by_id(id).to_document())
    }
}

///
/// TESTS
///
