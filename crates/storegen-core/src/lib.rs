//! Runtime support for generated document stores: the criteria operator
//! layer, query modifiers, document identity, the persistence backend
//! contract, and the errors generated hook dispatch returns.

pub mod document;
pub mod error;
pub mod query;
pub mod store;

pub use error::{HookError, StoreError};

///
/// Prelude
///
/// Vocabulary generated code imports wholesale.
///

pub mod prelude {
    pub use crate::{
        document::{Document, DocumentBase, DocumentId},
        error::{HookError, StoreError},
        query::{self, Criteria, FieldPath, ID_FIELD, MapPath, Query, Select, Sort},
        store::{Backend, Cursor, ResultSet, SaveOutcome, Store},
    };
}
