use thiserror::Error as ThisError;

/// Boxed error as returned by hooks and backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

///
/// HookError
///
/// Failure of one lifecycle hook call in generated code. `field` is the
/// traversal label of the value the hook ran on (`""` for the document
/// itself, `.` for store hooks).
///

#[derive(Debug, ThisError)]
#[error("error on {field}.{hook}: {cause}")]
pub struct HookError {
    pub hook: String,
    pub field: String,

    #[source]
    pub cause: BoxError,
}

impl HookError {
    pub fn new(hook: impl Into<String>, field: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            hook: hook.into(),
            field: field.into(),
            cause: cause.into(),
        }
    }

    /// Adapter for `map_err` at a generated call site.
    pub fn at<E>(hook: &'static str, field: &'static str) -> impl FnOnce(E) -> Self
    where
        E: Into<BoxError>,
    {
        move |cause| Self::new(hook, field, cause)
    }
}

///
/// StoreError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(BoxError),

    #[error("document could not be encoded: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("empty queries are not allowed on raw operations")]
    EmptyQueryInRaw,

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("cannot update a new document")]
    NewDocument,

    #[error("cannot insert a non-new document")]
    NonNewDocument,

    #[error("document not found")]
    NotFound,

    #[error("cannot close a closed result set")]
    ResultSetClosed,
}

impl StoreError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_error_names_hook_and_field() {
        let err = HookError::new("BeforeSave", ".Things[k0][k1]", "boom");

        assert_eq!(err.to_string(), "error on .Things[k0][k1].BeforeSave: boom");
        assert_eq!(err.hook, "BeforeSave");
        assert_eq!(err.field, ".Things[k0][k1]");
    }

    #[test]
    fn hook_error_adapter_keeps_cause() {
        let result: Result<(), &str> = Err("nope");
        let err = result
            .map_err(HookError::at("AfterInsert", ".R"))
            .unwrap_err();

        assert_eq!(err.cause.to_string(), "nope");

        let store: StoreError = err.into();
        assert!(matches!(store, StoreError::Hook(ref h) if h.hook == "AfterInsert"));
    }
}
