use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// ConfigError
///
/// Fatal problems in the source type graph. Each one is detected while a
/// model is being built and aborts generation for that model only.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[remain::sorted]
pub enum ConfigError {
    #[error("ambiguous model '{name}': declared by {}", .paths.join(", "))]
    AmbiguousModel { name: String, paths: Vec<String> },

    #[error("type '{ty}' contains itself through field '{field}' without indirection")]
    InfiniteSize { ty: String, field: String },

    #[error("model '{ty}' is invalid: {reason}")]
    InvalidModel { ty: String, reason: String },

    #[error("constructor '{function}' for '{ty}' does not return the document type")]
    MalformedConstructor { ty: String, function: String },

    #[error("method '{method}' on '{ty}' looks like a lifecycle hook but {reason}")]
    MalformedHook {
        ty: String,
        method: String,
        reason: String,
    },

    #[error("type '{path}' cannot be resolved by the type graph")]
    UnresolvedType { path: String },
}

impl ConfigError {
    /// Path of the type the error was reported against.
    #[must_use]
    pub fn type_path(&self) -> &str {
        match self {
            Self::AmbiguousModel { name, .. } => name,
            Self::InfiniteSize { ty, .. }
            | Self::InvalidModel { ty, .. }
            | Self::MalformedConstructor { ty, .. }
            | Self::MalformedHook { ty, .. } => ty,
            Self::UnresolvedType { path } => path,
        }
    }
}

///
/// ErrorTree
///
/// Route-keyed collection of validation messages. Routes are type paths or
/// model names so a report can be read per offending declaration.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ErrorTree {
    messages: Vec<String>,
    children: BTreeMap<String, Self>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Record a message at the current level.
    pub fn add(&mut self, message: impl ToString) {
        self.messages.push(message.to_string());
    }

    /// Record a message under a route.
    pub fn add_for(&mut self, route: impl Into<String>, message: impl ToString) {
        self.children
            .entry(route.into())
            .or_default()
            .add(message);
    }

    /// Merge another tree under a route, dropping it if empty.
    pub fn merge_for(&mut self, route: impl Into<String>, other: Self) {
        if other.is_empty() {
            return;
        }

        let child = self.children.entry(route.into()).or_default();
        child.messages.extend(other.messages);
        for (key, tree) in other.children {
            child.merge_for(key, tree);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Number of messages in the whole tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Flatten into `(route, message)` pairs, routes joined with `/`.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, route: &str, out: &mut Vec<(String, String)>) {
        for message in &self.messages {
            out.push((route.to_string(), message.clone()));
        }
        for (key, child) in &self.children {
            let next = if route.is_empty() {
                key.clone()
            } else {
                format!("{route}/{key}")
            };
            child.flatten_into(&next, out);
        }
    }

    /// Convert into a result, `Ok` when nothing was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .flatten()
            .into_iter()
            .map(|(route, message)| {
                if route.is_empty() {
                    message
                } else {
                    format!("{route}: {message}")
                }
            })
            .collect::<Vec<_>>();

        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for ErrorTree {}

impl From<ConfigError> for ErrorTree {
    fn from(err: ConfigError) -> Self {
        let mut tree = Self::new();
        tree.add_for(err.type_path().to_string(), &err);

        tree
    }
}

/// Format a message into an [`ErrorTree`].
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {{
        $errs.add(format!($($arg)*));
    }};
}

///
/// TESTS
///
