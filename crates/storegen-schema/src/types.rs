use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Scalar
///
/// Terminal value kinds a field can resolve to.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum Scalar {
    Bool,
    Bytes,
    Float,
    Id,
    Int,
    Opaque,
    Text,
    Time,
}

impl Scalar {
    /// Lower-case name used in manifests and generated schema leaves.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Float => "float",
            Self::Id => "id",
            Self::Int => "int",
            Self::Opaque => "opaque",
            Self::Text => "text",
            Self::Time => "time",
        }
    }

    // opaque values have no comparable representation on the wire
    #[must_use]
    pub const fn is_findable(self) -> bool {
        !matches!(self, Self::Opaque)
    }
}

///
/// Containment
///
/// How a field holds its element, after peeling every wrapper. Collection
/// wrappers dominate: a pointer to a sequence is a sequence.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Containment {
    #[default]
    Direct,
    Pointer,
    Sequence,
    Map,
}

impl Containment {
    /// Classify a wrapper chain (outermost first).
    #[must_use]
    pub fn classify(wrappers: &[Wrapper]) -> Self {
        wrappers
            .iter()
            .find_map(|w| match w {
                Wrapper::Sequence => Some(Self::Sequence),
                Wrapper::Map => Some(Self::Map),
                Wrapper::Pointer => None,
            })
            .unwrap_or(if wrappers.is_empty() {
                Self::Direct
            } else {
                Self::Pointer
            })
    }

    #[must_use]
    pub const fn is_indirect(self) -> bool {
        !matches!(self, Self::Direct)
    }
}

///
/// Wrapper
///
/// One layer of indirection between a field and its element type.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Wrapper {
    Pointer,
    Sequence,
    Map,
}

impl Wrapper {
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::Sequence | Self::Map)
    }
}

///
/// TypeRef
///
/// Declared type of a field, parameter or result as reported by the type
/// graph. Named references use the provider's stable type path.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Scalar(Scalar),
    Named(String),
    Pointer(Box<Self>),
    Sequence(Box<Self>),
    Map { key: Box<Self>, value: Box<Self> },
    Error,
}

impl TypeRef {
    #[must_use]
    pub fn named(path: impl Into<String>) -> Self {
        Self::Named(path.into())
    }

    #[must_use]
    pub fn pointer(inner: Self) -> Self {
        Self::Pointer(Box::new(inner))
    }

    #[must_use]
    pub fn sequence(inner: Self) -> Self {
        Self::Sequence(Box::new(inner))
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Strip pointer/sequence/map layers, returning them outermost first
    /// together with the terminal reference.
    #[must_use]
    pub fn peel(&self) -> (Vec<Wrapper>, &Self) {
        let mut wrappers = Vec::new();
        let mut current = self;

        loop {
            match current {
                Self::Pointer(inner) => {
                    wrappers.push(Wrapper::Pointer);
                    current = inner;
                }
                Self::Sequence(inner) => {
                    wrappers.push(Wrapper::Sequence);
                    current = inner;
                }
                Self::Map { value, .. } => {
                    wrappers.push(Wrapper::Map);
                    current = value;
                }
                Self::Scalar(_) | Self::Named(_) | Self::Error => return (wrappers, current),
            }
        }
    }

    /// Named path of the terminal type, if any.
    #[must_use]
    pub fn terminal_name(&self) -> Option<&str> {
        match self.peel().1 {
            Self::Named(path) => Some(path),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Whether this is `T` or `*T` for the given simple type name.
    #[must_use]
    pub fn is_value_or_pointer_to(&self, simple_name: &str) -> bool {
        let target = match self {
            Self::Pointer(inner) => inner.as_ref(),
            other => other,
        };

        matches!(target, Self::Named(path) if self::simple_name(path) == simple_name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.write_str(scalar.as_str()),
            Self::Named(path) => f.write_str(path),
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Sequence(inner) => write!(f, "[]{inner}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Last segment of a dotted type path (`pkg.Recur` -> `Recur`).
#[must_use]
pub fn simple_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

///
/// Phase
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub const ALL: [Self; 2] = [Self::Before, Self::After];
}

///
/// Action
///
/// Declaration order is the hook firing order within a phase.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Insert,
    Update,
    Save,
}

impl Action {
    pub const ALL: [Self; 3] = [Self::Insert, Self::Update, Self::Save];

    /// Whether a hook declared for `self` fires when `requested` runs.
    /// Save hooks fire for every write.
    #[must_use]
    pub fn fires_for(self, requested: Self) -> bool {
        self == requested || self == Self::Save
    }
}

///
/// Scope
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// `Hook() error` on any type reachable from the document.
    Document,
    /// `Hook(*Store) error` on the document root only.
    Store,
}

///
/// TESTS
///
