use derive_more::{Deref, Display};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::Value;
use ulid::Ulid;

///
/// DocumentId
///
/// Identity stored under `_id`. Encoded as its canonical ULID string.
///

#[derive(Clone, Copy, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct DocumentId(Ulid);

impl DocumentId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    pub fn parse(encoded: &str) -> Result<Self, ulid::DecodeError> {
        Ulid::from_string(encoded).map(Self)
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Self::String(id.to_string())
    }
}

impl Serialize for DocumentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;

        Self::parse(&encoded).map_err(|_| serde::de::Error::custom("invalid document id"))
    }
}

///
/// Document
///
/// A persistable record. `is_new` tracks whether the value has been
/// written or loaded yet; stores flip it and refuse mismatched writes.
///

pub trait Document: Serialize + DeserializeOwned {
    fn id(&self) -> Option<DocumentId>;

    fn set_id(&mut self, id: Option<DocumentId>);

    fn is_new(&self) -> bool;

    fn set_is_new(&mut self, is_new: bool);
}

///
/// DocumentBase
///
/// Embeddable identity and new-state for generated documents. Fresh
/// values are new; deserialized values are not.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DocumentBase {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    #[serde(skip)]
    is_new: bool,
}

impl DocumentBase {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            id: None,
            is_new: true,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<DocumentId> {
        self.id
    }

    pub const fn set_id(&mut self, id: Option<DocumentId>) {
        self.id = id;
    }

    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    pub const fn set_is_new(&mut self, is_new: bool) {
        self.is_new = is_new;
    }
}

impl Default for DocumentBase {
    fn default() -> Self {
        Self::new()
    }
}

///
/// TESTS
///
