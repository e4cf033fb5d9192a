use crate::TRANSIENT_WIRE_NAME;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

///
/// Tag
///
/// Parsed `key:"value" key2:"value2"` struct tag. Parsing is lenient: a
/// malformed tag keeps whatever pairs were read before the fault.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Tag {
    pairs: BTreeMap<String, String>,
}

impl Tag {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut pairs = BTreeMap::new();
        let mut rest = raw.trim_start();

        while !rest.is_empty() {
            let Some(colon) = rest.find(':') else {
                warn!(tag = raw, "struct tag key without value");
                break;
            };
            let key = &rest[..colon];
            if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == '"') {
                warn!(tag = raw, "malformed struct tag key");
                break;
            }

            let Some(value) = rest[colon + 1..].strip_prefix('"') else {
                warn!(tag = raw, key, "struct tag value is not quoted");
                break;
            };
            let Some(end) = closing_quote(value) else {
                warn!(tag = raw, key, "unterminated struct tag value");
                break;
            };

            pairs
                .entry(key.to_string())
                .or_insert_with(|| value[..end].replace("\\\"", "\""));
            rest = value[end + 1..].trim_start();
        }

        Self { pairs }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// index of the first unescaped quote
fn closing_quote(value: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }

    None
}

///
/// WireTag
///
/// The wire-tag value split into its name and options.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WireTag {
    pub name: Option<String>,
    pub inline: bool,
    pub omit_empty: bool,
}

impl WireTag {
    #[must_use]
    pub fn from_tag(tag: &Tag, key: &str) -> Self {
        let Some(value) = tag.get(key) else {
            return Self::default();
        };

        let mut segments = value.split(',');
        let name = segments
            .next()
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);

        let mut wire = Self {
            name,
            ..Self::default()
        };
        for option in segments {
            match option {
                "inline" => wire.inline = true,
                "omitempty" => wire.omit_empty = true,
                _ => {}
            }
        }

        wire
    }

    /// Wire name for a field, falling back to the lower-cased identifier.
    #[must_use]
    pub fn wire_name(&self, ident: &str) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| ident.to_lowercase())
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.name.as_deref() == Some(TRANSIENT_WIRE_NAME)
    }
}

///
/// TESTS
///
