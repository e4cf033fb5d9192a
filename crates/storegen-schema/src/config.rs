use serde::{Deserialize, Serialize};

///
/// GeneratorConfig
///
/// Naming and tagging conventions the model builder follows. Every field
/// has a default, so an empty JSON object is a valid configuration.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Type path of the embedded marker that makes a record a document.
    pub base_document: String,

    /// Type path of the marker's implementation, also accepted by `Init`.
    pub base_document_impl: String,

    /// Struct tag key carrying the wire name and its options.
    pub wire_tag: String,

    /// Struct tag key on the marker embedding that names the collection.
    pub collection_tag: String,

    /// Expand unexported members as well.
    pub include_private: bool,

    pub store_suffix: String,
    pub query_suffix: String,
    pub result_set_suffix: String,
    pub constructor_prefix: String,
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn store_name(&self, model: &str) -> String {
        format!("{model}{}", self.store_suffix)
    }

    #[must_use]
    pub fn query_name(&self, model: &str) -> String {
        format!("{model}{}", self.query_suffix)
    }

    #[must_use]
    pub fn result_set_name(&self, model: &str) -> String {
        format!("{model}{}", self.result_set_suffix)
    }

    #[must_use]
    pub fn constructor_name(&self, model: &str) -> String {
        format!("{}{model}", self.constructor_prefix)
    }

    /// Whether a type path names the base marker or its implementation.
    #[must_use]
    pub fn is_base_marker(&self, path: &str) -> bool {
        path == self.base_document || path == self.base_document_impl
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_document: "storable.Document".to_string(),
            base_document_impl: "storable.DocumentBase".to_string(),
            wire_tag: "bson".to_string(),
            collection_tag: "collection".to_string(),
            include_private: false,
            store_suffix: "Store".to_string(),
            query_suffix: "Query".to_string(),
            result_set_suffix: "ResultSet".to_string(),
            constructor_prefix: "new".to_string(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let cfg = GeneratorConfig::from_json("{}").unwrap();
        assert_eq!(cfg, GeneratorConfig::default());
        assert_eq!(cfg.store_name("Recur"), "RecurStore");
        assert_eq!(cfg.constructor_name("Recur"), "newRecur");
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg = GeneratorConfig::from_json(r#"{"wire_tag":"json","include_private":true}"#)
            .unwrap();

        assert_eq!(cfg.wire_tag, "json");
        assert!(cfg.include_private);
        assert_eq!(cfg.collection_tag, "collection");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(GeneratorConfig::from_json(r#"{"wire":"json"}"#).is_err());
    }
}
