use crate::{err, error::ErrorTree, node::Schema};
use std::collections::BTreeMap;

const RESERVED_COLLECTION_PREFIX: &str = "system.";

/// Ensure a collection name can be used as-is by the store.
pub fn validate_collection_name(name: &str, errs: &mut ErrorTree) {
    if name.is_empty() {
        err!(errs, "collection name is empty");
    }
    if name.contains('$') || name.contains('\0') {
        err!(errs, "collection name '{name}' contains a reserved character");
    }
    if name.starts_with(RESERVED_COLLECTION_PREFIX) {
        err!(
            errs,
            "collection name '{name}' uses the reserved prefix '{RESERVED_COLLECTION_PREFIX}'"
        );
    }
}

/// Collections are owned by one model, and no model may be named like
/// another model's generated store, query or result set type.
pub fn validate_model_naming(schema: &Schema, errs: &mut ErrorTree) {
    let mut by_collection: BTreeMap<&str, &str> = BTreeMap::new();
    let mut generated: BTreeMap<&str, &str> = BTreeMap::new();

    for model in schema.models.values() {
        if let Some(prev) = by_collection.insert(&model.collection, &model.name) {
            err!(
                errs,
                "duplicate collection '{}' for '{prev}' and '{}'",
                model.collection,
                model.name
            );
        }

        for name in [&model.store_name, &model.query_name, &model.result_set_name] {
            generated.insert(name, &model.name);
        }
    }

    for model in schema.models.values() {
        if let Some(owner) = generated.get(model.name.as_str()) {
            err!(
                errs,
                "model '{}' clashes with a type generated for '{owner}'",
                model.name
            );
        }
    }
}

///
/// TESTS
///
