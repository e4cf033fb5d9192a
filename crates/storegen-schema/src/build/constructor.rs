use crate::{
    config::GeneratorConfig,
    error::ConfigError,
    graph::TypeGraph,
    node::{Constructor, ConstructorParam, ConstructorReturn, ReturnRole},
    types::TypeRef,
};
use tracing::debug;

/// Match the conventional `new{Name}` constructor of a model, if declared.
///
/// Returns are classified in order: the document (by value or pointer), the
/// first error, then anything else.
pub fn match_constructor<G: TypeGraph + ?Sized>(
    graph: &G,
    config: &GeneratorConfig,
    model_name: &str,
    model_path: &str,
) -> Result<Option<Constructor>, ConfigError> {
    let name = config.constructor_name(model_name);
    let Some(function) = graph.function(&name) else {
        return Ok(None);
    };

    let mut has_error = false;
    let returns = function
        .results
        .iter()
        .map(|ty| {
            let role = if is_document(ty, model_path) {
                ReturnRole::Document
            } else if ty.is_error() && !has_error {
                has_error = true;
                ReturnRole::Error
            } else {
                ReturnRole::Other
            };

            ConstructorReturn {
                ty: ty.clone(),
                role,
            }
        })
        .collect::<Vec<_>>();

    if !returns.iter().any(|r| r.role == ReturnRole::Document) {
        return Err(ConfigError::MalformedConstructor {
            ty: model_path.to_string(),
            function: name,
        });
    }

    let params = function
        .params
        .iter()
        .map(|p| ConstructorParam {
            name: p.name.clone(),
            ty: p.ty.clone(),
        })
        .collect();

    debug!(model = model_name, function = %name, "constructor matched");

    Ok(Some(Constructor {
        function: name,
        params,
        returns,
    }))
}

fn is_document(ty: &TypeRef, model_path: &str) -> bool {
    let target = match ty {
        TypeRef::Pointer(inner) => inner.as_ref(),
        other => other,
    };

    matches!(target, TypeRef::Named(path) if path == model_path)
}

///
/// TESTS
///
