use crate::{
    config::GeneratorConfig,
    error::ConfigError,
    graph::MethodSig,
    node::{HookDescriptor, HookSet},
    types::{Scope, TypeRef, simple_name},
};
use tracing::{debug, trace};

///
/// HookScan
///
/// Result of matching one type's method set against the hook convention.
///

#[derive(Debug, Default)]
pub struct HookScan {
    pub hooks: HookSet,
    pub defects: Vec<ConfigError>,
}

/// Detect lifecycle hooks by name and shape.
///
/// A method counts when its name is `{Before|After}{Insert|Update|Save}` and
/// it returns exactly one error. With no parameters it is a document hook;
/// with a single `*{Name}Store` parameter it is a store hook, recognized only
/// on document roots. Nested types skip every one-parameter form. A root
/// whose single parameter is not its store, or any method with two or more
/// parameters, is a malformed hook.
#[must_use]
pub fn detect_hooks(
    ty: &str,
    methods: &[MethodSig],
    is_root: bool,
    config: &GeneratorConfig,
) -> HookScan {
    let store_name = config.store_name(simple_name(ty));
    let mut scan = HookScan::default();

    for method in methods {
        let Some((phase, action)) = HookDescriptor::parse_method_name(&method.name) else {
            continue;
        };

        if !matches!(method.results.as_slice(), [TypeRef::Error]) {
            trace!(ty, method = %method.name, "hook-like method without a single error result");
            continue;
        }

        let scope = match method.params.as_slice() {
            [] => Scope::Document,
            [_] if !is_root => {
                debug!(ty, method = %method.name, "store hook ignored outside a document root");
                continue;
            }
            [param] if param.is_value_or_pointer_to(&store_name) => Scope::Store,
            params => {
                scan.defects.push(ConfigError::MalformedHook {
                    ty: ty.to_string(),
                    method: method.name.clone(),
                    reason: malformed_reason(params, &store_name),
                });
                continue;
            }
        };

        let hook = HookDescriptor::new(phase, action, scope);
        debug!(ty, hook = %hook, "hook detected");
        scan.hooks.insert(hook);
    }

    scan
}

fn malformed_reason(params: &[TypeRef], store_name: &str) -> String {
    match params {
        [param] => format!("its parameter is '{param}', expected '*{store_name}' or none"),
        _ => format!("takes {} parameters, expected none or one", params.len()),
    }
}

/// Whether the method set declares `Init(<base document>)`.
#[must_use]
pub fn detect_init(methods: &[MethodSig], config: &GeneratorConfig) -> bool {
    methods.iter().any(|method| {
        method.name == "Init"
            && matches!(method.params.as_slice(), [param] if is_base_param(param, config))
    })
}

fn is_base_param(param: &TypeRef, config: &GeneratorConfig) -> bool {
    let target = match param {
        TypeRef::Pointer(inner) => inner.as_ref(),
        other => other,
    };

    matches!(target, TypeRef::Named(path) if config.is_base_marker(path))
}

///
/// TESTS
///
