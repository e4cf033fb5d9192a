use crate::traversal::{
    Guard, HookCall, LoopBack, TraversalNode, TraversalTree, reach::HookReach,
};
use storegen_schema::{
    node::{Element, Field, FieldId, HookSet, Model, Schema, TypeId},
    types::{Action, Containment, Phase, Scope, Wrapper},
};
use tracing::{debug, trace};

/// Label of store-scoped hook failures.
const STORE_HOOK_LABEL: &str = ".";

/// Build the hook-dispatch tree of `model` for one `(phase, action)` pair.
///
/// Insert and update requests also match save hooks. Every call is a pure
/// function of its inputs; the reachability memo lives and dies with it.
#[must_use]
pub fn build_traversal(
    schema: &Schema,
    model: &Model,
    phase: Phase,
    action: Action,
) -> TraversalTree {
    let mut builder = TraversalBuilder {
        schema,
        model,
        phase,
        action,
        reach: HookReach::new(&schema.arena, phase, action),
        stack: Vec::new(),
    };

    let root_hooks = schema.node(model.ty).map(|n| &n.hooks);
    let mut root = TraversalNode {
        field: None,
        name: String::new(),
        resolved_type: model.ty,
        guards: Vec::new(),
        label: String::new(),
        hooks: builder.calls(root_hooks, Scope::Document, ""),
        children: Vec::new(),
        loop_back: None,
    };

    builder.stack.push((model.ty, String::new()));
    root.children = builder.children(model.fields.top_level(), "", 0);
    builder.stack.pop();

    let store_hooks = builder.calls(root_hooks, Scope::Store, STORE_HOOK_LABEL);

    TraversalTree {
        model: model.name.clone(),
        phase,
        action,
        root,
        store_hooks,
    }
}

struct TraversalBuilder<'a> {
    schema: &'a Schema,
    model: &'a Model,
    phase: Phase,
    action: Action,
    reach: HookReach<'a>,

    /// Types being visited from the root down, with their labels.
    stack: Vec<(TypeId, String)>,
}

impl TraversalBuilder<'_> {
    fn calls(&self, hooks: Option<&HookSet>, scope: Scope, label: &str) -> Vec<HookCall> {
        hooks
            .into_iter()
            .flat_map(|set| set.matching(self.phase, self.action, scope))
            .map(|hook| HookCall {
                hook: *hook,
                method: hook.method_name(),
                label: label.to_string(),
            })
            .collect()
    }

    fn children(
        &mut self,
        ids: &[FieldId],
        parent_label: &str,
        next_index: usize,
    ) -> Vec<TraversalNode> {
        let model = self.model;

        ids.iter()
            .filter_map(|id| model.fields.get(*id))
            .filter_map(|field| self.node(field, parent_label, next_index))
            .collect()
    }

    fn node(&mut self, field: &Field, parent_label: &str, next_index: usize) -> Option<TraversalNode> {
        let Element::Type(ty) = field.element else {
            return None;
        };

        let (guards, label, next_index) = guards_and_label(field, parent_label, next_index);

        if let Some(depth) = self.stack.iter().position(|(t, _)| *t == ty) {
            if !self.reach.reaches(ty) {
                trace!(model = %self.model.name, label = %label, "loop without hooks pruned");
                return None;
            }

            debug!(model = %self.model.name, label = %label, "traversal loop-back");
            let ancestor = self.stack[depth].1.clone();

            return Some(TraversalNode {
                field: Some(field.id),
                name: field.name.clone(),
                resolved_type: ty,
                guards,
                label,
                hooks: Vec::new(),
                children: Vec::new(),
                loop_back: Some(LoopBack {
                    depth,
                    label: ancestor,
                    ty,
                }),
            });
        }

        if !self.reach.reaches(ty) {
            trace!(model = %self.model.name, label = %label, "subtree pruned");
            return None;
        }

        let hooks = self.calls(
            self.schema.node(ty).map(|n| &n.hooks),
            Scope::Document,
            &label,
        );

        self.stack.push((ty, label.clone()));
        let children = self.children(&field.children, &label, next_index);
        self.stack.pop();

        if hooks.is_empty() && children.is_empty() {
            return None;
        }

        Some(TraversalNode {
            field: Some(field.id),
            name: field.name.clone(),
            resolved_type: ty,
            guards,
            label,
            hooks,
            children,
            loop_back: None,
        })
    }
}

// One guard per wrapper, outermost first. Collections consume an index
// variable and append it to the label.
fn guards_and_label(
    field: &Field,
    parent_label: &str,
    mut next_index: usize,
) -> (Vec<Guard>, String, usize) {
    let mut label = format!("{parent_label}.{}", field.name);
    let mut guards = Vec::with_capacity(field.wrappers.len());

    for wrapper in &field.wrappers {
        match wrapper {
            Wrapper::Pointer => guards.push(Guard::NilCheck),
            Wrapper::Sequence | Wrapper::Map => {
                let index = format!("k{next_index}");
                next_index += 1;

                label.push('[');
                label.push_str(&index);
                label.push(']');

                let kind = if *wrapper == Wrapper::Map {
                    Containment::Map
                } else {
                    Containment::Sequence
                };
                guards.push(Guard::Iterate { index, kind });
            }
        }
    }

    (guards, label, next_index)
}

///
/// TESTS
///
