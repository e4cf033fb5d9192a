//! Hook-dispatch traversal trees.
//!
//! For one model and one `(phase, action)` pair, a traversal tree says where
//! generated code must call lifecycle hooks: which fields to descend into,
//! which nil checks and loops guard each call, and the error-path label a
//! failing hook is reported under.

mod builder;
mod reach;

pub use builder::build_traversal;

use serde::{Deserialize, Serialize};
use storegen_schema::{
    node::{FieldId, HookDescriptor, TypeId},
    types::{Action, Containment, Phase},
};

///
/// TraversalTree
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TraversalTree {
    pub model: String,
    pub phase: Phase,
    pub action: Action,
    pub root: TraversalNode,

    /// Store-scoped hooks of the root, called after the tree with the
    /// store as argument.
    pub store_hooks: Vec<HookCall>,
}

impl TraversalTree {
    /// Whether generated code would call nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store_hooks.is_empty() && self.root.hooks.is_empty() && self.root.children.is_empty()
    }

    /// Every hook call in emission order: node hooks before their children,
    /// store hooks last.
    #[must_use]
    pub fn calls(&self) -> Vec<&HookCall> {
        let mut out = Vec::new();
        self.root.collect_calls(&mut out);
        out.extend(self.store_hooks.iter());

        out
    }

    /// Every loop-back marker, depth first.
    #[must_use]
    pub fn loop_backs(&self) -> Vec<&TraversalNode> {
        let mut out = Vec::new();
        self.root.collect_loops(&mut out);

        out
    }
}

///
/// TraversalNode
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TraversalNode {
    /// `None` for the root.
    pub field: Option<FieldId>,

    /// Declared field name, empty for the root.
    pub name: String,

    pub resolved_type: TypeId,
    pub guards: Vec<Guard>,

    /// Error-path label, e.g. `.Things[k0][k1]`.
    pub label: String,

    pub hooks: Vec<HookCall>,
    pub children: Vec<Self>,
    pub loop_back: Option<LoopBack>,
}

impl TraversalNode {
    #[must_use]
    pub const fn is_loop(&self) -> bool {
        self.loop_back.is_some()
    }

    /// Find a descendant by label.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<&Self> {
        if self.label == label {
            return Some(self);
        }

        self.children.iter().find_map(|child| child.find(label))
    }

    fn collect_calls<'a>(&'a self, out: &mut Vec<&'a HookCall>) {
        out.extend(self.hooks.iter());
        for child in &self.children {
            child.collect_calls(out);
        }
    }

    fn collect_loops<'a>(&'a self, out: &mut Vec<&'a Self>) {
        if self.is_loop() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_loops(out);
        }
    }
}

///
/// Guard
///
/// Wrapper around a node's subtree, outermost first.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    NilCheck,
    Iterate { index: String, kind: Containment },
}

///
/// HookCall
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HookCall {
    pub hook: HookDescriptor,
    pub method: String,

    /// Field path reported in the hook error.
    pub label: String,
}

///
/// LoopBack
///
/// The node re-enters a type already being visited; `depth` indexes the
/// ancestor (0 is the root) whose subtree would repeat.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LoopBack {
    pub depth: usize,
    pub label: String,
    pub ty: TypeId,
}
