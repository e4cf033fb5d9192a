use std::collections::{BTreeMap, BTreeSet};
use storegen_schema::{
    node::{TypeArena, TypeId},
    types::{Action, Phase, Scope},
};

///
/// HookReach
///
/// Per-traversal memo of whether any type reachable from a given type
/// (itself included) declares a document hook for the requested pair.
///

pub struct HookReach<'a> {
    arena: &'a TypeArena,
    phase: Phase,
    action: Action,
    memo: BTreeMap<TypeId, bool>,
}

impl<'a> HookReach<'a> {
    pub const fn new(arena: &'a TypeArena, phase: Phase, action: Action) -> Self {
        Self {
            arena,
            phase,
            action,
            memo: BTreeMap::new(),
        }
    }

    pub fn has_hooks(&self, ty: TypeId) -> bool {
        self.arena.get(ty).is_some_and(|node| {
            node.hooks
                .matching(self.phase, self.action, Scope::Document)
                .next()
                .is_some()
        })
    }

    pub fn reaches(&mut self, ty: TypeId) -> bool {
        if let Some(known) = self.memo.get(&ty) {
            return *known;
        }

        let mut seen = BTreeSet::from([ty]);
        let mut pending = vec![ty];
        let mut found = false;

        while let Some(current) = pending.pop() {
            if self.memo.get(&current) == Some(&true) || self.has_hooks(current) {
                found = true;
                break;
            }

            let Some(node) = self.arena.get(current) else {
                continue;
            };
            for next in node.members.iter().filter_map(|m| m.element.type_id()) {
                if self.memo.get(&next) != Some(&false) && seen.insert(next) {
                    pending.push(next);
                }
            }
        }

        self.memo.insert(ty, found);
        found
    }
}
