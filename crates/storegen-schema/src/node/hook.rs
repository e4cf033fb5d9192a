use crate::types::{Action, Phase, Scope};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

///
/// HookDescriptor
///
/// One lifecycle hook a type implements. Ordering follows phase, then the
/// action enumeration, so insert/update hooks sort ahead of save hooks.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HookDescriptor {
    pub phase: Phase,
    pub action: Action,
    pub scope: Scope,
}

impl HookDescriptor {
    #[must_use]
    pub const fn new(phase: Phase, action: Action, scope: Scope) -> Self {
        Self {
            phase,
            action,
            scope,
        }
    }

    /// Conventional method name, e.g. `BeforeInsert`.
    #[must_use]
    pub fn method_name(&self) -> String {
        format!("{}{}", self.phase, self.action)
    }

    /// Split a method name into its phase and action, if it follows the
    /// `{Before|After}{Insert|Update|Save}` convention.
    #[must_use]
    pub fn parse_method_name(name: &str) -> Option<(Phase, Action)> {
        let (phase, rest) = if let Some(rest) = name.strip_prefix("Before") {
            (Phase::Before, rest)
        } else if let Some(rest) = name.strip_prefix("After") {
            (Phase::After, rest)
        } else {
            return None;
        };

        let action = match rest {
            "Insert" => Action::Insert,
            "Update" => Action::Update,
            "Save" => Action::Save,
            _ => return None,
        };

        Some((phase, action))
    }

    /// Whether this hook fires when generating `(phase, action)`.
    #[must_use]
    pub fn fires_for(&self, phase: Phase, action: Action) -> bool {
        self.phase == phase && self.action.fires_for(action)
    }
}

impl fmt::Display for HookDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.method_name(), self.scope)
    }
}

///
/// HookSet
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HookSet(BTreeSet<HookDescriptor>);

impl HookSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, hook: HookDescriptor) -> bool {
        self.0.insert(hook)
    }

    #[must_use]
    pub fn contains(&self, hook: &HookDescriptor) -> bool {
        self.0.contains(hook)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HookDescriptor> {
        self.0.iter()
    }

    /// Hooks of one scope that fire for `(phase, action)`, in firing order.
    pub fn matching(
        &self,
        phase: Phase,
        action: Action,
        scope: Scope,
    ) -> impl Iterator<Item = &HookDescriptor> {
        self.0
            .iter()
            .filter(move |hook| hook.scope == scope && hook.fires_for(phase, action))
    }
}

impl FromIterator<HookDescriptor> for HookSet {
    fn from_iter<I: IntoIterator<Item = HookDescriptor>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip() {
        for phase in Phase::ALL {
            for action in Action::ALL {
                let hook = HookDescriptor::new(phase, action, Scope::Document);
                assert_eq!(
                    HookDescriptor::parse_method_name(&hook.method_name()),
                    Some((phase, action))
                );
            }
        }

        assert_eq!(HookDescriptor::parse_method_name("BeforeDelete"), None);
        assert_eq!(HookDescriptor::parse_method_name("Save"), None);
    }

    #[test]
    fn insert_sorts_before_save() {
        let set: HookSet = [
            HookDescriptor::new(Phase::Before, Action::Save, Scope::Document),
            HookDescriptor::new(Phase::Before, Action::Insert, Scope::Document),
        ]
        .into_iter()
        .collect();

        let names: Vec<_> = set
            .matching(Phase::Before, Action::Insert, Scope::Document)
            .map(HookDescriptor::method_name)
            .collect();
        assert_eq!(names, vec!["BeforeInsert", "BeforeSave"]);

        let update: Vec<_> = set
            .matching(Phase::Before, Action::Update, Scope::Document)
            .map(HookDescriptor::method_name)
            .collect();
        assert_eq!(update, vec!["BeforeSave"]);
    }
}
