//! Hook chain resolution.
//!
//! Before hooks run outermost group first; after hooks run innermost group
//! first. Inside one group, declaration order is kept for both kinds.

use tracing::instrument;

use crate::domain::arena::{GroupId, SuiteTree};
use crate::domain::entities::{Action, HookId, HookKind};

/// One hook placed in a chain.
#[derive(Clone)]
pub struct ResolvedHook {
    pub id: HookId,
    /// Ancestor level of the owning group: 0 is the root
    pub level: usize,
    pub action: Action,
}

impl std::fmt::Debug for ResolvedHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedHook")
            .field("id", &self.id)
            .field("level", &self.level)
            .finish()
    }
}

/// Ordered setup and teardown around one example.
#[derive(Debug, Clone, Default)]
pub struct HookChain {
    pub before: Vec<ResolvedHook>,
    pub after: Vec<ResolvedHook>,
}

impl HookChain {
    /// After hooks owned by groups at or above `level`, innermost first.
    ///
    /// Used when the before sequence stops at `level`: deeper groups never
    /// started setup, so their teardown is skipped.
    pub fn after_up_to(&self, level: usize) -> impl Iterator<Item = &ResolvedHook> {
        self.after.iter().filter(move |hook| hook.level <= level)
    }

    pub fn depth(&self) -> usize {
        self.before
            .iter()
            .chain(self.after.iter())
            .map(|hook| hook.level + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Build the chain for an example owned by `owner`.
#[instrument(level = "debug", skip(tree))]
pub fn resolve_chain(tree: &SuiteTree, owner: GroupId, separator: &str) -> HookChain {
    let ancestors = tree.ancestors(owner);
    let mut chain = HookChain::default();

    for (level, &group) in ancestors.iter().enumerate() {
        let Some(node) = tree.get(group) else { continue };
        let description = tree.full_description(group, separator);
        chain
            .before
            .extend(node.before.iter().enumerate().map(|(i, action)| ResolvedHook {
                id: HookId {
                    group: description.clone(),
                    kind: HookKind::Before,
                    position: i + 1,
                },
                level,
                action: action.clone(),
            }));
    }

    for (level, &group) in ancestors.iter().enumerate().rev() {
        let Some(node) = tree.get(group) else { continue };
        let description = tree.full_description(group, separator);
        chain
            .after
            .extend(node.after.iter().enumerate().map(|(i, action)| ResolvedHook {
                id: HookId {
                    group: description.clone(),
                    kind: HookKind::After,
                    position: i + 1,
                },
                level,
                action: action.clone(),
            }));
    }

    chain
}
