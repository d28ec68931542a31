//! Expansion engine
//!
//! Flattens a frozen tree into one executable unit per example. Nothing a
//! test author wrote runs here: hooks, binds and bodies are only referenced.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::error::ApplicationResult;
use crate::config::Settings;
use crate::domain::{assign_names, resolve_chain, GroupId, HookChain, SuiteTree};

use super::unit::ExecutableUnit;

#[derive(Debug, Clone)]
pub struct ExpansionEngine {
    description_separator: String,
    id_separator: String,
    catch_panics: bool,
}

impl Default for ExpansionEngine {
    fn default() -> Self {
        Self::from_valid(&Settings::default())
    }
}

impl ExpansionEngine {
    /// Fails when the id separator could make two paths render to the same id.
    pub fn new(settings: &Settings) -> ApplicationResult<Self> {
        settings.validate()?;
        Ok(Self::from_valid(settings))
    }

    fn from_valid(settings: &Settings) -> Self {
        Self {
            description_separator: settings.description_separator.clone(),
            id_separator: settings.id_separator.clone(),
            catch_panics: settings.catch_panics,
        }
    }

    /// Freeze `tree` and expand it.
    pub fn expand(&self, mut tree: SuiteTree) -> Vec<ExecutableUnit> {
        tree.freeze();
        self.expand_shared(Arc::new(tree))
    }

    /// Expand several top-level blocks, in the order given.
    ///
    /// Each tree is renumbered to its 1-based input position, replacing any
    /// block set with [`SuiteTree::numbered`], so ids never collide across
    /// blocks.
    pub fn expand_all(&self, trees: impl IntoIterator<Item = SuiteTree>) -> Vec<ExecutableUnit> {
        trees
            .into_iter()
            .zip(1u32..)
            .flat_map(|(mut tree, block)| {
                if tree.block() != block {
                    debug!("renumbering block {} to {}", tree.block(), block);
                    tree.renumber(block);
                }
                self.expand(tree)
            })
            .collect()
    }

    /// Expand a tree that is already shared and therefore immutable.
    #[instrument(level = "debug", skip_all, fields(block = tree.block()))]
    pub fn expand_shared(&self, tree: Arc<SuiteTree>) -> Vec<ExecutableUnit> {
        let names = assign_names(&tree, &self.description_separator);
        let mut chains: HashMap<GroupId, HookChain> = HashMap::new();
        let mut units = Vec::with_capacity(names.examples().len());

        for named in names.examples() {
            let owner = named.example.group;
            let Some(example) = tree
                .get(owner)
                .and_then(|node| node.examples.get(named.example.index))
            else {
                continue;
            };
            let chain = chains
                .entry(owner)
                .or_insert_with(|| resolve_chain(&tree, owner, &self.description_separator))
                .clone();

            units.push(ExecutableUnit::new(
                named.path.clone(),
                named.path.join(&self.id_separator),
                named.description.clone(),
                example.mode,
                chain,
                example.body.clone(),
                Arc::clone(&tree),
                owner,
                self.catch_panics,
            ));
        }

        debug!(
            "expanded {} units from {} groups",
            units.len(),
            tree.group_count()
        );
        units
    }
}
