//! Per-example binding store.
//!
//! Values are produced lazily on first `resolve` and cached for the rest of
//! the example. A fresh store is built for every example execution.

use std::any::{type_name, Any};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::arena::{GroupId, SuiteTree};
use crate::domain::entities::Failure;

pub struct BindingStore {
    tree: Arc<SuiteTree>,
    /// Group owning the example; lookups start here
    owner: GroupId,
    values: HashMap<String, Box<dyn Any>>,
    /// Names in the order their producers ran
    produced: Vec<String>,
}

impl BindingStore {
    pub fn new(tree: Arc<SuiteTree>, owner: GroupId) -> Self {
        Self {
            tree,
            owner,
            values: HashMap::new(),
            produced: Vec::new(),
        }
    }

    pub fn owner(&self) -> GroupId {
        self.owner
    }

    /// Resolve `name` to the cached value, running the nearest producer on
    /// first access.
    ///
    /// The returned reference points at the one instance held for this
    /// example, so mutations are seen by later `resolve` calls.
    pub fn resolve<T: Any>(&mut self, name: &str) -> Result<&mut T, Failure> {
        let value = match self.values.entry(name.to_string()) {
            Entry::Occupied(slot) => {
                trace!("bind `{}` served from cache", name);
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                let bind = self
                    .tree
                    .lookup_bind(self.owner, name)
                    .ok_or_else(|| Failure::bind(name, "no bind with this name is in scope"))?;
                debug!("producing bind `{}`", name);
                let produced = bind
                    .produce()
                    .map_err(|e| Failure::bind(name, e.to_string()))?;
                self.produced.push(name.to_string());
                slot.insert(produced)
            }
        };
        value.downcast_mut::<T>().ok_or_else(|| {
            Failure::bind(name, format!("value is not a `{}`", type_name::<T>()))
        })
    }

    /// Resolve and clone the value.
    pub fn get<T: Any + Clone>(&mut self, name: &str) -> Result<T, Failure> {
        self.resolve::<T>(name).map(|v| v.clone())
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn produced(&self) -> &[String] {
        &self.produced
    }
}

impl fmt::Debug for BindingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingStore")
            .field("owner", &self.owner)
            .field("produced", &self.produced)
            .finish()
    }
}
