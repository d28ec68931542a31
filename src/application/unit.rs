//! Executable units: one self-contained, runnable example each.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::application::error::{Site, UnitError};
use crate::domain::{
    Action, BindingStore, ExampleMode, Failure, GroupId, HookChain, SuiteTree, TreePath,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
    /// Ignored example; nothing ran
    Skipped,
}

/// Result of running one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    pub id: String,
    pub description: String,
    pub status: Status,
    /// Every failure, in the order it occurred
    pub errors: Vec<UnitError>,
    /// Hooks and body that were invoked, in order
    pub executed: Vec<Site>,
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        self.status != Status::Failed
    }

    /// First failure, if any. Suited to a host runner's `#[test]` body.
    pub fn into_result(self) -> Result<(), UnitError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Flattened example: identity, composed hook chain and body.
pub struct ExecutableUnit {
    pub path: TreePath,
    /// Path segments joined by the configured separator
    pub id: String,
    pub description: String,
    pub mode: ExampleMode,
    pub chain: HookChain,
    body: Action,
    tree: Arc<SuiteTree>,
    owner: GroupId,
    catch_panics: bool,
}

impl ExecutableUnit {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        path: TreePath,
        id: String,
        description: String,
        mode: ExampleMode,
        chain: HookChain,
        body: Action,
        tree: Arc<SuiteTree>,
        owner: GroupId,
        catch_panics: bool,
    ) -> Self {
        Self {
            path,
            id,
            description,
            mode,
            chain,
            body,
            tree,
            owner,
            catch_panics,
        }
    }

    pub fn owner(&self) -> GroupId {
        self.owner
    }

    pub fn is_ignored(&self) -> bool {
        self.mode == ExampleMode::Ignored
    }

    /// Run before-sequence, body and after-sequence with a fresh binding store.
    ///
    /// A failing before hook skips the remaining befores and the body; only
    /// groups whose setup was entered get their after hooks run. After hooks
    /// always all run, even when one of them fails.
    pub fn run(&self) -> UnitOutcome {
        if self.is_ignored() {
            debug!("skipping ignored unit {}", self.id);
            return self.outcome(Status::Skipped, Vec::new(), Vec::new());
        }

        let mut store = BindingStore::new(Arc::clone(&self.tree), self.owner);
        let mut errors = Vec::new();
        let mut executed = Vec::new();
        let mut entered = usize::MAX;

        for hook in &self.chain.before {
            let site = Site::Hook(hook.id.clone());
            trace!("{}: running {}", self.id, site);
            executed.push(site.clone());
            if let Err(failure) = self.invoke(&hook.action, &mut store) {
                errors.push(UnitError::at(site, failure));
                entered = hook.level;
                break;
            }
        }

        if errors.is_empty() {
            trace!("{}: running body", self.id);
            executed.push(Site::Body);
            let result = self.invoke(&self.body, &mut store);
            if let Some(err) = self.judge_body(result) {
                errors.push(err);
            }
        }

        for hook in self.chain.after_up_to(entered) {
            let site = Site::Hook(hook.id.clone());
            trace!("{}: running {}", self.id, site);
            executed.push(site.clone());
            if let Err(failure) = self.invoke(&hook.action, &mut store) {
                errors.push(UnitError::at(site, failure));
            }
        }

        let status = if errors.is_empty() {
            Status::Passed
        } else {
            warn!("unit {} ({}) failed: {}", self.id, self.description, errors[0]);
            Status::Failed
        };
        self.outcome(status, errors, executed)
    }

    /// Zero-argument invocable for host runner registration.
    pub fn into_test_fn(self) -> impl Fn() -> Result<(), UnitError> + Send + Sync {
        move || self.run().into_result()
    }

    fn judge_body(&self, result: Result<(), Failure>) -> Option<UnitError> {
        match (self.mode, result) {
            (ExampleMode::ExpectFailure, Ok(())) => Some(UnitError::BodyFailure {
                failure: Failure::new("expected the example to fail, but it passed"),
            }),
            (ExampleMode::ExpectFailure, Err(failure)) if failure.bind_name().is_none() => {
                debug!("{}: expected failure observed: {}", self.id, failure);
                None
            }
            (_, Ok(())) => None,
            (_, Err(failure)) => Some(UnitError::at(Site::Body, failure)),
        }
    }

    fn invoke(&self, action: &Action, store: &mut BindingStore) -> Result<(), Failure> {
        if !self.catch_panics {
            return action(store);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| action(store))) {
            Ok(result) => result,
            Err(payload) => Err(Failure::Panic(panic_message(&*payload))),
        }
    }

    fn outcome(&self, status: Status, errors: Vec<UnitError>, executed: Vec<Site>) -> UnitOutcome {
        UnitOutcome {
            id: self.id.clone(),
            description: self.description.clone(),
            status,
            errors,
            executed,
        }
    }
}

impl fmt::Debug for ExecutableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableUnit")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("mode", &self.mode)
            .field("chain", &self.chain)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
