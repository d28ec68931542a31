//! In-process runner for executable units.
//!
//! Units carry no ordering guarantee relative to each other; the runner
//! only picks how to walk them. Outcomes always come back in declaration
//! order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::Settings;

use super::unit::{ExecutableUnit, Status, UnitOutcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionOrder {
    #[default]
    Declared,
    Reversed,
    /// Rayon's global pool
    Parallel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<UnitOutcome>,
}

impl RunReport {
    fn count(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(Status::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(Status::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(Status::Skipped)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|o| o.status == Status::Failed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Runner {
    order: ExecutionOrder,
}

impl Runner {
    pub fn new(settings: &Settings) -> Self {
        Self::with_order(settings.order)
    }

    pub fn with_order(order: ExecutionOrder) -> Self {
        Self { order }
    }

    /// Run every unit. A failing unit never stops its siblings.
    #[instrument(level = "debug", skip(self, units), fields(order = ?self.order, units = units.len()))]
    pub fn run(&self, units: &[ExecutableUnit]) -> RunReport {
        let outcomes = match self.order {
            ExecutionOrder::Declared => units.iter().map(ExecutableUnit::run).collect(),
            ExecutionOrder::Reversed => {
                let mut outcomes: Vec<_> = units.iter().rev().map(ExecutableUnit::run).collect();
                outcomes.reverse();
                outcomes
            }
            ExecutionOrder::Parallel => units.par_iter().map(ExecutableUnit::run).collect(),
        };

        let report = RunReport { outcomes };
        info!(
            "ran {} units: {} passed, {} failed, {} skipped",
            report.outcomes.len(),
            report.passed(),
            report.failed(),
            report.skipped()
        );
        report
    }
}
