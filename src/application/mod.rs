//! Application layer: expansion into executable units and running them
//!
//! This layer orchestrates domain logic and owns per-unit outcome reporting.

pub mod error;
pub mod expansion;
pub mod runner;
pub mod unit;

pub use error::{ApplicationError, ApplicationResult, Site, UnitError};
pub use expansion::ExpansionEngine;
pub use runner::{ExecutionOrder, RunReport, Runner};
pub use unit::{ExecutableUnit, Status, UnitOutcome};
