//! Reporter interface for observing a run.
//!
//! The engine produces a [`Plan`] before any spec runs and one [`SpecReport`]
//! per spec as it completes. Formatting is entirely up to the reporter.

use std::sync::mpsc::Receiver;

use serde::Serialize;

use crate::core::tree::Plan;

/// Outcome of one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecReport {
    /// Display path from the run root (exclusive) to the spec.
    pub path: Vec<String>,
    pub failed: bool,
    pub skipped: bool,
    pub focused: bool,
    pub parallel: bool,
}

/// Observer attached with [`Opt::Report`](crate::Opt::Report).
pub trait Reporter: Send + Sync {
    /// Called once, before any spec runs.
    fn start(&self, plan: &Plan);

    /// Called once on a dedicated thread. The channel yields one report per
    /// spec in completion order and closes when the run ends.
    fn specs(&self, specs: Receiver<SpecReport>);
}
