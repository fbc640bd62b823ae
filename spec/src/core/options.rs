//! Options accepted by `run`, groups and specs, and their resolution into a
//! [`Config`] record.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::tree::{Nest, Order, Scope};
use crate::report::Reporter;

/// A single option passed to `run`, a group or a spec.
///
/// Options apply in order; a later option wins over an earlier one for the
/// same setting.
#[derive(Clone)]
pub enum Opt {
    /// Run specs in declaration order. This is the default.
    Sequential,
    /// Submit specs as parallel subtests.
    Parallel,
    /// Shuffle children with the run seed.
    Random,
    /// Reverse children.
    Reverse,
    /// Order applies to each subgroup separately. This is the default.
    Local,
    /// Order applies to all descendant specs; subgroups are flattened.
    Global,
    /// Create a host subtest for each group.
    Nested,
    /// Do not create subtests for groups. This is the default.
    Flat,
    /// Random seed for the whole run. Zero means "use the current time".
    /// Only honored by `run`.
    Seed(i64),
    /// Observer for the plan and per-spec outcomes. Only honored by `run`.
    Report(Arc<dyn Reporter>),
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opt::Sequential => f.write_str("Sequential"),
            Opt::Parallel => f.write_str("Parallel"),
            Opt::Random => f.write_str("Random"),
            Opt::Reverse => f.write_str("Reverse"),
            Opt::Local => f.write_str("Local"),
            Opt::Global => f.write_str("Global"),
            Opt::Nested => f.write_str("Nested"),
            Opt::Flat => f.write_str("Flat"),
            Opt::Seed(seed) => f.debug_tuple("Seed").field(seed).finish(),
            Opt::Report(_) => f.write_str("Report(..)"),
        }
    }
}

/// Marks a spec declaration as a hook rather than a runnable spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hook {
    Before,
    After,
}

/// Settings declared at one node, before inheritance.
///
/// `None` means "inherit from the enclosing node", which is distinct from
/// explicitly choosing the default value.
#[derive(Clone, Default)]
pub struct Config {
    pub order: Option<Order>,
    pub scope: Option<Scope>,
    pub nest: Option<Nest>,
    pub seed: Option<i64>,
    pub reporter: Option<Arc<dyn Reporter>>,
    pub pend: bool,
    pub focus: bool,
    pub(crate) hook: Option<Hook>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("order", &self.order)
            .field("scope", &self.scope)
            .field("nest", &self.nest)
            .field("seed", &self.seed)
            .field("reporter", &self.reporter.is_some())
            .field("pend", &self.pend)
            .field("focus", &self.focus)
            .field("hook", &self.hook)
            .finish()
    }
}

impl Config {
    /// Fold `opts` into a fresh record, last write wins per field.
    pub fn resolve(opts: &[Opt]) -> Self {
        opts.iter().fold(Self::default(), Self::apply)
    }

    fn apply(mut self, opt: &Opt) -> Self {
        match opt {
            Opt::Sequential => self.order = Some(Order::Sequential),
            Opt::Parallel => self.order = Some(Order::Parallel),
            Opt::Random => self.order = Some(Order::Random),
            Opt::Reverse => self.order = Some(Order::Reverse),
            Opt::Local => self.scope = Some(Scope::Local),
            Opt::Global => self.scope = Some(Scope::Global),
            Opt::Nested => self.nest = Some(Nest::Nested),
            Opt::Flat => self.nest = Some(Nest::Flat),
            Opt::Seed(seed) => self.seed = Some(*seed),
            Opt::Report(reporter) => self.reporter = Some(Arc::clone(reporter)),
        }
        self
    }

    /// The declared seed, or the current UNIX time when unset or zero.
    pub fn seed_or_now(&self) -> i64 {
        match self.seed {
            Some(seed) if seed != 0 => seed,
            _ => chrono::Utc::now().timestamp(),
        }
    }

    pub(crate) fn is_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// Seed and reporter are run-wide; below the root they are dropped.
    pub(crate) fn note_run_only(&self, text: &str) {
        if self.seed.is_some() || self.reporter.is_some() {
            debug!(text, "seed and report options only apply to run; ignored");
        }
    }
}
