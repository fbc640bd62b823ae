//! Discovered spec tree and the run summary derived from it.
//!
//! Nodes carry metadata only. Bodies and hooks are never stored: they are
//! recovered per leaf by replaying the definition (see [`crate::core::replay`]).

use serde::{Deserialize, Serialize};

use crate::core::options::Config;

/// Order in which a group's children are submitted to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Sequential,
    /// Declaration order, but each spec is submitted as a parallel subtest.
    Parallel,
    Random,
    Reverse,
}

/// Whether ordering is confined to a group or merged with its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
    Global,
}

/// Whether a group gets its own host subtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nest {
    Flat,
    Nested,
}

/// One group or spec in the discovered tree.
///
/// Groups have `children: Some(..)`, specs have `children: None`. Every
/// resolved field is fixed when the node is created and never re-derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub text: String,
    /// Display names from the run root (exclusive) down to this node.
    pub path: Vec<String>,
    /// Declaration position at each level, used to navigate during replay.
    pub address: Vec<usize>,
    pub seed: i64,
    pub order: Order,
    pub scope: Scope,
    pub nest: Nest,
    pub pending: bool,
    pub focused: bool,
    pub children: Option<Vec<Node>>,
}

impl Node {
    /// Create the run root from the options passed to `run`.
    ///
    /// A missing or zero seed is replaced by the current time.
    pub fn root(text: &str, cfg: &Config) -> Self {
        Self {
            text: text.to_string(),
            path: Vec::new(),
            address: Vec::new(),
            seed: cfg.seed_or_now(),
            order: cfg.order.unwrap_or(Order::Sequential),
            scope: cfg.scope.unwrap_or(Scope::Local),
            nest: cfg.nest.unwrap_or(Nest::Flat),
            pending: cfg.pend,
            focused: cfg.focus,
            children: Some(Vec::new()),
        }
    }

    /// Resolve a new child declared inside this group.
    ///
    /// The child's address position is the number of siblings declared so far.
    pub fn child(&self, text: &str, cfg: &Config, group: bool) -> Self {
        let mut path = self.path.clone();
        path.push(text.to_string());
        let mut address = self.address.clone();
        address.push(self.children.as_ref().map_or(0, Vec::len));
        Self {
            text: text.to_string(),
            path,
            address,
            seed: self.seed,
            order: cfg.order.unwrap_or(self.order),
            scope: cfg.scope.unwrap_or(self.scope),
            nest: cfg.nest.unwrap_or(self.nest),
            pending: cfg.pend || self.pending,
            focused: cfg.focus || self.focused,
            children: group.then(Vec::new),
        }
    }

    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }

    pub(crate) fn push_child(&mut self, node: Node) {
        if let Some(children) = &mut self.children {
            children.push(node);
        }
    }

    /// All specs below this node, depth-first in final (sorted) order.
    pub fn leaves(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Node>) {
        match &self.children {
            None => out.push(self),
            Some(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

/// Summary of a discovered tree, available before any spec runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Suite name passed to `run`.
    pub text: String,
    pub total: usize,
    pub pending: usize,
    pub focused: usize,
    pub seed: i64,
    /// Some node resolved to random order.
    pub has_random: bool,
    /// Some focused, non-pending node exists; unfocused specs are skipped.
    pub has_focus: bool,
}

impl Plan {
    pub fn new(root: &Node) -> Self {
        let mut plan = Self {
            text: root.text.clone(),
            seed: root.seed,
            ..Self::default()
        };
        plan.update(root);
        plan
    }

    /// Account for a newly created node.
    pub fn update(&mut self, node: &Node) {
        if node.order == Order::Random {
            self.has_random = true;
        }
        let focused = node.focused && !node.pending;
        if focused {
            self.has_focus = true;
        }
        if node.is_group() {
            return;
        }
        self.total += 1;
        if focused {
            self.focused += 1;
        } else if node.pending {
            self.pending += 1;
        }
    }
}
