//! Test-only helpers for building nodes and observing runs.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::tree::{Nest, Node, Order, Plan, Scope};
use crate::report::{Reporter, SpecReport};

/// Create a spec node with default fields.
pub fn leaf(text: &str) -> Node {
    Node {
        text: text.to_string(),
        path: vec![text.to_string()],
        address: Vec::new(),
        seed: 0,
        order: Order::Sequential,
        scope: Scope::Local,
        nest: Nest::Flat,
        pending: false,
        focused: false,
        children: None,
    }
}

/// Create a group node with default fields.
pub fn group(text: &str, children: Vec<Node>) -> Node {
    Node {
        children: Some(children),
        ..leaf(text)
    }
}

/// Shared call log; clones append to the same list.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A body that appends `name` when called.
    pub fn record(&self, name: &str) -> impl FnOnce() + Send + 'static {
        let calls = Arc::clone(&self.calls);
        let name = name.to_string();
        move || calls.lock().unwrap_or_else(PoisonError::into_inner).push(name)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Reporter that keeps everything it receives.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    plan: Mutex<Option<Plan>>,
    specs: Mutex<Vec<SpecReport>>,
}

impl CollectingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn plan(&self) -> Option<Plan> {
        self.plan
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reports(&self) -> Vec<SpecReport> {
        self.specs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Reporter for CollectingReporter {
    fn start(&self, plan: &Plan) {
        *self.plan.lock().unwrap_or_else(PoisonError::into_inner) = Some(plan.clone());
    }

    fn specs(&self, specs: Receiver<SpecReport>) {
        for report in specs {
            self.specs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(report);
        }
    }
}
