//! Execution phase navigation.
//!
//! For each spec the definition is evaluated again. The spec's address is
//! consumed level by level: siblings before the target are skipped by counting
//! down the head position, groups on the path are entered, and every hook met
//! along the way is kept. Exactly one body is captured per replay.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use anyhow::{Result, anyhow};

use crate::core::options::{Config, Hook};
use crate::core::tree::Node;
use crate::declare::{Body, G, S, Visitor, evaluate};

/// Hooks and body recovered for one spec.
pub struct Capture<'env> {
    before: Vec<Body<'env>>,
    /// Already in execution order (reverse of declaration).
    after: Vec<Body<'env>>,
    spec: Body<'env>,
}

impl<'env> Capture<'env> {
    #[cfg(test)]
    pub(crate) fn hooks(&self) -> (usize, usize) {
        (self.before.len(), self.after.len())
    }

    /// Run before-hooks, the body, then after-hooks.
    ///
    /// After-hooks run on every exit path. The first panic (body before
    /// cleanup) is returned so the caller can re-raise it.
    pub fn execute(self) -> thread::Result<()> {
        let Capture {
            before,
            after,
            spec,
        } = self;
        let body = panic::catch_unwind(AssertUnwindSafe(move || {
            for hook in before {
                hook();
            }
            spec();
        }));
        let cleanup = panic::catch_unwind(AssertUnwindSafe(move || {
            for hook in after {
                hook();
            }
        }));
        body.and(cleanup)
    }
}

struct Replay<'env> {
    remaining: Vec<usize>,
    level: usize,
    /// An entered group closed, so the target path has been fully walked.
    done: bool,
    before: Vec<Body<'env>>,
    after: Vec<Body<'env>>,
    spec: Option<Body<'env>>,
}

impl<'env> Replay<'env> {
    fn new(address: &[usize]) -> Self {
        Self {
            remaining: address.to_vec(),
            level: 0,
            done: false,
            before: Vec::new(),
            after: Vec::new(),
            spec: None,
        }
    }

    fn head(&self) -> Option<usize> {
        self.remaining.get(self.level).copied()
    }

    fn at_last_level(&self) -> bool {
        self.level + 1 >= self.remaining.len()
    }

    fn skip(&mut self) {
        if let Some(head) = self.remaining.get_mut(self.level) {
            *head = head.saturating_sub(1);
        }
    }

    fn into_capture(mut self) -> Option<Capture<'env>> {
        let spec = self.spec?;
        self.after.reverse();
        Some(Capture {
            before: self.before,
            after: self.after,
            spec,
        })
    }
}

impl<'env> Visitor<'env> for Replay<'env> {
    fn group(&mut self, _text: &str, _cfg: &Config) -> bool {
        if self.done {
            return false;
        }
        if self.head() == Some(0) && !self.at_last_level() {
            self.level += 1;
            return true;
        }
        self.skip();
        false
    }

    fn end_group(&mut self) {
        self.done = true;
    }

    fn spec(&mut self, _text: &str, cfg: Config, body: Body<'env>) {
        match cfg.hook {
            Some(Hook::Before) => self.before.push(body),
            Some(Hook::After) => self.after.push(body),
            None if self.spec.is_some() || self.done => {}
            None if !self.at_last_level() || self.head() != Some(0) => self.skip(),
            None => self.spec = Some(body),
        }
    }
}

/// Replay `definition` toward `node` and capture its hooks and body.
///
/// Fails when no body is found at the recorded address, which means the
/// definition declared a different tree than during discovery.
pub fn locate<'env, D>(definition: &D, node: &Node) -> Result<Capture<'env>>
where
    D: Fn(&G<'_, 'env>, &S<'_, 'env>) + ?Sized,
{
    evaluate(definition, Replay::new(&node.address))
        .into_capture()
        .ok_or_else(|| {
            anyhow!(
                "failed to locate spec {:?} at address {:?}",
                node.path.join("/"),
                node.address
            )
        })
}
