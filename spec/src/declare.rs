//! The group (`G`) and spec (`S`) capabilities handed to a definition.
//!
//! The same handles serve both phases. During discovery they record nodes;
//! during replay they walk toward a single leaf and collect its hooks and body.
//! Which behavior applies is decided by the [`Visitor`] behind them.

use std::cell::RefCell;

use crate::core::options::{Config, Hook, Opt};

/// Boxed spec or hook body.
pub type Body<'env> = Box<dyn FnOnce() + 'env>;

/// Phase-specific handling of declarations.
pub(crate) trait Visitor<'env> {
    /// Called when a group is declared. Returns whether its body should run.
    fn group(&mut self, text: &str, cfg: &Config) -> bool;
    /// Called after a group body that `group` asked to run has returned.
    fn end_group(&mut self);
    /// Called for specs and hooks.
    fn spec(&mut self, text: &str, cfg: Config, body: Body<'env>);
}

/// Evaluate `definition` once against `visitor` and hand the visitor back.
pub(crate) fn evaluate<'env, D, V>(definition: &D, visitor: V) -> V
where
    D: Fn(&G<'_, 'env>, &S<'_, 'env>) + ?Sized,
    V: Visitor<'env>,
{
    let cell = RefCell::new(visitor);
    {
        let shared: &RefCell<dyn Visitor<'env> + '_> = &cell;
        definition(&G { visitor: shared }, &S { visitor: shared });
    }
    cell.into_inner()
}

/// Declares groups of specs.
///
/// Group bodies run immediately and are re-run for every spec, so any state
/// created inside them is fresh per spec.
pub struct G<'a, 'env> {
    visitor: &'a RefCell<dyn Visitor<'env> + 'a>,
}

impl<'a, 'env> G<'a, 'env> {
    pub fn group(&self, text: &str, body: impl FnOnce()) {
        self.declare(text, Config::default(), body);
    }

    /// Declare a group with `Parallel`, `Sequential`, `Random`, `Reverse`,
    /// `Local`, `Global`, `Nested` or `Flat`.
    pub fn group_with(&self, text: &str, opts: &[Opt], body: impl FnOnce()) {
        self.declare(text, Config::resolve(opts), body);
    }

    /// Skip every spec in the group.
    pub fn pend(&self, text: &str, body: impl FnOnce()) {
        let cfg = Config {
            pend: true,
            ..Config::default()
        };
        self.declare(text, cfg, body);
    }

    /// Skip every spec outside focused groups and specs.
    pub fn focus(&self, text: &str, body: impl FnOnce()) {
        self.focus_with(text, &[], body);
    }

    pub fn focus_with(&self, text: &str, opts: &[Opt], body: impl FnOnce()) {
        let mut cfg = Config::resolve(opts);
        cfg.focus = true;
        self.declare(text, cfg, body);
    }

    fn declare(&self, text: &str, cfg: Config, body: impl FnOnce()) {
        cfg.note_run_only(text);
        // The borrow must be released before user code runs.
        let enter = self.visitor.borrow_mut().group(text, &cfg);
        if enter {
            body();
            self.visitor.borrow_mut().end_group();
        }
    }
}

/// Declares specs and the hooks that wrap them.
pub struct S<'a, 'env> {
    visitor: &'a RefCell<dyn Visitor<'env> + 'a>,
}

impl<'a, 'env> S<'a, 'env> {
    pub fn spec(&self, text: &str, body: impl FnOnce() + 'env) {
        self.declare(text, Config::default(), body);
    }

    /// Declare a spec; only `Parallel` and `Sequential` have an effect.
    pub fn spec_with(&self, text: &str, opts: &[Opt], body: impl FnOnce() + 'env) {
        self.declare(text, Config::resolve(opts), body);
    }

    /// Run `body` before each spec in the enclosing group, including nested ones.
    pub fn before(&self, body: impl FnOnce() + 'env) {
        let cfg = Config {
            hook: Some(Hook::Before),
            ..Config::default()
        };
        self.declare("", cfg, body);
    }

    /// Run `body` after each spec in the enclosing group, even when it fails.
    pub fn after(&self, body: impl FnOnce() + 'env) {
        let cfg = Config {
            hook: Some(Hook::After),
            ..Config::default()
        };
        self.declare("", cfg, body);
    }

    /// Skip the spec.
    pub fn pend(&self, text: &str, body: impl FnOnce() + 'env) {
        let cfg = Config {
            pend: true,
            ..Config::default()
        };
        self.declare(text, cfg, body);
    }

    /// Skip every spec except focused ones.
    pub fn focus(&self, text: &str, body: impl FnOnce() + 'env) {
        self.focus_with(text, &[], body);
    }

    pub fn focus_with(&self, text: &str, opts: &[Opt], body: impl FnOnce() + 'env) {
        let mut cfg = Config::resolve(opts);
        cfg.focus = true;
        self.declare(text, cfg, body);
    }

    fn declare(&self, text: &str, cfg: Config, body: impl FnOnce() + 'env) {
        cfg.note_run_only(text);
        self.visitor.borrow_mut().spec(text, cfg, Box::new(body));
    }
}
