//! Host test-runner abstraction.
//!
//! The [`Host`] trait decouples spec execution from the runner that actually
//! creates subtests, marks them parallel and records skips and failures.
//! [`LocalHost`] is an in-process implementation used by the crate's own tests
//! and by callers that have no other runner.

mod local;

pub use local::{LocalHost, TestRecord, TestStatus};

/// A named unit of work submitted to a host.
pub struct Subtest<'a, H: ?Sized> {
    pub name: String,
    /// The host may defer this subtest until its non-parallel siblings finish
    /// and run it concurrently with other parallel siblings.
    pub parallel: bool,
    pub body: Box<dyn FnOnce(&mut H) + Send + 'a>,
}

/// Primitives the engine needs from a test runner.
///
/// A panic inside a subtest body is that subtest's failure signal.
pub trait Host {
    /// Run `tests` as children of the current test, in submission order.
    ///
    /// Every subtest has completed when this returns. Returns `true` when none
    /// of them failed.
    fn run(&mut self, tests: Vec<Subtest<'_, Self>>) -> bool;

    /// Mark the current test as skipped. The caller stops working on it.
    fn skip(&mut self, reason: &str);

    /// Mark the current test as failed without unwinding.
    fn fail(&mut self, message: &str);

    fn log(&mut self, message: &str);

    fn failed(&self) -> bool;

    fn skipped(&self) -> bool;
}
