//! BDD-style spec engine layered over a host test runner.
//!
//! A suite is a single definition function that receives a group handle
//! ([`G`]) and a spec handle ([`S`]). The definition is evaluated once to
//! discover the tree, then once more for every spec: the replay walks to that
//! spec by position and runs only its hooks and body, so state set up inside
//! group bodies is fresh for each spec.
//!
//! - **[`core`]**: Pure, deterministic logic (options, tree building, ordering,
//!   replay navigation). No I/O.
//! - **[`host`]**: The runner abstraction specs are submitted to, plus an
//!   in-process implementation.
//! - **[`run`]**: Orchestration tying discovery, subtests, replay and reporting
//!   together.
//!
//! ```
//! use spec::{LocalHost, Opt};
//!
//! let mut host = LocalHost::new();
//! let ok = spec::run(&mut host, "Stack", |when, it| {
//!     it.before(|| {});
//!     when.group("when empty", || {
//!         it.spec("has no top", || assert_eq!(Vec::<i32>::new().last(), None));
//!     });
//! }, &[Opt::Seed(1)]);
//! assert!(ok);
//! ```

pub mod config;
pub mod core;
mod declare;
pub mod host;
pub mod logging;
pub mod report;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::options::{Config, Opt};
pub use crate::core::tree::{Nest, Node, Order, Plan, Scope};
pub use declare::{Body, G, S};
pub use host::{Host, LocalHost, Subtest, TestRecord, TestStatus};
pub use report::{Reporter, SpecReport};
pub use run::run;
