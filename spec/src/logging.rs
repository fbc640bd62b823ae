//! Diagnostics for the engine itself.
//!
//! Discovery, replay failures and finished subtests are emitted as `tracing`
//! events. They are silent until a subscriber is installed. Output meant for
//! the person running the suite (plan summary, skip reasons) goes through
//! [`Host::log`](crate::Host::log) and is unaffected by this module.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Send engine events to stderr, filtered by `RUST_LOG` (`warn` when unset).
///
/// Only the first call in a process installs anything, so each test can call
/// it before running a suite.
///
/// # Example
/// ```bash
/// RUST_LOG=spec::core::builder=debug cargo test --test lifecycle
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
