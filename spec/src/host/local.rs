//! In-process host that records every finished subtest.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use serde::Serialize;
use tracing::debug;

use crate::host::{Host, Subtest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// A finished subtest, named by its `/`-joined path from the top-level host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRecord {
    pub name: String,
    pub status: TestStatus,
    pub logs: Vec<String>,
}

/// Runs subtests on the calling thread, and parallel subtests on scoped
/// threads once their sequential siblings are done.
///
/// Records are appended in completion order and shared by every descendant.
#[derive(Debug, Default)]
pub struct LocalHost {
    name: String,
    failed: bool,
    skipped: bool,
    logs: Vec<String>,
    records: Arc<Mutex<Vec<TestRecord>>>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subtest finished so far, in completion order.
    pub fn records(&self) -> Vec<TestRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    fn child(&self, name: &str) -> Self {
        let name = if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.name, name)
        };
        Self {
            name,
            records: Arc::clone(&self.records),
            ..Self::default()
        }
    }

    fn status(&self) -> TestStatus {
        if self.failed {
            TestStatus::Failed
        } else if self.skipped {
            TestStatus::Skipped
        } else {
            TestStatus::Passed
        }
    }

    fn execute(mut self, body: Box<dyn FnOnce(&mut Self) + Send + '_>) -> bool {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| body(&mut self))) {
            self.failed = true;
            self.logs.push(panic_message(payload.as_ref()));
        }
        let status = self.status();
        debug!(test = %self.name, ?status, "subtest finished");
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(TestRecord {
                name: self.name,
                status,
                logs: self.logs,
            });
        status != TestStatus::Failed
    }
}

impl Host for LocalHost {
    fn run(&mut self, tests: Vec<Subtest<'_, Self>>) -> bool {
        let (parallel, sequential): (Vec<_>, Vec<_>) =
            tests.into_iter().partition(|test| test.parallel);

        let mut ok = true;
        for test in sequential {
            ok &= self.child(&test.name).execute(test.body);
        }

        if !parallel.is_empty() {
            let children: Vec<_> = parallel
                .into_iter()
                .map(|test| (self.child(&test.name), test.body))
                .collect();
            ok &= thread::scope(|scope| {
                let handles: Vec<_> = children
                    .into_iter()
                    .map(|(child, body)| scope.spawn(move || child.execute(body)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or(false))
                    .fold(true, |all, passed| all && passed)
            });
        }

        if !ok {
            self.failed = true;
        }
        ok
    }

    fn skip(&mut self, reason: &str) {
        self.skipped = true;
        self.logs.push(format!("skipped: {reason}"));
    }

    fn fail(&mut self, message: &str) {
        self.failed = true;
        self.logs.push(message.to_string());
    }

    fn log(&mut self, message: &str) {
        self.logs.push(message.to_string());
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn skipped(&self) -> bool {
        self.skipped
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
