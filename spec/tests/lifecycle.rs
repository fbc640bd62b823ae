//! End-to-end runs through [`LocalHost`]: subtest naming, hooks, skipping,
//! parallelism, reporting and replay failures.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Barrier, Mutex};

use spec::test_support::{CollectingReporter, Recorder};
use spec::{LocalHost, Opt, TestRecord, TestStatus};

fn statuses(records: &[TestRecord]) -> Vec<(&str, TestStatus)> {
    records
        .iter()
        .map(|record| (record.name.as_str(), record.status))
        .collect()
}

fn record<'r>(records: &'r [TestRecord], name: &str) -> &'r TestRecord {
    records
        .iter()
        .find(|record| record.name == name)
        .unwrap_or_else(|| panic!("no record {name} in {records:?}"))
}

#[test]
fn runs_every_spec_as_a_subtest_of_the_suite() {
    spec::logging::init();
    let rec = Recorder::new();
    let mut host = LocalHost::new();

    let ok = spec::run(
        &mut host,
        "Suite",
        |when, it| {
            when.group("A", || {
                it.spec("1", rec.record("A.1"));
                it.spec("2", rec.record("A.2"));
            });
        },
        &[Opt::Seed(1)],
    );

    assert!(ok);
    assert_eq!(rec.calls(), vec!["A.1", "A.2"]);
    let records = host.records();
    assert_eq!(statuses(&records), vec![
        ("Suite/A/1", TestStatus::Passed),
        ("Suite/A/2", TestStatus::Passed),
        ("Suite", TestStatus::Passed),
    ]);
    assert_eq!(record(&records, "Suite").logs, vec![
        "Total: 2 | Focused: 0 | Pending: 0"
    ]);
}

#[test]
fn group_state_is_fresh_for_every_spec() {
    let mut host = LocalHost::new();

    let ok = spec::run(
        &mut host,
        "Suite",
        |when, it| {
            when.group("counter", || {
                let count = Rc::new(Cell::new(0));
                it.before({
                    let count = Rc::clone(&count);
                    move || count.set(count.get() + 1)
                });
                for name in ["first", "second", "third"] {
                    let count = Rc::clone(&count);
                    it.spec(name, move || assert_eq!(count.get(), 1));
                }
            });
        },
        &[Opt::Seed(1)],
    );

    assert!(ok, "{:?}", host.records());
}

#[test]
fn hooks_wrap_specs_from_every_enclosing_group() {
    let rec = Recorder::new();
    let mut host = LocalHost::new();

    spec::run(
        &mut host,
        "Suite",
        |when, it| {
            it.before(rec.record("outer.before"));
            it.after(rec.record("outer.after"));
            when.group("inner", || {
                it.before(rec.record("inner.before"));
                it.after(rec.record("inner.after"));
                it.spec("s", rec.record("s"));
            });
            it.spec("top", rec.record("top"));
        },
        &[Opt::Seed(1)],
    );

    assert_eq!(rec.calls(), vec![
        "outer.before",
        "inner.before",
        "s",
        "inner.after",
        "outer.after",
        "outer.before",
        "top",
        "outer.after",
    ]);
}

#[test]
fn failing_spec_still_runs_after_hooks_and_spares_siblings() {
    let rec = Recorder::new();
    let mut host = LocalHost::new();

    let ok = spec::run(
        &mut host,
        "Suite",
        |_, it| {
            it.after(rec.record("cleanup"));
            it.spec("broken", || panic!("expected failure"));
            it.spec("fine", rec.record("fine"));
        },
        &[Opt::Seed(1)],
    );

    assert!(!ok);
    assert_eq!(rec.calls(), vec!["cleanup", "fine", "cleanup"]);
    let records = host.records();
    assert_eq!(statuses(&records), vec![
        ("Suite/broken", TestStatus::Failed),
        ("Suite/fine", TestStatus::Passed),
        ("Suite", TestStatus::Failed),
    ]);
    assert!(
        record(&records, "Suite/broken")
            .logs
            .iter()
            .any(|log| log.contains("expected failure"))
    );
}

#[test]
fn focus_skips_everything_else() {
    let rec = Recorder::new();
    let mut host = LocalHost::new();

    let ok = spec::run(
        &mut host,
        "Suite",
        |when, it| {
            it.before(rec.record("root.before"));
            it.spec("plain", rec.record("plain"));
            it.focus("chosen", rec.record("chosen"));
            when.focus("area", || {
                it.after(rec.record("area.after"));
                it.spec("inside", rec.record("inside"));
            });
        },
        &[Opt::Seed(1)],
    );

    assert!(ok);
    assert_eq!(rec.calls(), vec![
        "root.before",
        "chosen",
        "root.before",
        "inside",
        "area.after",
    ]);
    let records = host.records();
    assert_eq!(record(&records, "Suite/plain").status, TestStatus::Skipped);
    assert_eq!(record(&records, "Suite/plain").logs, vec!["skipped: not focused"]);
    assert_eq!(record(&records, "Suite").logs, vec![
        "Total: 3 | Focused: 2 | Pending: 0",
        "Focus is active.",
    ]);
}

#[test]
fn pending_specs_are_skipped_and_never_replayed() {
    let rec = Recorder::new();
    let mut host = LocalHost::new();

    let ok = spec::run(
        &mut host,
        "Suite",
        |when, it| {
            when.pend("later", || {
                it.spec("a", rec.record("later.a"));
                it.focus("b", rec.record("later.b"));
            });
            it.pend("todo", rec.record("todo"));
            it.spec("now", rec.record("now"));
        },
        &[Opt::Seed(1)],
    );

    assert!(ok);
    assert_eq!(rec.calls(), vec!["now"]);
    let records = host.records();
    assert_eq!(statuses(&records), vec![
        ("Suite/later/a", TestStatus::Skipped),
        ("Suite/later/b", TestStatus::Skipped),
        ("Suite/todo", TestStatus::Skipped),
        ("Suite/now", TestStatus::Passed),
        ("Suite", TestStatus::Passed),
    ]);
    assert_eq!(record(&records, "Suite/todo").logs, vec!["skipped: pending"]);
}

#[test]
fn random_runs_log_the_seed() {
    let mut host = LocalHost::new();
    spec::run(
        &mut host,
        "Suite",
        |_, it| it.spec("only", || {}),
        &[Opt::Random, Opt::Seed(77)],
    );

    let records = host.records();
    assert_eq!(record(&records, "Suite").logs, vec![
        "Total: 1 | Focused: 0 | Pending: 0",
        "Random seed: 77",
    ]);
}

#[test]
fn parallel_specs_run_concurrently_after_sequential_siblings() {
    let barrier = Barrier::new(2);
    let order = Mutex::new(Vec::new());
    let (shared_barrier, shared_order) = (&barrier, &order);
    let mut host = LocalHost::new();

    let ok = spec::run(
        &mut host,
        "Suite",
        |when, it| {
            when.group_with("par", &[Opt::Parallel], || {
                for name in ["p1", "p2"] {
                    it.spec(name, move || {
                        shared_barrier.wait();
                        shared_order.lock().expect("lock").push(name);
                    });
                }
                it.spec_with("serial", &[Opt::Sequential], move || {
                    shared_order.lock().expect("lock").push("serial");
                });
            });
        },
        &[Opt::Seed(1)],
    );

    assert!(ok, "{:?}", host.records());
    let order = order.into_inner().expect("lock");
    assert_eq!(order.len(), 3);
    assert_eq!(order[0], "serial");
}

#[test]
fn nested_groups_get_their_own_subtests() {
    let mut host = LocalHost::new();

    spec::run(
        &mut host,
        "Suite",
        |when, it| {
            when.group("A", || {
                it.spec("1", || {});
                when.group_with("B", &[Opt::Flat], || it.spec("2", || {}));
            });
        },
        &[Opt::Nested, Opt::Seed(1)],
    );

    let records = host.records();
    let names: Vec<&str> = records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, vec!["Suite/A/1", "Suite/A/B/2", "Suite/A", "Suite"]);
}

#[test]
fn flat_groups_only_prefix_names() {
    let mut host = LocalHost::new();

    spec::run(
        &mut host,
        "Suite",
        |when, it| {
            when.group("A", || {
                when.group_with("B", &[Opt::Nested], || it.spec("1", || {}));
            });
        },
        &[Opt::Seed(1)],
    );

    let records = host.records();
    let names: Vec<&str> = records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, vec!["Suite/A/B/1", "Suite/A/B", "Suite"]);
}

#[test]
fn reporter_sees_the_plan_and_every_spec() {
    let reporter = CollectingReporter::new();
    let mut host = LocalHost::new();

    spec::run(
        &mut host,
        "Suite",
        |when, it| {
            it.spec("pass", || {});
            it.spec("fail", || panic!("expected failure"));
            when.pend("later", || it.spec("skip", || {}));
        },
        &[Opt::Seed(5), Opt::Report(reporter.clone())],
    );

    let plan = reporter.plan().expect("plan");
    assert_eq!(plan.text, "Suite");
    assert_eq!(plan.total, 3);
    assert_eq!(plan.pending, 1);
    assert_eq!(plan.seed, 5);

    let reports: Vec<(String, bool, bool)> = reporter
        .reports()
        .into_iter()
        .map(|report| (report.path.join("/"), report.failed, report.skipped))
        .collect();
    assert_eq!(reports, vec![
        ("pass".to_string(), false, false),
        ("fail".to_string(), true, false),
        ("later/skip".to_string(), false, true),
    ]);
}

#[test]
fn definition_panicking_on_replay_is_still_reported() {
    let evaluations = AtomicUsize::new(0);
    let reporter = CollectingReporter::new();
    let mut host = LocalHost::new();

    let ok = spec::run(
        &mut host,
        "Suite",
        |when, it| {
            when.group("g", || {
                if evaluations.fetch_add(1, Ordering::SeqCst) > 0 {
                    panic!("group body failed on replay");
                }
                it.spec("a", || {});
            });
        },
        &[Opt::Seed(1), Opt::Report(reporter.clone())],
    );

    assert!(!ok);
    assert_eq!(reporter.plan().expect("plan").total, 1);
    let reports: Vec<(String, bool)> = reporter
        .reports()
        .into_iter()
        .map(|report| (report.path.join("/"), report.failed))
        .collect();
    assert_eq!(reports, vec![("g/a".to_string(), true)]);

    let records = host.records();
    let a = record(&records, "Suite/g/a");
    assert_eq!(a.status, TestStatus::Failed);
    assert!(a.logs.iter().any(|log| log.contains("group body failed on replay")));
}

#[test]
fn changing_definition_fails_the_affected_spec() {
    let evaluations = AtomicUsize::new(0);
    let mut host = LocalHost::new();

    let ok = spec::run(
        &mut host,
        "Suite",
        |_, it| {
            it.spec("a", || {});
            if evaluations.fetch_add(1, Ordering::SeqCst) == 0 {
                it.spec("b", || {});
            }
        },
        &[Opt::Seed(1)],
    );

    assert!(!ok);
    let records = host.records();
    assert_eq!(record(&records, "Suite/a").status, TestStatus::Passed);
    let b = record(&records, "Suite/b");
    assert_eq!(b.status, TestStatus::Failed);
    assert!(b.logs.iter().any(|log| log.contains("failed to locate spec")));
}
