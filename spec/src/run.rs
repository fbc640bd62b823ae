//! Orchestration for a single `run`: discover the tree once, then execute each
//! spec in its own host subtest by replaying the definition.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::{debug, info, instrument, warn};

use crate::core::builder;
use crate::core::options::{Config, Opt};
use crate::core::replay;
use crate::core::tree::{Nest, Node, Order, Plan};
use crate::declare::{G, S};
use crate::host::{Host, Subtest};
use crate::report::SpecReport;

/// Shared, read-only state for every subtest of one run.
struct Context<'a, D: ?Sized> {
    plan: &'a Plan,
    definition: &'a D,
    reports: Option<Sender<SpecReport>>,
}

impl<D: ?Sized> Context<'_, D> {
    fn skips(&self, node: &Node) -> bool {
        node.pending || (self.plan.has_focus && !node.focused)
    }

    fn send(&self, report: SpecReport) {
        if let Some(reports) = &self.reports {
            if reports.send(report).is_err() {
                debug!("reporter stopped receiving");
            }
        }
    }
}

/// Run the specs declared by `definition` as subtests of a subtest named `text`.
///
/// The definition is evaluated once to discover the tree and once more for
/// every spec that is not skipped. Returns `true` when no spec failed.
#[instrument(skip_all, fields(suite = text))]
pub fn run<'env, H, D>(host: &mut H, text: &str, definition: D, opts: &[Opt]) -> bool
where
    H: Host,
    D: Fn(&G<'_, 'env>, &S<'_, 'env>) + Sync,
{
    let cfg = Config::resolve(opts);
    let (root, plan) = builder::build(text, &definition, &cfg);
    info!(
        total = plan.total,
        focused = plan.focused,
        pending = plan.pending,
        seed = plan.seed,
        has_random = plan.has_random,
        has_focus = plan.has_focus,
        "spec tree built"
    );

    let Some(reporter) = cfg.reporter.as_deref() else {
        return execute(host, &root, &plan, &definition, None);
    };
    reporter.start(&plan);
    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        scope.spawn(move || reporter.specs(rx));
        execute(host, &root, &plan, &definition, Some(tx))
    })
}

fn execute<'env, H, D>(
    host: &mut H,
    root: &Node,
    plan: &Plan,
    definition: &D,
    reports: Option<Sender<SpecReport>>,
) -> bool
where
    H: Host,
    D: Fn(&G<'_, 'env>, &S<'_, 'env>) + Sync,
{
    let ctx = Context {
        plan,
        definition,
        reports,
    };
    let ctx = &ctx;
    let suite = Subtest {
        name: root.text.clone(),
        parallel: false,
        body: Box::new(move |t: &mut H| {
            log_plan(t, ctx.plan);
            t.run(subtests(root, ctx, 0));
        }),
    };
    host.run(vec![suite])
}

fn log_plan<H: Host>(t: &mut H, plan: &Plan) {
    t.log(&format!(
        "Total: {} | Focused: {} | Pending: {}",
        plan.total, plan.focused, plan.pending
    ));
    if plan.has_random {
        t.log(&format!("Random seed: {}", plan.seed));
    }
    if plan.has_focus {
        t.log("Focus is active.");
    }
}

/// Subtests for the children of `group`, in final tree order.
///
/// Flat groups contribute their specs directly; nested groups become one
/// subtest each. Names are the node path below the enclosing subtest, which
/// sits `depth` levels under the run root.
fn subtests<'a, 'env, H, D>(
    group: &'a Node,
    ctx: &'a Context<'a, D>,
    depth: usize,
) -> Vec<Subtest<'a, H>>
where
    H: Host,
    D: Fn(&G<'_, 'env>, &S<'_, 'env>) + Sync,
{
    let mut tests = Vec::new();
    for node in group.children.iter().flatten() {
        let name = node.path[depth..].join("/");
        match &node.children {
            None => tests.push(Subtest {
                name,
                parallel: node.order == Order::Parallel && !ctx.skips(node),
                body: Box::new(move |t: &mut H| run_spec(t, node, ctx)),
            }),
            Some(_) if node.nest == Nest::Nested => tests.push(Subtest {
                name,
                parallel: false,
                body: Box::new(move |t: &mut H| {
                    t.run(subtests(node, ctx, node.path.len()));
                }),
            }),
            Some(_) => tests.extend(subtests(node, ctx, depth)),
        }
    }
    tests
}

fn run_spec<'env, H, D>(t: &mut H, node: &Node, ctx: &Context<'_, D>)
where
    H: Host,
    D: Fn(&G<'_, 'env>, &S<'_, 'env>) + Sync,
{
    let mut report = SpecReport {
        path: node.path.clone(),
        failed: false,
        skipped: false,
        focused: node.focused,
        parallel: node.order == Order::Parallel,
    };

    if ctx.skips(node) {
        t.skip(if node.pending { "pending" } else { "not focused" });
        report.skipped = t.skipped();
        ctx.send(report);
        return;
    }

    // A panicking definition must still produce a report for this spec.
    let located = panic::catch_unwind(AssertUnwindSafe(|| {
        replay::locate(ctx.definition, node)
    }));
    let capture = match located {
        Ok(Ok(capture)) => capture,
        Err(payload) => {
            report.failed = true;
            ctx.send(report);
            panic::resume_unwind(payload);
        }
        Ok(Err(err)) => {
            warn!(path = %node.path.join("/"), error = %err, "spec replay failed");
            t.fail(&format!("{err:#}"));
            report.failed = true;
            ctx.send(report);
            return;
        }
    };

    let outcome = capture.execute();
    report.failed = outcome.is_err() || t.failed();
    ctx.send(report);
    if let Err(payload) = outcome {
        panic::resume_unwind(payload);
    }
}
