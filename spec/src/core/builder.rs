//! Discovery phase: evaluate the definition once and record the spec tree.
//!
//! The builder keeps an explicit stack of open groups. A group is sorted and
//! flattened when it closes, then appended to the group below it.

use tracing::debug;

use crate::core::options::Config;
use crate::core::sorter;
use crate::core::tree::{Node, Plan};
use crate::declare::{Body, G, S, Visitor, evaluate};

/// Build context for one discovery pass.
pub struct Builder {
    root: Node,
    open: Vec<Node>,
    plan: Plan,
}

impl Builder {
    pub fn new(root: Node) -> Self {
        let plan = Plan::new(&root);
        Self {
            root,
            open: Vec::new(),
            plan,
        }
    }

    fn top(&self) -> &Node {
        self.open.last().unwrap_or(&self.root)
    }

    fn top_mut(&mut self) -> &mut Node {
        self.open.last_mut().unwrap_or(&mut self.root)
    }

    fn open_group(&mut self, text: &str, cfg: &Config) {
        let node = self.top().child(text, cfg, true);
        self.plan.update(&node);
        self.open.push(node);
    }

    fn close_group(&mut self) {
        let Some(mut node) = self.open.pop() else {
            return;
        };
        sorter::finish(&mut node);
        debug!(
            path = %node.path.join("/"),
            children = node.children.as_ref().map_or(0, Vec::len),
            order = ?node.order,
            scope = ?node.scope,
            "group built"
        );
        self.top_mut().push_child(node);
    }

    fn add_spec(&mut self, text: &str, cfg: &Config) {
        let node = self.top().child(text, cfg, false);
        self.plan.update(&node);
        self.top_mut().push_child(node);
    }

    /// Close anything left open and post-process the root.
    pub fn finish(mut self) -> (Node, Plan) {
        while !self.open.is_empty() {
            self.close_group();
        }
        sorter::finish(&mut self.root);
        (self.root, self.plan)
    }
}

impl<'env> Visitor<'env> for Builder {
    fn group(&mut self, text: &str, cfg: &Config) -> bool {
        self.open_group(text, cfg);
        true
    }

    fn end_group(&mut self) {
        self.close_group();
    }

    fn spec(&mut self, text: &str, cfg: Config, _body: Body<'env>) {
        if cfg.is_hook() {
            return;
        }
        self.add_spec(text, &cfg);
    }
}

/// Discover the spec tree for a run named `text`.
///
/// Returns the post-processed root and the run summary.
pub fn build<'env, D>(text: &str, definition: &D, cfg: &Config) -> (Node, Plan)
where
    D: Fn(&G<'_, 'env>, &S<'_, 'env>) + ?Sized,
{
    let builder = evaluate(definition, Builder::new(Node::root(text, cfg)));
    builder.finish()
}
