//! Post-processing applied to a group once all of its children are built.
//!
//! Children are processed before their parent, so flattening a global group
//! only ever needs to look one level down.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256StarStar;

use crate::core::tree::{Node, Order, Scope};

/// Flatten, then sort, the children of `group`.
pub fn finish(group: &mut Node) {
    level(group);
    sort(group);
}

/// Splice the children of non-local subgroups into a global group.
///
/// Subgroups that explicitly chose `Local` stay as a single opaque child.
pub fn level(group: &mut Node) {
    if group.scope != Scope::Global {
        return;
    }
    let Some(children) = group.children.take() else {
        return;
    };
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        if child.is_group() && child.scope != Scope::Local {
            flat.extend(child.children.into_iter().flatten());
        } else {
            flat.push(child);
        }
    }
    group.children = Some(flat);
}

/// Reorder direct children according to the group's order.
///
/// Random order re-seeds per group from the run seed, so a given seed always
/// yields the same permutations for the whole tree.
pub fn sort(group: &mut Node) {
    let (order, seed) = (group.order, group.seed);
    let Some(children) = group.children.as_mut() else {
        return;
    };
    match order {
        Order::Random => {
            let mut rng = Xoshiro256StarStar::seed_from_u64(seed as u64);
            children.shuffle(&mut rng);
        }
        Order::Reverse => children.reverse(),
        Order::Sequential | Order::Parallel => {}
    }
}
