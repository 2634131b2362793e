//! Iterative traversals over expression graphs.
//!
//! Traversal strategy
//! - Explicit stack, no recursion, so arbitrarily deep graphs are fine.
//! - Every node is visited at most once even when shared.
//! - The visitor decides whether the children of a node are explored.
//!
//! The bodies of case-split continuations are not part of the graph until instantiated and are
//! never visited.
//!
//! Example: count the nodes of an expression
//! ```
//! use hysym::prelude::*;
//! use hysym::walker::walk;
//!
//! let arena = ExprArena::new();
//! let x = arena.arbitrary(Sort::Bool, Some("x"));
//! let y = arena.arbitrary(Sort::Bool, Some("y"));
//! let both = arena.and(&x, &y).unwrap();
//! let e = arena.or(&both, &arena.not(&x).unwrap()).unwrap();
//! let mut count = 0;
//! walk(&e, |_| {
//!     count += 1;
//!     true
//! });
//! assert_eq!(count, 5); // `x` is shared
//! ```
use std::collections::HashSet;

use smallvec::SmallVec;

use crate::expr::{Expr, ExprId, ExprKind};

/// Pre-order traversal of the unique nodes reachable from `root`. Returning `false` from the
/// visitor skips the children of that node.
pub fn walk<F>(root: &Expr, mut visit: F)
where
    F: FnMut(&Expr) -> bool,
{
    let mut seen: HashSet<ExprId> = HashSet::new();
    let mut stack: SmallVec<[Expr; 16]> = SmallVec::new();
    stack.push(root.clone());

    while let Some(node) = stack.pop() {
        if !seen.insert(node.id()) {
            continue;
        }
        if !visit(&node) {
            continue;
        }
        // Push in reverse so children are visited in operand order.
        for child in node.kind().children().into_iter().rev() {
            if !seen.contains(&child.id()) {
                stack.push(child.clone());
            }
        }
    }
}

/// Number of unique nodes reachable from `root`.
pub fn node_count(root: &Expr) -> usize {
    let mut count = 0;
    walk(root, |_| {
        count += 1;
        true
    });
    count
}

/// Free variable nodes (arbitrary values and argument placeholders), ordered by identity.
pub fn free_variables(root: &Expr) -> Vec<Expr> {
    let mut found = Vec::new();
    walk(root, |node| {
        if matches!(
            node.kind(),
            ExprKind::Arbitrary { .. } | ExprKind::Argument { .. }
        ) {
            found.push(node.clone());
        }
        true
    });
    found.sort();
    found
}

/// Arbitrary value nodes only, ordered by identity.
pub fn arbitraries(root: &Expr) -> Vec<Expr> {
    let mut found = free_variables(root);
    found.retain(|node| node.kind().is_arbitrary());
    found
}

/// Distinct `if` guards reachable from `root`. Case-split emptiness tests are not included.
pub fn guards(root: &Expr) -> Vec<Expr> {
    let mut found = Vec::new();
    walk(root, |node| {
        if let ExprKind::If { guard, .. } = node.kind() {
            found.push(guard.clone());
        }
        true
    });
    found.sort();
    found.dedup();
    found
}
