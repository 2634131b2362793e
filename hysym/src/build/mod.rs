//! Validated expression constructors.
//!
//! Every constructor is a method on [`ExprArena`](crate::arena::ExprArena): it checks operand
//! sorts, computes the result sort, and interns the node through the simplifier. Contract
//! violations are reported as [`SymError`](crate::error::SymError) from the constructing call.
//!
//! ```
//! use hysym::prelude::*;
//!
//! let arena = ExprArena::new();
//! let x = arena.arbitrary(Sort::Bool, Some("x"));
//! let t = arena.constant(true);
//! assert_eq!(arena.and(&t, &x).unwrap(), x);
//! ```
mod logic;
mod map;
mod numeric;
mod record;
mod seq;

use crate::{error::SymResult, expr::Expr};

fn same_sort(op: &'static str, lhs: &Expr, rhs: &Expr) -> SymResult<()> {
    rhs.sort().expect(op, lhs.sort())
}
