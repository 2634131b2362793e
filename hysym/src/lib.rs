//! Hysym: hash-consed symbolic expressions with three ways to run them.
//!
//! A program is an expression graph built once through an [`ExprArena`](arena::ExprArena).
//! Construction interns every node and simplifies it on the fly, so equal shapes share one
//! node and trivial redundancy never materialises. The graph can then be
//!  - interpreted ([`interpreter`]),
//!  - compiled into a reusable closure over a slot frame ([`compiler`]), with case splits over
//!    sequences unrolled to a bounded depth and interpreted beyond it,
//!  - searched for inputs satisfying a property through a solver backend ([`solver`]).
//!
//! Typed wrappers ([`function::Function0`] to [`function::Function4`]) tie these together
//! for Rust callers.
//!
//! Example
//! ```
//! use hysym::prelude::*;
//!
//! let arena = ExprArena::new();
//! // f(x) = if x >= 10 then x - 10 else x
//! let f = Function1::<i64, i64>::new(&arena, |arena, x| {
//!     let ten = arena.constant(10i64.into_value());
//!     let big = arena.geq(x, &ten)?;
//!     let lowered = arena.sub(x, &ten)?;
//!     arena.ite(&big, &lowered, x)
//! })
//! .unwrap();
//! assert_eq!(f.evaluate(15).unwrap(), 5);
//! f.compile().unwrap();
//! assert_eq!(f.evaluate(5).unwrap(), 5);
//! ```

/// Interning arena and its configuration.
pub mod arena;
/// Validated constructors, one file per operation family.
mod build;
/// Closure compiler with bounded unrolling.
pub mod compiler;
pub mod error;
/// Expression nodes, variants and pretty printing.
pub mod expr;
/// Typed function wrappers and the Rust value bridge.
pub mod function;
/// Tree-walking evaluator.
pub mod interpreter;
/// Value-level meaning of every operation, shared by all evaluators.
pub mod semantics;
/// Construction-time rewrite rules.
mod simplify;
/// Solver, type generator and input generator interfaces.
pub mod solver;
pub mod sort;
mod unroll;
pub mod value;
pub mod walker;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::arena::{ArenaConfig, ExprArena};
    pub use crate::compiler::{CompiledFunction, CompilerConfig};
    pub use crate::error::{SymError, SymResult};
    pub use crate::expr::{
        ArithOp, BitOp, CmpOp, CombineOp, Containment, Continuation, Expr, ExprId, ExprKind,
        ExprVariant, VarId,
    };
    pub use crate::function::{
        Function0, Function1, Function2, Function3, Function4, FunctionCore, SymValue,
    };
    pub use crate::interpreter::{Environment, evaluate};
    pub use crate::solver::{
        Direction, EnumerativeSolver, InputGenerator, Model, PathInputGenerator, Search,
        SearchConfig, ShapeGenerator, SolverBackend, TypeGenerator,
    };
    pub use crate::sort::{IntSort, RecordSort, Sort};
    pub use crate::value::Value;
}
