//! Closure compiler.
//!
//! An expression graph is lowered once into a [`CompiledFunction`]: a tree of boxed closures
//! ("steps") reading and writing slots of a per-call frame. Every distinct node gets at most
//! one slot per block, so shared subexpressions run once per call. Constants are written into
//! the frame template at compile time.
//!
//! Branching
//! - `and`, `or` and `if` run their lazy operands in nested blocks.
//! - A case split runs its empty branch in a nested block. Its non-empty branch is the arena's
//!   cached instantiation over head and tail placeholders, lowered one level deeper with those
//!   placeholders bound to two new slots. Past the unrolling cutoff the instantiated body is kept as
//!   an expression and handed to the interpreter at run time, together with every live binding.
//!
//! Compiling is all or nothing: an error leaves no partial function behind.
mod frame;
mod lower;

use log::{debug, info};
use smallvec::SmallVec;

use crate::{
    arena::ExprArena,
    compiler::{
        frame::{Block, Frame, Slot},
        lower::{Lowering, Scope},
    },
    error::{SymError, SymResult},
    expr::{Expr, ExprId, ExprKind},
    sort::Sort,
    value::Value,
};

/// Largest number of parameters a compiled function accepts.
pub const MAX_ARITY: usize = 4;

/// Resource limits of a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Largest unrolling depth a caller may request.
    pub max_unroll_depth: usize,
    /// Largest frame size, constants included.
    pub max_slots: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_unroll_depth: 64,
            max_slots: 1 << 16,
        }
    }
}

/// Reusable executable form of an expression over up to [`MAX_ARITY`] parameters.
pub struct CompiledFunction {
    root: ExprId,
    params: SmallVec<[(Slot, Sort); MAX_ARITY]>,
    block: Block,
    template: Vec<Option<Value>>,
    depth: usize,
}

impl std::fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("root", &self.root)
            .field("arity", &self.arity())
            .field("depth", &self.depth)
            .field("slots", &self.slots())
            .field("steps", &self.block.len())
            .finish()
    }
}

impl CompiledFunction {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Unrolling depth this function was compiled with.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn slots(&self) -> usize {
        self.template.len()
    }

    /// Run the function on `args`, which must match the parameter sorts.
    pub fn call(&self, arena: &ExprArena, args: &[Value]) -> SymResult<Value> {
        if args.len() != self.params.len() {
            return Err(SymError::ArityMismatch {
                op: "call",
                expected: self.params.len(),
                found: args.len(),
            });
        }
        let mut frame = Frame::new(self.template.clone());
        for ((slot, sort), arg) in self.params.iter().zip(args) {
            let found = arg.sort();
            if &found != sort {
                return Err(SymError::ValueSortMismatch {
                    expected: sort.clone(),
                    found,
                });
            }
            frame.set(*slot, arg.clone());
        }
        self.block.eval(&mut frame, arena, self.root)
    }
}

/// Compile `body` over the argument placeholders `params`, unrolling case splits `depth`
/// levels deep.
pub fn compile(
    arena: &ExprArena,
    body: &Expr,
    params: &[Expr],
    depth: usize,
) -> SymResult<CompiledFunction> {
    let config = &arena.config().compiler;
    if depth > config.max_unroll_depth {
        return Err(SymError::DepthLimitExceeded {
            requested: depth,
            limit: config.max_unroll_depth,
        });
    }
    if params.len() > MAX_ARITY {
        return Err(SymError::ArityMismatch {
            op: "compile",
            expected: MAX_ARITY,
            found: params.len(),
        });
    }

    let mut lowering = Lowering::new(arena, depth, config.max_slots);
    let mut scope = Scope::default();
    let mut slots = SmallVec::new();
    for param in params {
        let ExprKind::Argument { var } = param.kind() else {
            return Err(param.sort().unsupported("compile parameter"));
        };
        let slot = lowering.alloc(None)?;
        scope.bind(*var, slot);
        slots.push((slot, param.sort().clone()));
    }

    let block = lowering.block(body, &mut scope)?;
    let template = lowering.into_template();
    debug!(
        "Compiled node {} at unrolling depth {} ({} parameters).",
        body.id(),
        depth,
        params.len()
    );
    info!(
        "Compiled function uses {} slots and {} top-level steps.",
        template.len(),
        block.len()
    );

    Ok(CompiledFunction {
        root: body.id(),
        params: slots,
        block,
        template,
        depth,
    })
}
