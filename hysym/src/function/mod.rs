//! Typed functions over expression bodies.
//!
//! A function is built once: its body is produced by a builder closure applied to the arena's
//! shared argument placeholders (one per parameter position and sort), then checked against
//! the declared result sort. The builder is kept so that search can apply it to symbolic
//! inputs instead of placeholders.
//!
//! Execution state is one-way, `Uncompiled -> Compiled`. Until [`FunctionCore::compile`] is
//! called, evaluation interprets the unrolled body. Afterwards it runs the cached compiled
//! closure; compiling again is a no-op.
//!
//! ```
//! use hysym::prelude::*;
//!
//! let arena = ExprArena::new();
//! let double = Function1::<u32, u32>::new(&arena, |arena, x| arena.add(x, x)).unwrap();
//! assert_eq!(double.evaluate(21).unwrap(), 42);
//! double.compile().unwrap();
//! assert_eq!(double.evaluate(4).unwrap(), 8);
//! ```
pub mod typed;

use std::{marker::PhantomData, sync::Arc};

use log::warn;
use once_cell::sync::OnceCell;
use smallvec::SmallVec;

pub use typed::SymValue;

use crate::{
    arena::ExprArena,
    compiler::{self, CompiledFunction, MAX_ARITY},
    error::{SymError, SymResult},
    expr::{Expr, ExprKind},
    interpreter::{self, Environment},
    solver::{Direction, InputGenerator, Search, SolverBackend, TypeGenerator},
    sort::Sort,
    value::Value,
};

/// Body builder over the parameter expressions.
pub type BodyBuilder = dyn Fn(&ExprArena, &[Expr]) -> SymResult<Expr> + Send + Sync;

/// Untyped function: parameters, body and the lazily compiled closure.
pub struct FunctionCore<'a> {
    arena: &'a ExprArena,
    params: SmallVec<[Expr; MAX_ARITY]>,
    result: Sort,
    builder: Arc<BodyBuilder>,
    body: Expr,
    compiled: OnceCell<CompiledFunction>,
}

impl std::fmt::Debug for FunctionCore<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionCore")
            .field("params", &self.params)
            .field("result", &self.result)
            .field("body", &self.body)
            .field("compiled", &self.compiled.get())
            .finish()
    }
}

impl<'a> FunctionCore<'a> {
    pub fn new<F>(arena: &'a ExprArena, params: &[Sort], result: Sort, builder: F) -> SymResult<Self>
    where
        F: Fn(&ExprArena, &[Expr]) -> SymResult<Expr> + Send + Sync + 'static,
    {
        if params.len() > MAX_ARITY {
            return Err(SymError::ArityMismatch {
                op: "function",
                expected: MAX_ARITY,
                found: params.len(),
            });
        }
        let params: SmallVec<[Expr; MAX_ARITY]> = params
            .iter()
            .enumerate()
            .map(|(position, sort)| arena.argument(position, sort))
            .collect();
        let body = builder(arena, &params)?;
        body.sort().expect("function", &result)?;
        Ok(Self {
            arena,
            params,
            result,
            builder: Arc::new(builder),
            body,
            compiled: OnceCell::new(),
        })
    }

    #[inline]
    pub fn arena(&self) -> &'a ExprArena {
        self.arena
    }

    pub fn params(&self) -> &[Expr] {
        &self.params
    }

    pub fn param_sorts(&self) -> impl Iterator<Item = &Sort> {
        self.params.iter().map(Expr::sort)
    }

    pub fn result_sort(&self) -> &Sort {
        &self.result
    }

    /// Body over the argument placeholders, as built.
    pub fn body(&self) -> &Expr {
        &self.body
    }

    /// Apply the body builder to other parameter expressions.
    pub fn apply(&self, args: &[Expr]) -> SymResult<Expr> {
        if args.len() != self.params.len() {
            return Err(SymError::ArityMismatch {
                op: "apply",
                expected: self.params.len(),
                found: args.len(),
            });
        }
        for (param, arg) in self.params.iter().zip(args) {
            arg.sort().expect("apply", param.sort())?;
        }
        let body = (self.builder)(self.arena, args)?;
        body.sort().expect("apply", &self.result)?;
        Ok(body)
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    pub fn compiled(&self) -> Option<&CompiledFunction> {
        self.compiled.get()
    }

    /// Compile at the arena's default unrolling depth.
    pub fn compile(&self) -> SymResult<&CompiledFunction> {
        self.compile_with_depth(self.arena.config().default_unroll_depth)
    }

    /// Compile, unrolling case splits `depth` levels deep. Does nothing if the function is
    /// already compiled.
    pub fn compile_with_depth(&self, depth: usize) -> SymResult<&CompiledFunction> {
        if let Some(existing) = self.compiled.get() {
            if existing.depth() != depth {
                warn!(
                    "Function {} is already compiled at depth {}, ignoring depth {}.",
                    self.body.id(),
                    existing.depth(),
                    depth
                );
            }
            return Ok(existing);
        }
        let body = self.arena.unroll(&self.body)?;
        let compiled = compiler::compile(self.arena, &body, &self.params, depth)?;
        Ok(self.compiled.get_or_init(|| compiled))
    }

    /// Evaluate on concrete arguments, through the compiled closure when there is one.
    pub fn evaluate(&self, args: &[Value]) -> SymResult<Value> {
        if let Some(compiled) = self.compiled.get() {
            return compiled.call(self.arena, args);
        }
        let env = self.bind(args)?;
        let body = self.arena.unroll(&self.body)?;
        interpreter::evaluate(self.arena, &body, &env)
    }

    /// Interpret the body as built, without unrolling or compiling.
    pub fn interpret(&self, args: &[Value]) -> SymResult<Value> {
        let env = self.bind(args)?;
        interpreter::evaluate(self.arena, &self.body, &env)
    }

    fn bind(&self, args: &[Value]) -> SymResult<Environment> {
        if args.len() != self.params.len() {
            return Err(SymError::ArityMismatch {
                op: "evaluate",
                expected: self.params.len(),
                found: args.len(),
            });
        }
        let mut env = Environment::new();
        for (param, arg) in self.params.iter().zip(args) {
            let found = arg.sort();
            if &found != param.sort() {
                return Err(SymError::ValueSortMismatch {
                    expected: param.sort().clone(),
                    found,
                });
            }
            if let ExprKind::Argument { var } = param.kind() {
                env = env.with(*var, arg.clone());
            }
        }
        Ok(env)
    }
}

macro_rules! define_function {
    ($(#[$doc:meta])* $name:ident => ($($arg:ident : $ty:ident @ $idx:tt),*)) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name<'a, $($ty,)* R> {
            core: FunctionCore<'a>,
            _marker: PhantomData<fn($($ty),*) -> R>,
        }

        impl<'a, $($ty: SymValue,)* R: SymValue> $name<'a, $($ty,)* R> {
            pub fn new<F>(arena: &'a ExprArena, build: F) -> SymResult<Self>
            where
                F: Fn(&ExprArena $(, define_function!(@expr $ty))*) -> SymResult<Expr>
                    + Send
                    + Sync
                    + 'static,
            {
                let core = FunctionCore::new(
                    arena,
                    &[$($ty::sort()),*],
                    R::sort(),
                    move |arena: &ExprArena, _args: &[Expr]| build(arena $(, &_args[$idx])*),
                )?;
                Ok(Self {
                    core,
                    _marker: PhantomData,
                })
            }

            pub fn core(&self) -> &FunctionCore<'a> {
                &self.core
            }

            pub fn body(&self) -> &Expr {
                self.core.body()
            }

            pub fn evaluate(&self $(, $arg: $ty)*) -> SymResult<R> {
                let value = self.core.evaluate(&[$($arg.into_value()),*])?;
                R::from_value(&value)
            }

            pub fn compile(&self) -> SymResult<()> {
                self.core.compile().map(|_| ())
            }

            pub fn compile_with_depth(&self, depth: usize) -> SymResult<()> {
                self.core.compile_with_depth(depth).map(|_| ())
            }

            pub fn is_compiled(&self) -> bool {
                self.core.is_compiled()
            }

            #[allow(unused_variables)]
            fn typed_inputs(values: &[Value]) -> SymResult<($($ty,)*)> {
                Ok(($($ty::from_value(&values[$idx])?,)*))
            }
        }

        impl<'a, $($ty: SymValue,)* R: SymValue> $name<'a, $($ty,)* R> {
            /// Search for inputs whose output satisfies `predicate`.
            ///
            /// The predicate receives the symbolic inputs and the symbolic output and returns a
            /// boolean expression.
            pub fn find<S, G, P>(
                &self,
                search: &Search<S, G>,
                predicate: P,
            ) -> SymResult<Option<($($ty,)*)>>
            where
                S: SolverBackend,
                G: TypeGenerator,
                P: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
            {
                match self.core.find(search, predicate)? {
                    Some(values) => Self::typed_inputs(&values).map(Some),
                    None => Ok(None),
                }
            }

            /// Every distinct input satisfying `predicate`, up to the search's result limit.
            pub fn find_all<S, G, P>(
                &self,
                search: &Search<S, G>,
                predicate: P,
            ) -> SymResult<Vec<($($ty,)*)>>
            where
                S: SolverBackend,
                G: TypeGenerator,
                P: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
            {
                self.core
                    .find_all(search, predicate)?
                    .iter()
                    .map(|values| Self::typed_inputs(values))
                    .collect()
            }

            /// Input maximising `objective` among those satisfying `constraint`.
            pub fn maximize<S, G, O, P>(
                &self,
                search: &Search<S, G>,
                objective: O,
                constraint: P,
            ) -> SymResult<Option<($($ty,)*)>>
            where
                S: SolverBackend,
                G: TypeGenerator,
                O: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
                P: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
            {
                match self.core.optimize(search, Direction::Maximize, objective, constraint)? {
                    Some(values) => Self::typed_inputs(&values).map(Some),
                    None => Ok(None),
                }
            }

            /// Input minimising `objective` among those satisfying `constraint`.
            pub fn minimize<S, G, O, P>(
                &self,
                search: &Search<S, G>,
                objective: O,
                constraint: P,
            ) -> SymResult<Option<($($ty,)*)>>
            where
                S: SolverBackend,
                G: TypeGenerator,
                O: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
                P: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
            {
                match self.core.optimize(search, Direction::Minimize, objective, constraint)? {
                    Some(values) => Self::typed_inputs(&values).map(Some),
                    None => Ok(None),
                }
            }

            /// Inputs produced by `generator` for this function.
            pub fn generate_inputs<I: InputGenerator>(
                &self,
                generator: &I,
            ) -> SymResult<Vec<($($ty,)*)>> {
                generator
                    .generate(&self.core)?
                    .iter()
                    .map(|values| Self::typed_inputs(values))
                    .collect()
            }
        }
    };
    (@expr $ty:ident) => { &Expr };
}

define_function! {
    /// Function without parameters.
    Function0 => ()
}
define_function! {
    /// Function of one parameter.
    Function1 => (a1: T1 @ 0)
}
define_function! {
    /// Function of two parameters.
    Function2 => (a1: T1 @ 0, a2: T2 @ 1)
}
define_function! {
    /// Function of three parameters.
    Function3 => (a1: T1 @ 0, a2: T2 @ 1, a3: T3 @ 2)
}
define_function! {
    /// Function of four parameters.
    Function4 => (a1: T1 @ 0, a2: T2 @ 1, a3: T3 @ 2, a4: T4 @ 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_sort_is_checked() {
        let arena = ExprArena::new();
        let err = Function1::<u8, bool>::new(&arena, |_, x| Ok(x.clone())).unwrap_err();
        assert!(matches!(err, SymError::SortMismatch { .. }));
    }

    #[test]
    fn functions_share_argument_placeholders() {
        let arena = ExprArena::new();
        let f = Function1::<u8, u8>::new(&arena, |_, x| Ok(x.clone())).unwrap();
        let g = Function2::<u8, bool, u8>::new(&arena, |_, x, _| Ok(x.clone())).unwrap();
        assert_eq!(f.body(), g.body());
    }

    #[test]
    fn recompiling_keeps_the_first_closure() {
        let arena = ExprArena::new();
        let f = Function1::<i32, i32>::new(&arena, |arena, x| arena.mul(x, x)).unwrap();
        assert!(!f.is_compiled());
        f.compile_with_depth(2).unwrap();
        f.compile_with_depth(5).unwrap();
        assert_eq!(f.core().compiled().map(CompiledFunction::depth), Some(2));
        assert_eq!(f.evaluate(-7).unwrap(), 49);
    }

    #[test]
    fn nullary_function_evaluates() {
        let arena = ExprArena::new();
        let f = Function0::<bool>::new(&arena, |arena| Ok(arena.constant(true))).unwrap();
        assert!(f.evaluate().unwrap());
    }
}
