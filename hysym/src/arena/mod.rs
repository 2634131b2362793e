//! Interning arena for expression nodes.
//!
//! Role
//! - Every node is created through [`ExprArena::intern_with`]: the structural key of the
//!   requested node (variant, result sort, child ids, scalar payload) is looked up first, and
//!   the builder only runs on a miss. The builder may return a different node (this is where
//!   the simplifier plugs in); the result is recorded under the requested key.
//! - Tables are sharded concurrent maps, one per [`ExprVariant`]. No lock is held while a
//!   builder runs, since builders recurse into the arena. When two threads race on the same
//!   key the first insertion wins and both receive that node.
//! - The arena also owns the argument placeholder table, the unroll memo, the case split
//!   bodies and the [`ArenaConfig`].
//! - A case split whose sequence is only known at run time is instantiated once, over two
//!   placeholders standing for the head and the tail. Evaluation binds those placeholders to
//!   the concrete values, so walking a sequence never interns anything per element.
//!
//! A process-wide instance is available through [`ExprArena::global`]; tests and embedders that
//! need isolation create their own.
pub(crate) mod key;

use std::collections::HashMap;

use dashmap::DashMap;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use strum::EnumCount;

use crate::{
    arena::key::NodeKey,
    compiler::CompilerConfig,
    error::SymResult,
    expr::{Continuation, Expr, ExprId, ExprKind, ExprVariant, VarId},
    simplify,
    sort::Sort,
    value::Value,
};

/// Arena-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Keep boolean `if` nodes with a constant arm instead of rewriting them into and/or.
    pub preserve_branches: bool,
    /// Unrolling depth used by [`compile`](crate::function::FunctionCore::compile).
    pub default_unroll_depth: usize,
    pub compiler: CompilerConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            preserve_branches: false,
            default_unroll_depth: 4,
            compiler: CompilerConfig::default(),
        }
    }
}

/// Non-empty branch of a case split, built over placeholders for its head and tail.
#[derive(Debug, Clone)]
pub(crate) struct CaseSplit {
    pub(crate) head_var: VarId,
    pub(crate) head: Expr,
    pub(crate) tail_var: VarId,
    pub(crate) tail: Expr,
    pub(crate) body: Expr,
}

static GLOBAL: Lazy<ExprArena> = Lazy::new(ExprArena::new);

pub struct ExprArena {
    config: ArenaConfig,
    tables: Box<[DashMap<NodeKey, Expr>]>,
    arguments: Mutex<HashMap<(usize, Sort), Expr>>,
    unrolled: DashMap<ExprId, Expr>,
    splits: DashMap<ExprId, CaseSplit>,
}

impl Default for ExprArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprArena {
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    pub fn with_config(config: ArenaConfig) -> Self {
        Self {
            config,
            tables: (0..ExprVariant::COUNT).map(|_| DashMap::new()).collect(),
            arguments: Mutex::new(HashMap::new()),
            unrolled: DashMap::new(),
            splits: DashMap::new(),
        }
    }

    /// The process-wide arena, created with the default configuration on first use.
    pub fn global() -> &'static ExprArena {
        &GLOBAL
    }

    #[inline]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Number of interned keys.
    pub fn len(&self) -> usize {
        self.tables.iter().map(DashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(DashMap::is_empty)
    }

    #[inline]
    fn table(&self, variant: ExprVariant) -> &DashMap<NodeKey, Expr> {
        &self.tables[variant as usize]
    }

    fn publish(&self, key: NodeKey, node: Expr) -> Expr {
        let table = self.table(key.variant());
        let entry = table.entry(key).or_insert_with(|| {
            debug!(
                "New {} node {} of sort {} interned.",
                node.variant().name(),
                node.id(),
                node.sort()
            );
            node
        });
        entry.value().clone()
    }

    /// Return the node interned under the key of `(kind, sort)`, running `builder` on a miss.
    ///
    /// The builder receives the requested kind and sort and may return any node of that sort;
    /// errors it raises are returned and nothing is recorded.
    pub fn intern_with<F>(&self, kind: ExprKind, sort: Sort, builder: F) -> SymResult<Expr>
    where
        F: FnOnce(&ExprArena, ExprKind, Sort) -> SymResult<Expr>,
    {
        let key = NodeKey::of(&kind, &sort);
        if let Some(existing) = self.table(key.variant()).get(&key) {
            return Ok(existing.clone());
        }
        let built = builder(self, kind, sort)?;
        Ok(self.publish(key, built))
    }

    /// Intern through the simplifier.
    pub(crate) fn intern(&self, kind: ExprKind, sort: Sort) -> SymResult<Expr> {
        self.intern_with(kind, sort, simplify::rewrite)
    }

    /// Intern a node as is, for leaves that never simplify.
    fn intern_leaf(&self, kind: ExprKind, sort: Sort) -> Expr {
        let key = NodeKey::of(&kind, &sort);
        if let Some(existing) = self.table(key.variant()).get(&key) {
            return existing.clone();
        }
        self.publish(key, Expr::new(kind, sort))
    }

    pub fn constant(&self, value: impl Into<Value>) -> Expr {
        let value = value.into();
        let sort = value.sort();
        self.intern_leaf(ExprKind::Constant(value), sort)
    }

    /// Placeholder for parameter `position` of sort `sort`, shared by every function built
    /// against this arena with that parameter shape.
    pub fn argument(&self, position: usize, sort: &Sort) -> Expr {
        let mut arguments = self.arguments.lock();
        arguments
            .entry((position, sort.clone()))
            .or_insert_with(|| self.fresh_argument(sort.clone()))
            .clone()
    }

    /// Placeholder with a new variable, never shared.
    pub fn fresh_argument(&self, sort: Sort) -> Expr {
        self.placeholder(sort).1
    }

    pub(crate) fn placeholder(&self, sort: Sort) -> (VarId, Expr) {
        let var = VarId::fresh();
        (var, self.intern_leaf(ExprKind::Argument { var }, sort))
    }

    /// New unconstrained value of the given sort.
    pub fn arbitrary(&self, sort: Sort, name: Option<&str>) -> Expr {
        let kind = ExprKind::Arbitrary {
            var: VarId::fresh(),
            name: name.map(Into::into),
        };
        self.intern_leaf(kind, sort)
    }

    /// Non-empty branch of the case split `node` over `seq`, instantiated on first use.
    pub(crate) fn case_split(
        &self,
        node: &Expr,
        seq: &Expr,
        cons: &Continuation,
    ) -> SymResult<CaseSplit> {
        if let Some(split) = self.splits.get(&node.id()) {
            return Ok(split.value().clone());
        }
        let elem = seq
            .sort()
            .seq_elem()
            .cloned()
            .ok_or_else(|| seq.sort().unsupported("case"))?;
        let (head_var, head) = self.placeholder(elem);
        let (tail_var, tail) = self.placeholder(seq.sort().clone());
        let body = cons.instantiate(self, head.clone(), tail.clone(), node.sort())?;
        let split = CaseSplit {
            head_var,
            head,
            tail_var,
            tail,
            body,
        };
        Ok(self
            .splits
            .entry(node.id())
            .or_insert(split)
            .value()
            .clone())
    }

    pub(crate) fn unrolled(&self, id: ExprId) -> Option<Expr> {
        self.unrolled.get(&id).map(|entry| entry.value().clone())
    }

    #[cfg(test)]
    pub(crate) fn forget_unrolled(&self) {
        self.unrolled.clear();
    }

    /// Record `output` as the unrolling of `input` and of itself.
    ///
    /// The output is in normal form: its children are unrolled and every case split left in it
    /// already carries an unrolling continuation. Rebuilding it again would only wrap those
    /// continuations a second time.
    pub(crate) fn remember_unrolled(&self, input: &Expr, output: &Expr) {
        self.unrolled.insert(input.id(), output.clone());
        self.unrolled.insert(output.id(), output.clone());
    }
}
