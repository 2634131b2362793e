//! Hash-consed expression graph.
//!
//! Role
//! - An [`Expr`] is a shared handle on an immutable [`Node`]: a unique [`ExprId`], the result
//!   [`Sort`] and the variant payload ([`ExprKind`]). Children are themselves handles, so a
//!   program is a DAG rather than a tree.
//! - Nodes are only created through an [`ExprArena`](crate::arena::ExprArena), which interns
//!   them: building the same shape twice returns the same handle. Equality, hashing and
//!   ordering of handles are therefore by identity and O(1).
//!
//! Case splits carry a [`Continuation`], a closure building the non-empty branch from the
//! head and tail of the sequence. Continuations are compared by pointer.
pub mod kind;
pub mod pretty;

use std::{
    hash::{Hash, Hasher},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

pub use kind::{ArithOp, BitOp, CmpOp, CombineOp, Containment, ExprKind, ExprVariant};

use crate::{arena::ExprArena, error::SymResult, sort::Sort, value::Value};

static NEXT_EXPR_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// Process-wide identity of an expression node, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprId(u64);

impl ExprId {
    fn fresh() -> Self {
        Self(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ExprId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process-wide identity of a free variable (arbitrary value or argument placeholder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u64);

impl VarId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

type ContinuationFn = dyn Fn(&ExprArena, Expr, Expr) -> SymResult<Expr> + Send + Sync;

/// Builder of the non-empty branch of a case split, called with `(head, tail)`.
#[derive(Clone)]
pub struct Continuation(Arc<ContinuationFn>);

impl Continuation {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ExprArena, Expr, Expr) -> SymResult<Expr> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn apply(&self, arena: &ExprArena, head: Expr, tail: Expr) -> SymResult<Expr> {
        (self.0)(arena, head, tail)
    }

    /// Build the non-empty branch and check it has the sort of the case split.
    pub(crate) fn instantiate(
        &self,
        arena: &ExprArena,
        head: Expr,
        tail: Expr,
        sort: &Sort,
    ) -> SymResult<Expr> {
        let body = self.apply(arena, head, tail)?;
        body.sort().expect("case", sort)?;
        Ok(body)
    }

    /// Identity of the closure, used in interning keys.
    #[inline]
    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for Continuation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Continuation {}

impl Hash for Continuation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl std::fmt::Debug for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Continuation({:#x})", self.key())
    }
}

/// Immutable expression node.
pub struct Node {
    id: ExprId,
    sort: Sort,
    kind: ExprKind,
}

/// Shared handle on an interned [`Node`].
#[derive(Clone)]
pub struct Expr(Arc<Node>);

impl Expr {
    /// Allocate a node with a fresh identity. Callers go through the arena so that the node
    /// ends up interned.
    pub(crate) fn new(kind: ExprKind, sort: Sort) -> Self {
        Self(Arc::new(Node {
            id: ExprId::fresh(),
            sort,
            kind,
        }))
    }

    #[inline]
    pub fn id(&self) -> ExprId {
        self.0.id
    }

    #[inline]
    pub fn sort(&self) -> &Sort {
        &self.0.sort
    }

    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    #[inline]
    pub fn variant(&self) -> ExprVariant {
        ExprVariant::from(&self.0.kind)
    }

    pub fn as_const(&self) -> Option<&Value> {
        match self.kind() {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        self.kind().is_constant()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_const().and_then(Value::as_bool)
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        self.as_bool() == Some(true)
    }

    #[inline]
    pub fn is_false(&self) -> bool {
        self.as_bool() == Some(false)
    }

    /// Returns `true` for the constant empty sequence or the constant empty map.
    pub fn is_empty_collection(&self) -> bool {
        self.as_const().is_some_and(Value::is_empty_collection)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state)
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id().cmp(&other.id())
    }
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Expr({}: {} : {})", self.id(), self.variant().name(), self.sort())
    }
}
