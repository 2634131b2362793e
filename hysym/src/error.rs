use thiserror::Error;

use crate::{
    expr::{ExprId, VarId},
    sort::Sort,
};

#[derive(Debug, Clone, Error)]
pub enum SymError {
    // ======================= Construction =======================
    #[error("Sort mismatch in '{op}': expected {expected}, found {found}")]
    SortMismatch {
        op: &'static str,
        expected: Sort,
        found: Sort,
    },

    #[error("Operation '{op}' is not supported for sort {sort}")]
    UnsupportedSort { op: &'static str, sort: Sort },

    #[error("Field index {index} is out of range for record {record} ({len} fields)")]
    FieldOutOfRange {
        record: String,
        index: usize,
        len: usize,
    },

    #[error("Operation '{op}' expects {expected} operands, got {found}")]
    ArityMismatch {
        op: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid integer width {0}, must be within 1..=64 bits")]
    InvalidIntWidth(u32),

    // ======================= Compilation =======================
    #[error("Unrolling depth {requested} exceeds the compiler limit of {limit}")]
    DepthLimitExceeded { requested: usize, limit: usize },

    #[error("Compiled block needs more than {limit} slots")]
    SlotLimitExceeded { limit: usize },

    // ====================== Interpretation ======================
    #[error("Argument {var} referenced by node {node} is not bound")]
    UnboundArgument { node: ExprId, var: VarId },

    #[error("Evaluation of node {node} failed: {reason}")]
    EvaluationFailed { node: ExprId, reason: String },

    #[error("Value of sort {found} cannot be converted to {expected}")]
    ValueSortMismatch { expected: Sort, found: Sort },

    // ========================= Collaborators =========================
    #[error("Solver backend failed: {0}")]
    Solver(String),
}

pub type SymResult<T> = Result<T, SymError>;
