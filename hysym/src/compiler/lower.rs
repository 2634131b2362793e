use std::collections::HashMap;

use either::Either;
use log::trace;
use smallvec::SmallVec;

use crate::{
    arena::{CaseSplit, ExprArena},
    compiler::frame::{Block, Frame, Slot, Step},
    error::{SymError, SymResult},
    expr::{Expr, ExprId, ExprKind, VarId},
    interpreter::{self, Environment},
    semantics::{self, OpResult},
    value::Value,
};

const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Lexical state of the block being lowered.
///
/// Nested blocks start from a clone of their parent's scope: they may reuse every slot the
/// parent already computed, but whatever they compute themselves never flows back, since it
/// is only written when that branch runs.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    cache: HashMap<ExprId, Slot>,
    binders: SmallVec<[(VarId, Slot); 8]>,
    depth: usize,
}

impl Scope {
    pub(crate) fn bind(&mut self, var: VarId, slot: Slot) {
        self.binders.push((var, slot));
    }

    fn binder(&self, var: VarId) -> Option<Slot> {
        self.binders
            .iter()
            .rev()
            .find(|(bound, _)| *bound == var)
            .map(|(_, slot)| *slot)
    }
}

/// Non-empty branch of a case split compiled one level deeper.
struct Unrolled {
    head: Slot,
    tail: Slot,
    block: Block,
}

/// Non-empty branch of a case split past the depth cutoff, interpreted at run time.
struct Fallback {
    body: Expr,
    binders: SmallVec<[(VarId, Slot); 8]>,
    head: VarId,
    tail: VarId,
}

impl Fallback {
    fn run(&self, frame: &Frame, arena: &ExprArena, head: Value, tail: Value) -> SymResult<Value> {
        trace!(
            "Interpreting case split body {} past the unrolling cutoff.",
            self.body.id()
        );
        let mut env: Environment = self
            .binders
            .iter()
            .filter_map(|(var, slot)| frame.get(*slot).map(|value| (*var, value.clone())))
            .collect();
        env = env.with(self.head, head).with(self.tail, tail);
        interpreter::evaluate(arena, &self.body, &env)
    }
}

pub(crate) struct Lowering<'a> {
    arena: &'a ExprArena,
    max_depth: usize,
    max_slots: usize,
    template: Vec<Option<Value>>,
    constants: HashMap<ExprId, Slot>,
}

impl<'a> Lowering<'a> {
    pub(crate) fn new(arena: &'a ExprArena, max_depth: usize, max_slots: usize) -> Self {
        Self {
            arena,
            max_depth,
            max_slots,
            template: Vec::new(),
            constants: HashMap::new(),
        }
    }

    /// Initial frame contents: constants preloaded, everything else empty.
    pub(crate) fn into_template(self) -> Vec<Option<Value>> {
        self.template
    }

    pub(crate) fn alloc(&mut self, preset: Option<Value>) -> SymResult<Slot> {
        if self.template.len() >= self.max_slots {
            return Err(SymError::SlotLimitExceeded {
                limit: self.max_slots,
            });
        }
        self.template.push(preset);
        Ok(self.template.len() - 1)
    }

    fn constant(&mut self, node: ExprId, value: &Value) -> SymResult<Slot> {
        if let Some(slot) = self.constants.get(&node) {
            return Ok(*slot);
        }
        let slot = self.alloc(Some(value.clone()))?;
        self.constants.insert(node, slot);
        Ok(slot)
    }

    /// Lower `root` into a standalone block.
    pub(crate) fn block(&mut self, root: &Expr, scope: &mut Scope) -> SymResult<Block> {
        let mut steps = Vec::new();
        let result = self.lower(root, scope, &mut steps)?;
        Ok(Block::new(steps, result))
    }

    fn nested(&mut self, root: &Expr, scope: &Scope) -> SymResult<Block> {
        let mut inner = scope.clone();
        self.block(root, &mut inner)
    }

    fn lower(&mut self, e: &Expr, scope: &mut Scope, steps: &mut Vec<Step>) -> SymResult<Slot> {
        if let Some(slot) = scope.cache.get(&e.id()) {
            return Ok(*slot);
        }
        let slot = stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || {
            self.lower_node(e, scope, steps)
        })?;
        scope.cache.insert(e.id(), slot);
        Ok(slot)
    }

    fn operands(
        &mut self,
        operands: &[&Expr],
        scope: &mut Scope,
        steps: &mut Vec<Step>,
    ) -> SymResult<SmallVec<[Slot; 3]>> {
        operands
            .iter()
            .map(|operand| self.lower(operand, scope, steps))
            .collect()
    }

    /// Push a step computing `f` over the values of `inputs` into a fresh slot.
    fn emit<F>(
        &mut self,
        e: &Expr,
        inputs: SmallVec<[Slot; 3]>,
        steps: &mut Vec<Step>,
        f: F,
    ) -> SymResult<Slot>
    where
        F: Fn(&[&Value]) -> OpResult<Value> + Send + Sync + 'static,
    {
        let out = self.alloc(None)?;
        let node = e.id();
        steps.push(Box::new(move |frame: &mut Frame, _: &ExprArena| {
            let value = {
                let mut args: SmallVec<[&Value; 3]> = SmallVec::with_capacity(inputs.len());
                for slot in &inputs {
                    args.push(frame.read(*slot, node)?);
                }
                f(&args)
            }
            .map_err(|reason| SymError::EvaluationFailed { node, reason })?;
            frame.set(out, value);
            Ok(())
        }));
        Ok(out)
    }

    fn lower_node(&mut self, e: &Expr, scope: &mut Scope, steps: &mut Vec<Step>) -> SymResult<Slot> {
        let node = e.id();
        match e.kind() {
            ExprKind::Constant(value) => self.constant(node, value),
            ExprKind::Arbitrary { var, .. } => match scope.binder(*var) {
                Some(slot) => Ok(slot),
                None => self.constant(node, &e.sort().default_value()),
            },
            ExprKind::Argument { var } => match scope.binder(*var) {
                Some(slot) => Ok(slot),
                None => {
                    let var = *var;
                    let out = self.alloc(None)?;
                    steps.push(Box::new(move |_: &mut Frame, _: &ExprArena| {
                        Err(SymError::UnboundArgument { node, var })
                    }));
                    Ok(out)
                }
            },

            ExprKind::And(a, b) | ExprKind::Or(a, b) => {
                let short = matches!(e.kind(), ExprKind::Or(..));
                let lhs = self.lower(a, scope, steps)?;
                let rhs = self.nested(b, scope)?;
                let out = self.alloc(None)?;
                steps.push(Box::new(move |frame: &mut Frame, arena: &ExprArena| {
                    let value = if frame.read_bool(lhs, node)? == short {
                        short
                    } else {
                        rhs.run(frame, arena)?;
                        frame.read_bool(rhs.result(), node)?
                    };
                    frame.set(out, Value::Bool(value));
                    Ok(())
                }));
                Ok(out)
            }
            ExprKind::Not(a) => {
                let inputs = self.operands(&[a], scope, steps)?;
                self.emit(e, inputs, steps, |args| match args[0].as_bool() {
                    Some(b) => Ok(Value::Bool(!b)),
                    None => Err(format!("cannot negate {}", args[0])),
                })
            }
            ExprKind::If {
                guard,
                then,
                otherwise,
            } => {
                let guard = self.lower(guard, scope, steps)?;
                let then = self.nested(then, scope)?;
                let otherwise = self.nested(otherwise, scope)?;
                let out = self.alloc(None)?;
                steps.push(Box::new(move |frame: &mut Frame, arena: &ExprArena| {
                    let branch = if frame.read_bool(guard, node)? {
                        &then
                    } else {
                        &otherwise
                    };
                    let value = branch.eval(frame, arena, node)?;
                    frame.set(out, value);
                    Ok(())
                }));
                Ok(out)
            }

            ExprKind::Arith(op, a, b) => {
                let (op, inputs) = (*op, self.operands(&[a, b], scope, steps)?);
                self.emit(e, inputs, steps, move |args| {
                    semantics::arith(op, args[0], args[1])
                })
            }
            ExprKind::Bitwise(op, a, b) => {
                let (op, inputs) = (*op, self.operands(&[a, b], scope, steps)?);
                self.emit(e, inputs, steps, move |args| {
                    semantics::bitwise(op, args[0], args[1])
                })
            }
            ExprKind::BitNot(a) => {
                let inputs = self.operands(&[a], scope, steps)?;
                self.emit(e, inputs, steps, |args| semantics::bit_not(args[0]))
            }
            ExprKind::Eq(a, b) => {
                let inputs = self.operands(&[a, b], scope, steps)?;
                self.emit(e, inputs, steps, |args| Ok(Value::Bool(args[0] == args[1])))
            }
            ExprKind::Compare(op, a, b) => {
                let (op, inputs) = (*op, self.operands(&[a, b], scope, steps)?);
                self.emit(e, inputs, steps, move |args| {
                    semantics::compare(op, args[0], args[1]).map(Value::Bool)
                })
            }
            ExprKind::Cast(a) => {
                let (to, inputs) = (e.sort().clone(), self.operands(&[a], scope, steps)?);
                self.emit(e, inputs, steps, move |args| semantics::cast(args[0], &to))
            }

            ExprKind::FieldGet { record, index } => {
                let (index, inputs) = (*index, self.operands(&[record], scope, steps)?);
                self.emit(e, inputs, steps, move |args| {
                    semantics::field_get(args[0], index)
                })
            }
            ExprKind::FieldWith {
                record,
                index,
                value,
            } => {
                let (index, inputs) = (*index, self.operands(&[record, value], scope, steps)?);
                self.emit(e, inputs, steps, move |args| {
                    semantics::field_with(args[0], index, args[1])
                })
            }
            ExprKind::Create(fields) => {
                let sort = e
                    .sort()
                    .as_record()
                    .cloned()
                    .ok_or_else(|| e.sort().unsupported("create"))?;
                let fields: SmallVec<[&Expr; 3]> = fields.iter().collect();
                let inputs = self.operands(&fields, scope, steps)?;
                self.emit(e, inputs, steps, move |args| {
                    let values = args.iter().map(|value| (*value).clone()).collect();
                    Ok(Value::record_unchecked(sort.clone(), values))
                })
            }

            ExprKind::Cons { head, tail } => {
                let inputs = self.operands(&[head, tail], scope, steps)?;
                self.emit(e, inputs, steps, |args| semantics::seq_cons(args[0], args[1]))
            }
            ExprKind::Case { seq, empty, cons } => {
                let input = self.lower(seq, scope, steps)?;
                let empty = self.nested(empty, scope)?;
                let CaseSplit {
                    head_var,
                    tail_var,
                    body,
                    ..
                } = self.arena.case_split(e, seq, cons)?;

                let branch = if scope.depth >= self.max_depth {
                    Either::Right(Fallback {
                        body,
                        binders: scope.binders.clone(),
                        head: head_var,
                        tail: tail_var,
                    })
                } else {
                    let head = self.alloc(None)?;
                    let tail = self.alloc(None)?;
                    let mut inner = scope.clone();
                    inner.depth += 1;
                    inner.bind(head_var, head);
                    inner.bind(tail_var, tail);
                    let block = self.block(&body, &mut inner)?;
                    Either::Left(Unrolled { head, tail, block })
                };

                let out = self.alloc(None)?;
                steps.push(Box::new(move |frame: &mut Frame, arena: &ExprArena| {
                    let split = frame
                        .read(input, node)?
                        .as_seq()
                        .map(|items| items.split_first())
                        .ok_or_else(|| SymError::EvaluationFailed {
                            node,
                            reason: "case split over a non-sequence".into(),
                        })?;
                    let value = match (split, &branch) {
                        (None, _) => empty.eval(frame, arena, node)?,
                        (Some((head, tail)), Either::Left(unrolled)) => {
                            frame.set(unrolled.head, head);
                            frame.set(unrolled.tail, tail);
                            unrolled.block.eval(frame, arena, node)?
                        }
                        (Some((head, tail)), Either::Right(fallback)) => {
                            fallback.run(frame, arena, head, tail)?
                        }
                    };
                    frame.set(out, value);
                    Ok(())
                }));
                Ok(out)
            }
            ExprKind::Concat(a, b) => {
                let inputs = self.operands(&[a, b], scope, steps)?;
                self.emit(e, inputs, steps, |args| semantics::seq_concat(args[0], args[1]))
            }
            ExprKind::Length(seq) => {
                let inputs = self.operands(&[seq], scope, steps)?;
                self.emit(e, inputs, steps, |args| semantics::seq_length(args[0]))
            }
            ExprKind::At { seq, index } => {
                let inputs = self.operands(&[seq, index], scope, steps)?;
                self.emit(e, inputs, steps, |args| semantics::seq_at(args[0], args[1]))
            }
            ExprKind::Slice { seq, start, len } => {
                let inputs = self.operands(&[seq, start, len], scope, steps)?;
                self.emit(e, inputs, steps, |args| {
                    semantics::seq_slice(args[0], args[1], args[2])
                })
            }
            ExprKind::Replace { seq, from, to } => {
                let inputs = self.operands(&[seq, from, to], scope, steps)?;
                self.emit(e, inputs, steps, |args| {
                    semantics::seq_replace(args[0], args[1], args[2])
                })
            }
            ExprKind::IndexOf { seq, sub, offset } => {
                let inputs = self.operands(&[seq, sub, offset], scope, steps)?;
                self.emit(e, inputs, steps, |args| {
                    semantics::seq_index_of(args[0], args[1], args[2])
                })
            }
            ExprKind::Containment(kind, seq, sub) => {
                let (kind, inputs) = (*kind, self.operands(&[seq, sub], scope, steps)?);
                self.emit(e, inputs, steps, move |args| {
                    semantics::seq_containment(kind, args[0], args[1]).map(Value::Bool)
                })
            }

            ExprKind::MapGet { map, key } => {
                let inputs = self.operands(&[map, key], scope, steps)?;
                self.emit(e, inputs, steps, |args| semantics::map_get(args[0], args[1]))
            }
            ExprKind::MapSet { map, key, value } => {
                let inputs = self.operands(&[map, key, value], scope, steps)?;
                self.emit(e, inputs, steps, |args| {
                    semantics::map_set(args[0], args[1], args[2])
                })
            }
            ExprKind::MapDelete { map, key } => {
                let inputs = self.operands(&[map, key], scope, steps)?;
                self.emit(e, inputs, steps, |args| semantics::map_delete(args[0], args[1]))
            }
            ExprKind::Combine(op, a, b) => {
                let (op, inputs) = (*op, self.operands(&[a, b], scope, steps)?);
                self.emit(e, inputs, steps, move |args| {
                    semantics::map_combine(op, args[0], args[1])
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Sort;

    #[test]
    fn shared_subexpressions_get_one_slot() {
        let arena = ExprArena::new();
        let x = arena.fresh_argument(Sort::BigInt);
        let ExprKind::Argument { var } = x.kind() else {
            unreachable!()
        };
        let one = arena.constant(Value::big(1));
        let sum = arena.add(&x, &one).unwrap();
        let square = arena.mul(&sum, &sum).unwrap();

        let mut lowering = Lowering::new(&arena, 0, 64);
        let mut scope = Scope::default();
        let param = lowering.alloc(None).unwrap();
        scope.bind(*var, param);
        let block = lowering.block(&square, &mut scope).unwrap();
        // x, 1, x + 1, (x + 1) * (x + 1)
        assert_eq!(lowering.into_template().len(), 4);
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn slot_limit_is_enforced() {
        let arena = ExprArena::new();
        let x = arena.fresh_argument(Sort::BigInt);
        let y = arena.fresh_argument(Sort::BigInt);
        let sum = arena.add(&x, &y).unwrap();
        let mut lowering = Lowering::new(&arena, 0, 2);
        let err = lowering.block(&sum, &mut Scope::default()).err();
        assert!(matches!(err, Some(SymError::SlotLimitExceeded { limit: 2 })));
    }
}
