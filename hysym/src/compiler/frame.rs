use crate::{
    arena::ExprArena,
    error::{SymError, SymResult},
    expr::ExprId,
    value::Value,
};

pub(crate) type Slot = usize;

/// Register file of one call of a compiled function.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    slots: Vec<Option<Value>>,
}

impl Frame {
    pub(crate) fn new(slots: Vec<Option<Value>>) -> Self {
        Self { slots }
    }

    #[inline]
    pub(crate) fn get(&self, slot: Slot) -> Option<&Value> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Read a slot on behalf of `node`.
    #[inline]
    pub(crate) fn read(&self, slot: Slot, node: ExprId) -> SymResult<&Value> {
        self.get(slot).ok_or_else(|| SymError::EvaluationFailed {
            node,
            reason: format!("slot {} read before it was written", slot),
        })
    }

    pub(crate) fn read_bool(&self, slot: Slot, node: ExprId) -> SymResult<bool> {
        let value = self.read(slot, node)?;
        value.as_bool().ok_or_else(|| SymError::EvaluationFailed {
            node,
            reason: format!("expected a boolean, got {}", value),
        })
    }

    #[inline]
    pub(crate) fn set(&mut self, slot: Slot, value: Value) {
        if let Some(target) = self.slots.get_mut(slot) {
            *target = Some(value);
        }
    }
}

/// One compiled operation: reads some slots and writes one.
pub(crate) type Step = Box<dyn Fn(&mut Frame, &ExprArena) -> SymResult<()> + Send + Sync>;

/// Straight-line sequence of steps leaving its value in `result`.
pub(crate) struct Block {
    steps: Vec<Step>,
    result: Slot,
}

impl Block {
    pub(crate) fn new(steps: Vec<Step>, result: Slot) -> Self {
        Self { steps, result }
    }

    #[inline]
    pub(crate) fn result(&self) -> Slot {
        self.result
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn run(&self, frame: &mut Frame, arena: &ExprArena) -> SymResult<()> {
        for step in &self.steps {
            step(frame, arena)?;
        }
        Ok(())
    }

    /// Run the block and return a copy of its result.
    pub(crate) fn eval(&self, frame: &mut Frame, arena: &ExprArena, node: ExprId) -> SymResult<Value> {
        self.run(frame, arena)?;
        frame.read(self.result, node).cloned()
    }
}
