use smallvec::SmallVec;

use crate::{expr::VarId, value::Value};

/// Immutable binding of free variables to concrete values.
///
/// Functions have at most a handful of parameters, so bindings are a short inline vector
/// scanned linearly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    bindings: SmallVec<[(VarId, Value); 4]>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this environment with `var` bound to `value`, shadowing any previous binding.
    pub fn with(&self, var: VarId, value: Value) -> Self {
        let mut bindings = self.bindings.clone();
        bindings.retain(|(bound, _)| *bound != var);
        bindings.push((var, value));
        Self { bindings }
    }

    pub fn get(&self, var: VarId) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == var)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Value)> {
        self.bindings.iter().map(|(var, value)| (*var, value))
    }
}

impl FromIterator<(VarId, Value)> for Environment {
    fn from_iter<T: IntoIterator<Item = (VarId, Value)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Environment::new(), |env, (var, value)| env.with(var, value))
    }
}
