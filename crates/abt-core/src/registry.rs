use std::collections::BTreeMap;

use crate::error::AbtError;
use crate::value::Value;

/// A host-supplied computed function: bound arguments in, value out.
pub type ComputedFn = Box<dyn FnMut(&[Value]) -> Result<Value, AbtError>>;

/// Explicit name → function table for computed conditions and computed-act
/// steps. Replaces reflective method lookup: the host registers everything
/// the behavior library refers to by name.
#[derive(Default)]
pub struct ComputedRegistry {
    fns: BTreeMap<&'static str, ComputedFn>,
}

impl ComputedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &'static str,
        f: impl FnMut(&[Value]) -> Result<Value, AbtError> + 'static,
    ) {
        self.fns.insert(name, Box::new(f));
    }

    /// Convenience for boolean predicates used in computed conditions.
    pub fn register_predicate(
        &mut self,
        name: &'static str,
        mut f: impl FnMut(&[Value]) -> bool + 'static,
    ) {
        self.register(name, move |args| Ok(Value::Bool(f(args))));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fns.contains_key(name)
    }

    /// Invokes a registered function. An unregistered name is a
    /// configuration error, not a condition failure.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, AbtError> {
        let f = self.fns.get_mut(name).ok_or_else(|| AbtError::UnknownComputed {
            name: name.to_string(),
        })?;
        f(args)
    }

    /// Invokes a registered function and requires a boolean result.
    pub fn invoke_predicate(&mut self, name: &str, args: &[Value]) -> Result<bool, AbtError> {
        match self.invoke(name, args)? {
            Value::Bool(b) => Ok(b),
            _ => Err(AbtError::NonBooleanPredicate {
                name: name.to_string(),
            }),
        }
    }
}
