use core::fmt;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::fact::FactRef;

/// A variable environment: behavior-scoped bindings from variable names to
/// values. Bindings only grow over a node's lifetime; the matcher rolls back
/// its own speculative additions, never committed ones.
pub type Bindings = BTreeMap<&'static str, Value>;

/// A runtime value flowing through conditions, steps, and actions.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Fact(FactRef),
}

impl Value {
    /// Identity equality: same variant and equal payload. Fact handles
    /// compare by pointer identity; `Int` and `Float` are never
    /// identity-equal to each other.
    pub fn identity_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Fact(a), Value::Fact(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Numeric view for ordered comparisons. Only `Int` and `Float` are
    /// numbers; everything else fails the comparison that asked.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_fact(&self) -> Option<&FactRef> {
        match self {
            Value::Fact(fact) => Some(fact),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Fact(_) => "fact",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.identity_eq(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Fact(fact) => write!(f, "<{}>", fact.kind()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<FactRef> for Value {
    fn from(value: FactRef) -> Self {
        Value::Fact(value)
    }
}
