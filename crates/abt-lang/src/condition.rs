use abt_core::{FactKind, Value};

use crate::param::Param;

/// Comparison operator in a condition test.
///
/// `Equals`/`NotEquals` use identity equality and work on any value.
/// The lowercase-style numeric operators are restricted to Int/Float
/// operands; comparing incompatible types or a missing value fails the
/// test rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    Equals,
    NotEquals,
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Compare {
    /// Tests a fact attribute value against a resolved comparand.
    pub fn test(self, actual: &Value, expected: &Value) -> bool {
        match self {
            Compare::Equals => actual.identity_eq(expected),
            Compare::NotEquals => !actual.identity_eq(expected),
            numeric => {
                let (Some(a), Some(b)) = (actual.as_number(), expected.as_number()) else {
                    return false;
                };
                match numeric {
                    Compare::Eq => a == b,
                    Compare::Neq => a != b,
                    Compare::Gt => a > b,
                    Compare::Gte => a >= b,
                    Compare::Lt => a < b,
                    Compare::Lte => a <= b,
                    Compare::Equals | Compare::NotEquals => unreachable!(),
                }
            }
        }
    }
}

/// A single attribute test, e.g. `health < 40`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrTest {
    pub attribute: &'static str,
    pub compare: Compare,
    pub value: Param,
}

/// A condition template evaluated against working memory.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Some fact of `kind` passes every test; optionally binds attributes
    /// and/or the whole fact into the variable environment.
    Presence {
        kind: FactKind,
        tests: Vec<AttrTest>,
        bindings: Vec<(&'static str, &'static str)>,
        bind_fact: Option<&'static str>,
    },
    /// No fact of `kind` passes the tests. Introduces no bindings.
    Absence { kind: FactKind, tests: Vec<AttrTest> },
    /// A registered predicate invoked with bound arguments; must yield a
    /// boolean.
    Computed { name: &'static str, params: Vec<Param> },
}

impl Condition {
    pub fn presence(kind: FactKind) -> Self {
        Condition::Presence {
            kind,
            tests: Vec::new(),
            bindings: Vec::new(),
            bind_fact: None,
        }
    }

    pub fn absence(kind: FactKind) -> Self {
        Condition::Absence {
            kind,
            tests: Vec::new(),
        }
    }

    pub fn computed(name: &'static str) -> Self {
        Condition::Computed {
            name,
            params: Vec::new(),
        }
    }

    /// Adds an attribute test. Presence and absence conditions only.
    pub fn test(mut self, attribute: &'static str, compare: Compare, value: impl Into<Param>) -> Self {
        let test = AttrTest {
            attribute,
            compare,
            value: value.into(),
        };
        match &mut self {
            Condition::Presence { tests, .. } | Condition::Absence { tests, .. } => tests.push(test),
            Condition::Computed { .. } => {
                panic!("computed conditions take params, not attribute tests")
            }
        }
        self
    }

    /// Binds a fact attribute to a behavior variable on match. Presence only.
    pub fn bind(mut self, attribute: &'static str, variable: &'static str) -> Self {
        match &mut self {
            Condition::Presence { bindings, .. } => bindings.push((attribute, variable)),
            _ => panic!("only presence conditions bind attributes"),
        }
        self
    }

    /// Binds the matched fact itself to a behavior variable. Presence only.
    pub fn bind_fact(mut self, variable: &'static str) -> Self {
        match &mut self {
            Condition::Presence { bind_fact, .. } => *bind_fact = Some(variable),
            _ => panic!("only presence conditions bind the matched fact"),
        }
        self
    }

    /// Sets the arguments of a computed condition.
    pub fn params(mut self, params: Vec<Param>) -> Self {
        match &mut self {
            Condition::Computed { params: slot, .. } => *slot = params,
            _ => panic!("only computed conditions take params"),
        }
        self
    }
}
