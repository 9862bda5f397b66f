use abt_core::Value;

/// A template parameter: either a literal value or a reference to a
/// behavior-scoped variable, resolved at expansion time.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Literal(Value),
    Var(&'static str),
}

impl Param {
    pub fn lit(value: impl Into<Value>) -> Self {
        Param::Literal(value.into())
    }
}

/// Shorthand for a variable reference.
pub fn var(name: &'static str) -> Param {
    Param::Var(name)
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Literal(value)
    }
}

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for Param {
            fn from(value: $ty) -> Self {
                Param::Literal(value.into())
            }
        })*
    };
}

literal_from!(bool, i32, i64, f64, &'static str, String, abt_core::FactRef);
