use core::fmt;
use std::any::Any;
use std::rc::Rc;

use crate::error::AbtError;
use crate::value::Value;

/// Stable name for a kind of fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactKind(pub &'static str);

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// An application record the engine can reason about.
///
/// Facts are owned by the working memory; the engine only reads them. A fact
/// is filed under its own kind plus every kind in `ancestors`, so queries
/// for a supertype kind see instances of all matching subtypes.
pub trait Fact: 'static {
    fn kind(&self) -> FactKind;

    /// Supertype kinds this fact is also filed under.
    fn ancestors(&self) -> &[FactKind] {
        &[]
    }

    /// Read a named attribute.
    ///
    /// `Ok(None)` means the attribute exists but currently has no value,
    /// which fails the enclosing condition test. An attribute the fact type
    /// does not have must be reported as an error, never as a silent miss.
    fn attribute(&self, name: &str) -> Result<Option<Value>, AbtError>;

    /// Downcasting hook for hosts that bind whole facts to variables.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a fact. Identity (pointer) equality is the engine's
/// notion of "the same fact".
pub type FactRef = Rc<dyn Fact>;
