use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::fact::{FactKind, FactRef};

/// Working memory: the typed multi-map of live facts.
///
/// A fact is filed under its own kind and every ancestor kind it declares,
/// so a query for a supertype kind returns instances of all matching
/// subtypes. Pure storage; queries reflect mutations only through fresh
/// calls, and callers must not rely on enumeration order.
#[derive(Default)]
pub struct WorkingMemory {
    facts: BTreeMap<FactKind, Vec<FactRef>>,
}

impl WorkingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fact under its kind and all ancestor kinds. Adding the same
    /// fact handle twice is ignored.
    pub fn add(&mut self, fact: FactRef) {
        for kind in Self::filed_kinds(&fact) {
            let bucket = self.facts.entry(kind).or_default();
            if !bucket.iter().any(|f| Rc::ptr_eq(f, &fact)) {
                bucket.push(fact.clone());
            }
        }
    }

    /// Removes a fact (by handle identity) from every kind it was filed
    /// under. Removing an absent fact is a no-op.
    pub fn remove(&mut self, fact: &FactRef) {
        for kind in Self::filed_kinds(fact) {
            if let Some(bucket) = self.facts.get_mut(&kind) {
                bucket.retain(|f| !Rc::ptr_eq(f, fact));
            }
        }
    }

    /// All facts currently filed under `kind`. Unknown kinds yield an empty
    /// slice, not an error.
    pub fn query(&self, kind: FactKind) -> &[FactRef] {
        self.facts.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, kind: FactKind) -> usize {
        self.query(kind).len()
    }

    /// Renders the contents for debugging.
    pub fn dump(&self) -> String {
        let mut out = String::from("working memory\n");
        for (kind, bucket) in &self.facts {
            let _ = writeln!(out, "  {kind}: {}", bucket.len());
        }
        out
    }

    fn filed_kinds(fact: &FactRef) -> impl Iterator<Item = FactKind> + '_ {
        std::iter::once(fact.kind()).chain(fact.ancestors().iter().copied())
    }
}
