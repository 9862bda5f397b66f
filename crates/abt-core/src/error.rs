use thiserror::Error;

use crate::fact::FactKind;

/// Configuration errors: authoring or host-integration mistakes that are
/// fatal to the agent.
///
/// Expected runtime outcomes (unsatisfied preconditions, failed actions,
/// exhausted goals) are ordinary tree transitions and never surface here.
#[derive(Debug, Error)]
pub enum AbtError {
    #[error("unbound variable `{variable}`")]
    UnboundVariable { variable: &'static str },

    #[error("variable `{variable}` referenced outside of any behavior")]
    NoEnclosingBehavior { variable: &'static str },

    #[error("unknown attribute `{attribute}` on fact kind `{kind}`")]
    UnknownAttribute { kind: FactKind, attribute: String },

    #[error("no computed function registered as `{name}`")]
    UnknownComputed { name: String },

    #[error("computed condition `{name}` did not return a boolean")]
    NonBooleanPredicate { name: String },

    #[error("behavior for goal `{goal}` has no steps")]
    EmptyBehavior { goal: &'static str },

    #[error("parallel behavior for goal `{goal}` needs {needed} successes but has {steps} steps")]
    BadSuccessThreshold {
        goal: &'static str,
        needed: usize,
        steps: usize,
    },
}

impl AbtError {
    pub fn unknown_attribute(kind: FactKind, attribute: &str) -> Self {
        AbtError::UnknownAttribute {
            kind,
            attribute: attribute.to_string(),
        }
    }
}
