use abt_core::{AbtError, Bindings, FactKind, Value};

use crate::condition::Condition;
use crate::step::Step;

/// How a behavior schedules its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Steps are scheduled one at a time, in order.
    Sequential,
    /// All steps are scheduled at once and pursued concurrently.
    Parallel,
}

/// Declared type of a behavior signature parameter, matched against the
/// runtime type of the bound actual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    Float,
    Str,
    /// A fact handle whose kind is (or descends from) the given kind.
    Fact(FactKind),
}

impl ParamType {
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (ParamType::Bool, Value::Bool(_)) => true,
            (ParamType::Int, Value::Int(_)) => true,
            (ParamType::Float, Value::Float(_)) => true,
            (ParamType::Str, Value::Str(_)) => true,
            (ParamType::Fact(kind), Value::Fact(fact)) => {
                fact.kind() == kind || fact.ancestors().contains(&kind)
            }
            _ => false,
        }
    }
}

/// A behavior template: the recipe for accomplishing one goal.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub goal: &'static str,
    pub mode: ExecutionMode,
    /// Ordered signature: parameter name and declared type.
    pub params: Vec<(&'static str, ParamType)>,
    /// Higher specificity is tried first among behaviors for the same goal.
    pub specificity: i32,
    pub steps: Vec<Step>,
    /// Gate to attempt the behavior at all.
    pub preconditions: Vec<Condition>,
    /// Must remain true while executing; violation fails the behavior.
    pub context_conditions: Vec<Condition>,
    /// True at any time succeeds the behavior regardless of steps.
    pub success_conditions: Vec<Condition>,
    /// Parallel only: successes required (default: all steps).
    pub needed_for_success: Option<usize>,
}

impl Behavior {
    fn new(goal: &'static str, mode: ExecutionMode) -> Self {
        Self {
            goal,
            mode,
            params: Vec::new(),
            specificity: 0,
            steps: Vec::new(),
            preconditions: Vec::new(),
            context_conditions: Vec::new(),
            success_conditions: Vec::new(),
            needed_for_success: None,
        }
    }

    pub fn sequential(goal: &'static str) -> Self {
        Self::new(goal, ExecutionMode::Sequential)
    }

    pub fn parallel(goal: &'static str) -> Self {
        Self::new(goal, ExecutionMode::Parallel)
    }

    pub fn param(mut self, name: &'static str, ty: ParamType) -> Self {
        self.params.push((name, ty));
        self
    }

    pub fn specificity(mut self, specificity: i32) -> Self {
        self.specificity = specificity;
        self
    }

    pub fn steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    pub fn preconditions(mut self, conditions: Vec<Condition>) -> Self {
        self.preconditions = conditions;
        self
    }

    pub fn context_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.context_conditions = conditions;
        self
    }

    pub fn success_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.success_conditions = conditions;
        self
    }

    pub fn needed_for_success(mut self, needed: usize) -> Self {
        self.needed_for_success = Some(needed);
        self
    }

    /// Signature match: goal name, arity, and the runtime type of every
    /// bound actual.
    pub fn matches_signature(&self, goal: &str, actuals: &[Value]) -> bool {
        if self.goal != goal || actuals.len() != self.params.len() {
            return false;
        }
        self.params
            .iter()
            .zip(actuals)
            .all(|((_, ty), value)| ty.matches(value))
    }

    /// Binds goal actuals to the signature's parameter names, producing the
    /// seed environment for a fresh behavior instance.
    pub fn bind_parameters(&self, actuals: &[Value]) -> Bindings {
        self.params
            .iter()
            .zip(actuals)
            .map(|((name, _), value)| (*name, value.clone()))
            .collect()
    }
}

/// The immutable, pre-authored list of behavior templates. Declaration
/// order is the deterministic tiebreak between equal specificities.
#[derive(Debug, Clone, Default)]
pub struct BehaviorLibrary {
    behaviors: Vec<Behavior>,
}

impl BehaviorLibrary {
    pub fn new(behaviors: Vec<Behavior>) -> Self {
        Self { behaviors }
    }

    pub fn push(&mut self, behavior: Behavior) {
        self.behaviors.push(behavior);
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn get(&self, index: usize) -> Option<&Behavior> {
        self.behaviors.get(index)
    }

    /// Rejects templates the engine could not execute: zero-step behaviors
    /// and parallel success thresholds outside `1..=steps`.
    pub fn validate(&self) -> Result<(), AbtError> {
        for behavior in &self.behaviors {
            if behavior.steps.is_empty() {
                return Err(AbtError::EmptyBehavior {
                    goal: behavior.goal,
                });
            }
            if let Some(needed) = behavior.needed_for_success {
                if needed == 0 || needed > behavior.steps.len() {
                    return Err(AbtError::BadSuccessThreshold {
                        goal: behavior.goal,
                        needed,
                        steps: behavior.steps.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Library indices of templates whose signature matches, sorted by
    /// descending specificity with declaration order breaking ties.
    pub fn matching(&self, goal: &str, actuals: &[Value]) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .behaviors
            .iter()
            .enumerate()
            .filter(|(_, b)| b.matches_signature(goal, actuals))
            .map(|(i, _)| i)
            .collect();
        indices.sort_by_key(|&i| (-self.behaviors[i].specificity, i));
        indices
    }
}
