use crate::condition::Condition;
use crate::param::Param;

/// Alters how a step's terminal outcome is interpreted by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepModifier {
    #[default]
    None,
    /// Re-open forever, ignoring the wrapped step's outcome.
    Persistent,
    /// Treat failure as success.
    IgnoreFailure,
    /// Retry until the step succeeds, then stop.
    PersistentWhenFails,
    /// Repeat while the step succeeds, stop on first failure.
    PersistentWhenSucceeds,
}

/// What a step does when instantiated in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// Dispatch a primitive action to the external executor.
    Act { name: &'static str, params: Vec<Param> },
    /// Pursue a goal under the current behavior.
    Subgoal { goal: &'static str, params: Vec<Param> },
    /// Pursue a goal as a new independent root; never blocks this behavior.
    Spawngoal { goal: &'static str, params: Vec<Param> },
    /// Suspend until the conditions hold.
    Wait { conditions: Vec<Condition> },
    /// Terminal success.
    Succeed,
    /// Terminal failure.
    Fail,
    /// Invoke a registered function; optionally bind its result, then
    /// succeed.
    ComputedAct {
        name: &'static str,
        params: Vec<Param>,
        bind_result: Option<&'static str>,
    },
}

/// One unit inside a behavior: a step kind plus an optional explicit
/// priority (otherwise the enclosing behavior's) and one modifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub priority: Option<i32>,
    pub modifier: StepModifier,
}

impl Step {
    fn new(kind: StepKind) -> Self {
        Self {
            kind,
            priority: None,
            modifier: StepModifier::None,
        }
    }

    pub fn action(name: &'static str) -> Self {
        Self::new(StepKind::Act {
            name,
            params: Vec::new(),
        })
    }

    pub fn subgoal(goal: &'static str) -> Self {
        Self::new(StepKind::Subgoal {
            goal,
            params: Vec::new(),
        })
    }

    pub fn spawngoal(goal: &'static str) -> Self {
        Self::new(StepKind::Spawngoal {
            goal,
            params: Vec::new(),
        })
    }

    pub fn wait(conditions: Vec<Condition>) -> Self {
        Self::new(StepKind::Wait { conditions })
    }

    pub fn succeed() -> Self {
        Self::new(StepKind::Succeed)
    }

    pub fn fail() -> Self {
        Self::new(StepKind::Fail)
    }

    pub fn computed(name: &'static str) -> Self {
        Self::new(StepKind::ComputedAct {
            name,
            params: Vec::new(),
            bind_result: None,
        })
    }

    /// Sets the parameters of an action, subgoal, spawngoal, or computed act.
    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        match &mut self.kind {
            StepKind::Act { params: slot, .. }
            | StepKind::Subgoal { params: slot, .. }
            | StepKind::Spawngoal { params: slot, .. }
            | StepKind::ComputedAct { params: slot, .. } => *slot = params,
            _ => panic!("this step kind takes no parameters"),
        }
        self
    }

    /// Binds a computed act's result to a behavior variable.
    pub fn bind_result(mut self, variable: &'static str) -> Self {
        match &mut self.kind {
            StepKind::ComputedAct { bind_result, .. } => *bind_result = Some(variable),
            _ => panic!("only computed acts bind a result"),
        }
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_modifier(mut self, modifier: StepModifier) -> Self {
        self.modifier = modifier;
        self
    }
}
