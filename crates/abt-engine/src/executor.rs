use abt_core::Value;

use crate::tree::NodeId;

/// Final outcome of a primitive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    Failure,
}

/// Status an executor reports for a dispatched action. `Running` means the
/// action will be resolved later via [`crate::Agent::resolve_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Success,
    Failure,
}

impl From<ActionOutcome> for ActionStatus {
    fn from(value: ActionOutcome) -> Self {
        match value {
            ActionOutcome::Success => ActionStatus::Success,
            ActionOutcome::Failure => ActionStatus::Failure,
        }
    }
}

impl ActionStatus {
    pub fn outcome(self) -> Option<ActionOutcome> {
        match self {
            ActionStatus::Running => None,
            ActionStatus::Success => Some(ActionOutcome::Success),
            ActionStatus::Failure => Some(ActionOutcome::Failure),
        }
    }
}

/// A primitive action handed to the executor: the tree node it came from,
/// the action name, and its fully bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInvocation {
    pub node: NodeId,
    pub name: &'static str,
    pub params: Vec<Value>,
}

/// The external collaborator that performs primitive actions.
pub trait ActionExecutor {
    /// Called exactly once when an action node starts executing. Returning
    /// a terminal status completes the node synchronously; returning
    /// `Running` leaves it executing until the host calls
    /// [`crate::Agent::resolve_action`].
    fn execute(&mut self, action: &ActionInvocation) -> ActionStatus;

    /// Called when a subtree containing this executing action is pruned.
    /// The node is already discarded; the executor should stop physical
    /// effects but need not report a status.
    fn abort(&mut self, _action: &ActionInvocation) {}
}
