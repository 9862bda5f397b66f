use std::collections::BTreeMap;

use abt_engine::{
    ActionExecutor, ActionInvocation, ActionOutcome, ActionStatus, Agent, NodeId, INITIAL_GOAL,
};
use abt_lang::{Behavior, BehaviorLibrary, Step};

#[derive(Default)]
struct Recorder {
    outcomes: BTreeMap<&'static str, ActionStatus>,
    executed: Vec<&'static str>,
    pending: Vec<(NodeId, &'static str)>,
}

impl ActionExecutor for Recorder {
    fn execute(&mut self, action: &ActionInvocation) -> ActionStatus {
        self.executed.push(action.name);
        let status = self
            .outcomes
            .get(action.name)
            .copied()
            .unwrap_or(ActionStatus::Success);
        if status == ActionStatus::Running {
            self.pending.push((action.node, action.name));
        }
        status
    }
}

fn library(steps: Vec<Step>) -> BehaviorLibrary {
    BehaviorLibrary::new(vec![Behavior::sequential(INITIAL_GOAL).steps(steps)])
}

#[test]
fn steps_run_in_order_and_the_tree_drains() {
    let library = library(vec![
        Step::action("scan"),
        Step::action("aim"),
        Step::action("fire"),
    ]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();

    agent.update().unwrap();

    assert_eq!(agent.executor().executed, ["scan", "aim", "fire"]);
    assert!(agent.is_done());
    assert!(agent.tree().is_empty());
    assert_eq!(agent.tree().render(), "tree is empty\n");
}

#[test]
fn a_failing_step_fails_the_behavior_and_later_steps_never_run() {
    let library = library(vec![
        Step::action("scan"),
        Step::action("jam"),
        Step::action("fire"),
    ]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();
    agent
        .executor_mut()
        .outcomes
        .insert("jam", ActionStatus::Failure);

    agent.update().unwrap();

    assert_eq!(agent.executor().executed, ["scan", "jam"]);
    // The goal reopened but has no untried templates left.
    assert!(!agent.is_done());
}

#[test]
fn running_actions_park_the_tree_until_resolved() {
    let library = library(vec![Step::action("walk"), Step::action("arrive")]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();
    agent
        .executor_mut()
        .outcomes
        .insert("walk", ActionStatus::Running);

    agent.update().unwrap();
    assert_eq!(agent.executor().executed, ["walk"]);
    assert!(!agent.is_done());

    let (node, _) = agent.executor_mut().pending.pop().unwrap();
    assert!(agent.resolve_action(node, ActionOutcome::Success));
    // A second report for the same node is dropped.
    assert!(!agent.resolve_action(node, ActionOutcome::Success));

    agent.update().unwrap();
    assert_eq!(agent.executor().executed, ["walk", "arrive"]);
    assert!(agent.is_done());
}

#[test]
fn succeed_steps_are_instant() {
    let library = library(vec![Step::succeed(), Step::action("after")]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();

    agent.update().unwrap();

    assert_eq!(agent.executor().executed, ["after"]);
    assert!(agent.is_done());
}

#[test]
fn fail_steps_fail_the_behavior_immediately() {
    let library = library(vec![Step::fail(), Step::action("after")]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();

    agent.update().unwrap();

    assert!(agent.executor().executed.is_empty());
    assert!(!agent.is_done());
}
