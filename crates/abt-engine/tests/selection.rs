use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use abt_core::{AbtError, Fact, FactKind, Value};
use abt_engine::{ActionExecutor, ActionInvocation, ActionStatus, Agent, INITIAL_GOAL};
use abt_lang::{var, Behavior, BehaviorLibrary, Condition, Param, ParamType, Step};

const ALARM: FactKind = FactKind("alarm");

struct Alarm;

impl Fact for Alarm {
    fn kind(&self) -> FactKind {
        ALARM
    }

    fn attribute(&self, name: &str) -> Result<Option<Value>, AbtError> {
        Err(AbtError::unknown_attribute(ALARM, name))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct Recorder {
    outcomes: BTreeMap<&'static str, ActionStatus>,
    executed: Vec<&'static str>,
    invocations: Vec<ActionInvocation>,
}

impl ActionExecutor for Recorder {
    fn execute(&mut self, action: &ActionInvocation) -> ActionStatus {
        self.executed.push(action.name);
        self.invocations.push(action.clone());
        self.outcomes
            .get(action.name)
            .copied()
            .unwrap_or(ActionStatus::Success)
    }
}

fn patrol_library() -> BehaviorLibrary {
    BehaviorLibrary::new(vec![
        Behavior::sequential(INITIAL_GOAL).steps(vec![Step::subgoal("patrol")]),
        Behavior::sequential("patrol")
            .specificity(5)
            .preconditions(vec![Condition::presence(ALARM)])
            .steps(vec![Step::action("respond")]),
        Behavior::sequential("patrol")
            .specificity(3)
            .steps(vec![Step::action("walk_route")]),
        Behavior::sequential("patrol")
            .specificity(3)
            .steps(vec![Step::action("stand_post")]),
    ])
}

#[test]
fn equal_specificity_falls_back_to_declaration_order() {
    let mut agent = Agent::new(patrol_library(), Recorder::default()).unwrap();

    agent.update().unwrap();

    // The specificity-5 template is gated out by its precondition; of the
    // two specificity-3 templates the first declared wins.
    assert_eq!(agent.executor().executed, ["walk_route"]);
    assert!(agent.is_done());
}

#[test]
fn a_satisfied_precondition_unlocks_the_more_specific_template() {
    let mut agent = Agent::new(patrol_library(), Recorder::default()).unwrap();
    agent.add_fact(Rc::new(Alarm));

    agent.update().unwrap();

    assert_eq!(agent.executor().executed, ["respond"]);
    assert!(agent.is_done());
}

#[test]
fn failed_templates_are_never_retried() {
    let library = BehaviorLibrary::new(vec![
        Behavior::sequential(INITIAL_GOAL).steps(vec![Step::subgoal("patrol")]),
        Behavior::sequential("patrol")
            .specificity(9)
            .steps(vec![Step::action("risky")]),
        Behavior::sequential("patrol").steps(vec![Step::action("safe")]),
    ]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();
    agent
        .executor_mut()
        .outcomes
        .insert("risky", ActionStatus::Failure);

    agent.update().unwrap();

    assert_eq!(agent.executor().executed, ["risky", "safe"]);
    assert!(agent.is_done());
}

#[test]
fn an_exhausted_goal_starves_open() {
    let library = BehaviorLibrary::new(vec![
        Behavior::sequential(INITIAL_GOAL).steps(vec![Step::subgoal("patrol")]),
        Behavior::sequential("patrol").steps(vec![Step::action("flaky")]),
    ]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();
    agent
        .executor_mut()
        .outcomes
        .insert("flaky", ActionStatus::Failure);

    agent.update().unwrap();
    assert_eq!(agent.executor().executed, ["flaky"]);
    assert!(!agent.is_done());

    // Quiescent, not retrying: a further update changes nothing.
    agent.update().unwrap();
    assert_eq!(agent.executor().executed, ["flaky"]);
    assert!(!agent.is_done());

    // The starved goal is still visible in the tree dump.
    let dump = agent.tree().render();
    assert!(dump.contains("Goal: patrol"));
}

#[test]
fn goal_parameters_bind_by_position_and_type() {
    let library = BehaviorLibrary::new(vec![
        Behavior::sequential(INITIAL_GOAL).steps(vec![Step::subgoal("greet")
            .with_params(vec![Param::lit("world"), Param::lit(3)])]),
        // Matches on name and arity but not on parameter types.
        Behavior::sequential("greet")
            .specificity(9)
            .param("who", ParamType::Int)
            .param("times", ParamType::Int)
            .steps(vec![Step::action("never")]),
        Behavior::sequential("greet")
            .param("who", ParamType::Str)
            .param("times", ParamType::Int)
            .steps(vec![Step::action("say").with_params(vec![var("who"), var("times")])]),
    ]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();

    agent.update().unwrap();

    assert_eq!(agent.executor().executed, ["say"]);
    let invocation = &agent.executor().invocations[0];
    assert_eq!(
        invocation.params,
        vec![Value::Str("world".to_string()), Value::Int(3)]
    );
    assert!(agent.is_done());
}

#[test]
fn priorities_order_expansion_between_open_nodes() {
    let library = BehaviorLibrary::new(vec![Behavior::parallel(INITIAL_GOAL).steps(vec![
        Step::action("low").with_priority(1),
        Step::action("high").with_priority(5),
    ])]);
    let mut agent = Agent::new(library, Recorder::default()).unwrap();

    agent.update().unwrap();

    assert_eq!(agent.executor().executed, ["high", "low"]);
    assert!(agent.is_done());
}
