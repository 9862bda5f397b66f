use abt_core::{AbtError, Value};
use abt_lang::{Behavior, BehaviorLibrary, ParamType, Step};

fn noop(goal: &'static str) -> Behavior {
    Behavior::sequential(goal).steps(vec![Step::succeed()])
}

#[test]
fn signature_match_checks_name_arity_and_types() {
    let b = Behavior::sequential("attack")
        .param("target", ParamType::Int)
        .param("force", ParamType::Float)
        .steps(vec![Step::succeed()]);

    assert!(b.matches_signature("attack", &[Value::Int(3), Value::Float(0.5)]));
    assert!(!b.matches_signature("attack", &[Value::Int(3)]));
    assert!(!b.matches_signature("attack", &[Value::Float(3.0), Value::Float(0.5)]));
    assert!(!b.matches_signature("defend", &[Value::Int(3), Value::Float(0.5)]));
}

#[test]
fn bound_parameters_seed_the_environment_in_signature_order() {
    let b = Behavior::sequential("attack")
        .param("target", ParamType::Int)
        .steps(vec![Step::succeed()]);

    let env = b.bind_parameters(&[Value::Int(7)]);
    assert_eq!(env.get("target"), Some(&Value::Int(7)));
}

#[test]
fn matching_sorts_by_specificity_then_declaration_order() {
    let library = BehaviorLibrary::new(vec![
        noop("move").specificity(1),
        noop("move").specificity(3),
        noop("move").specificity(3),
        noop("halt"),
    ]);

    assert_eq!(library.matching("move", &[]), vec![1, 2, 0]);
}

#[test]
fn validate_rejects_zero_step_behaviors() {
    let library = BehaviorLibrary::new(vec![Behavior::sequential("idle")]);
    assert!(matches!(
        library.validate(),
        Err(AbtError::EmptyBehavior { goal: "idle" })
    ));
}

#[test]
fn validate_rejects_out_of_range_success_thresholds() {
    let library = BehaviorLibrary::new(vec![Behavior::parallel("swarm")
        .steps(vec![Step::action("a"), Step::action("b")])
        .needed_for_success(3)]);
    assert!(matches!(
        library.validate(),
        Err(AbtError::BadSuccessThreshold { needed: 3, steps: 2, .. })
    ));
}
