use abt_core::{AbtError, ComputedRegistry, Value};

#[test]
fn registered_functions_are_invoked_with_bound_arguments() {
    let mut registry = ComputedRegistry::new();
    registry.register("double", |args| {
        let n = args[0].as_number().unwrap_or(0.0);
        Ok(Value::Float(n * 2.0))
    });

    let result = registry.invoke("double", &[Value::Int(21)]).unwrap();
    assert_eq!(result, Value::Float(42.0));
}

#[test]
fn unknown_name_is_a_configuration_error() {
    let mut registry = ComputedRegistry::new();
    let err = registry.invoke("missing", &[]).unwrap_err();
    assert!(matches!(err, AbtError::UnknownComputed { .. }));
}

#[test]
fn predicates_must_return_booleans() {
    let mut registry = ComputedRegistry::new();
    registry.register("answer", |_| Ok(Value::Int(42)));
    registry.register_predicate("always", |_| true);

    assert!(registry.invoke_predicate("always", &[]).unwrap());
    let err = registry.invoke_predicate("answer", &[]).unwrap_err();
    assert!(matches!(err, AbtError::NonBooleanPredicate { .. }));
}
