//! Backtracking condition matcher.
//!
//! Conditions are evaluated left to right; presence conditions search the
//! fact set depth-first, first satisfying fact wins in enumeration order.
//! Bindings land in the environment as the search commits to a fact and are
//! rolled back before the search moves to a sibling fact, so a failed
//! branch never leaks partial bindings.

use abt_core::{AbtError, Bindings, ComputedRegistry, FactRef, Value, WorkingMemory};
use abt_lang::{AttrTest, Condition, Param};

/// Resolves a template parameter against an environment. Referencing an
/// unbound variable is a configuration error, not a silent failure.
pub fn resolve(param: &Param, env: &Bindings) -> Result<Value, AbtError> {
    match param {
        Param::Literal(value) => Ok(value.clone()),
        Param::Var(name) => env
            .get(name)
            .cloned()
            .ok_or(AbtError::UnboundVariable { variable: *name }),
    }
}

pub fn resolve_params(params: &[Param], env: &Bindings) -> Result<Vec<Value>, AbtError> {
    params.iter().map(|p| resolve(p, env)).collect()
}

/// Searches for a binding of `env` that satisfies every condition,
/// mutating `env` in place on success.
pub fn satisfy(
    wm: &WorkingMemory,
    registry: &mut ComputedRegistry,
    conditions: &[Condition],
    env: &mut Bindings,
) -> Result<bool, AbtError> {
    satisfy_from(wm, registry, conditions, 0, env)
}

/// Consult-only variant: evaluates against a scratch copy so the caller's
/// environment is never mutated. Used by the condition sweep and wait steps.
pub fn check(
    wm: &WorkingMemory,
    registry: &mut ComputedRegistry,
    conditions: &[Condition],
    env: &Bindings,
) -> Result<bool, AbtError> {
    let mut scratch = env.clone();
    satisfy(wm, registry, conditions, &mut scratch)
}

fn satisfy_from(
    wm: &WorkingMemory,
    registry: &mut ComputedRegistry,
    conditions: &[Condition],
    index: usize,
    env: &mut Bindings,
) -> Result<bool, AbtError> {
    let Some(condition) = conditions.get(index) else {
        return Ok(true);
    };

    match condition {
        Condition::Presence {
            kind,
            tests,
            bindings,
            bind_fact,
        } => {
            for fact in wm.query(*kind) {
                if !fact_passes(fact, tests, env)? {
                    continue;
                }

                // Commit this fact's bindings, keeping an undo log in case
                // the rest of the condition list cannot be satisfied.
                let mut undo: Vec<(&'static str, Option<Value>)> = Vec::new();
                let mut bindable = true;
                for &(attribute, variable) in bindings {
                    match fact.attribute(attribute)? {
                        Some(value) => undo.push((variable, env.insert(variable, value))),
                        None => {
                            bindable = false;
                            break;
                        }
                    }
                }
                if bindable {
                    if let Some(variable) = *bind_fact {
                        undo.push((variable, env.insert(variable, Value::Fact(fact.clone()))));
                    }
                    if satisfy_from(wm, registry, conditions, index + 1, env)? {
                        return Ok(true);
                    }
                }
                for (variable, previous) in undo.into_iter().rev() {
                    match previous {
                        Some(value) => env.insert(variable, value),
                        None => env.remove(variable),
                    };
                }
            }
            Ok(false)
        }

        Condition::Absence { kind, tests } => {
            for fact in wm.query(*kind) {
                if fact_passes(fact, tests, env)? {
                    return Ok(false);
                }
            }
            satisfy_from(wm, registry, conditions, index + 1, env)
        }

        Condition::Computed { name, params } => {
            let args = resolve_params(params, env)?;
            if registry.invoke_predicate(name, &args)? {
                satisfy_from(wm, registry, conditions, index + 1, env)
            } else {
                Ok(false)
            }
        }
    }
}

fn fact_passes(fact: &FactRef, tests: &[AttrTest], env: &Bindings) -> Result<bool, AbtError> {
    for test in tests {
        let expected = resolve(&test.value, env)?;
        match fact.attribute(test.attribute)? {
            Some(actual) if test.compare.test(&actual, &expected) => {}
            // A missing value fails the test, never the matcher.
            _ => return Ok(false),
        }
    }
    Ok(true)
}
