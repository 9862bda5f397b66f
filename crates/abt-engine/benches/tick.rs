use std::any::Any;
use std::rc::Rc;

use abt_core::{AbtError, ComputedRegistry, Fact, FactKind, Value, WorkingMemory};
use abt_engine::{satisfy, ActionExecutor, ActionInvocation, ActionStatus, Agent, INITIAL_GOAL};
use abt_lang::{Behavior, BehaviorLibrary, Condition, Step, StepModifier};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

struct AlwaysSucceed;

impl ActionExecutor for AlwaysSucceed {
    fn execute(&mut self, _action: &ActionInvocation) -> ActionStatus {
        ActionStatus::Success
    }
}

const MARKER: FactKind = FactKind("marker");

struct Marker {
    id: i64,
}

impl Fact for Marker {
    fn kind(&self) -> FactKind {
        MARKER
    }

    fn attribute(&self, name: &str) -> Result<Option<Value>, AbtError> {
        match name {
            "id" => Ok(Some(Value::Int(self.id))),
            _ => Err(AbtError::unknown_attribute(MARKER, name)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn bench_agent_tick(c: &mut Criterion) {
    let library = BehaviorLibrary::new(vec![Behavior::sequential(INITIAL_GOAL).steps(vec![
        Step::action("noop").with_modifier(StepModifier::Persistent),
    ])]);

    // A persistent synchronous action keeps the tree cycling forever, so
    // every tick performs one expand/collapse unit of work.
    let mut agent = Agent::new(library, AlwaysSucceed).expect("library is valid");
    c.bench_function("abt-engine/tick(persistent-action)", |b| {
        b.iter(|| {
            let changed = agent.tick().expect("no configuration errors");
            black_box(changed);
        })
    });
}

fn bench_matcher_satisfy(c: &mut Criterion) {
    let mut wm = WorkingMemory::new();
    for id in 0..64 {
        wm.add(Rc::new(Marker { id }));
    }
    let mut registry = ComputedRegistry::new();
    let conditions = vec![Condition::presence(MARKER)
        .test("id", abt_lang::Compare::Eq, 63)
        .bind("id", "found")];

    c.bench_function("abt-engine/satisfy(facts=64)", |b| {
        b.iter(|| {
            let mut env = abt_core::Bindings::new();
            let hit = satisfy(&wm, &mut registry, &conditions, &mut env)
                .expect("no configuration errors");
            black_box(hit);
        })
    });
}

criterion_group!(benches, bench_agent_tick, bench_matcher_satisfy);
criterion_main!(benches);
