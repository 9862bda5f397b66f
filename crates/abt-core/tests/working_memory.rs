use std::any::Any;
use std::rc::Rc;

use abt_core::{AbtError, Fact, FactKind, FactRef, Value, WorkingMemory};

const UNIT: FactKind = FactKind("unit");
const MARINE: FactKind = FactKind("marine");
const BULLET: FactKind = FactKind("bullet");

struct Marine {
    health: i64,
}

impl Fact for Marine {
    fn kind(&self) -> FactKind {
        MARINE
    }

    fn ancestors(&self) -> &[FactKind] {
        &[UNIT]
    }

    fn attribute(&self, name: &str) -> Result<Option<Value>, AbtError> {
        match name {
            "health" => Ok(Some(Value::Int(self.health))),
            _ => Err(AbtError::unknown_attribute(self.kind(), name)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Bullet;

impl Fact for Bullet {
    fn kind(&self) -> FactKind {
        BULLET
    }

    fn attribute(&self, name: &str) -> Result<Option<Value>, AbtError> {
        Err(AbtError::unknown_attribute(self.kind(), name))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn facts_are_filed_under_their_kind_and_ancestors() {
    let mut wm = WorkingMemory::new();
    let marine: FactRef = Rc::new(Marine { health: 80 });
    wm.add(marine.clone());

    assert_eq!(wm.count(MARINE), 1);
    assert_eq!(wm.count(UNIT), 1);
    assert!(Rc::ptr_eq(&wm.query(UNIT)[0], &marine));
}

#[test]
fn query_for_unknown_kind_is_empty_not_an_error() {
    let wm = WorkingMemory::new();
    assert!(wm.query(BULLET).is_empty());
}

#[test]
fn duplicate_add_is_ignored() {
    let mut wm = WorkingMemory::new();
    let bullet: FactRef = Rc::new(Bullet);
    wm.add(bullet.clone());
    wm.add(bullet);

    assert_eq!(wm.count(BULLET), 1);
}

#[test]
fn remove_unfiles_from_every_kind() {
    let mut wm = WorkingMemory::new();
    let marine: FactRef = Rc::new(Marine { health: 80 });
    let other: FactRef = Rc::new(Marine { health: 20 });
    wm.add(marine.clone());
    wm.add(other);

    wm.remove(&marine);

    assert_eq!(wm.count(MARINE), 1);
    assert_eq!(wm.count(UNIT), 1);
    assert!(!wm.query(UNIT).iter().any(|f| Rc::ptr_eq(f, &marine)));
}

#[test]
fn dump_lists_kinds_and_counts() {
    let mut wm = WorkingMemory::new();
    wm.add(Rc::new(Marine { health: 80 }));
    wm.add(Rc::new(Bullet));

    let dump = wm.dump();
    assert!(dump.contains("marine: 1"));
    assert!(dump.contains("unit: 1"));
    assert!(dump.contains("bullet: 1"));
}

#[test]
fn unknown_attribute_is_a_loud_error() {
    let marine = Marine { health: 80 };
    let err = marine.attribute("armor").unwrap_err();
    assert!(matches!(err, AbtError::UnknownAttribute { .. }));
}
