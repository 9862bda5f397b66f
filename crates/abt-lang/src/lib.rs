//! Authoring data model for reactive behavior libraries.
//!
//! Behaviors, steps, and conditions here are immutable templates: the host
//! builds them once, hands them to an engine, and the engine instantiates
//! tree nodes from them at run time. Nothing in this crate executes.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod behavior;
pub mod condition;
pub mod param;
pub mod step;

pub use behavior::{Behavior, BehaviorLibrary, ExecutionMode, ParamType};
pub use condition::{AttrTest, Compare, Condition};
pub use param::{var, Param};
pub use step::{Step, StepKind, StepModifier};
