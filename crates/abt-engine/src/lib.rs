//! Reactive goal-execution engine.
//!
//! The engine owns a live execution tree (a forest of goal, behavior, and
//! step nodes), a working-memory fact base, and a behavior library. Each
//! call to [`Agent::tick`] runs one decision cycle: sweep context/success
//! conditions, prune finished subtrees, collapse completed nodes into their
//! parents, then expand exactly one open node in priority order.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod executor;
pub mod matcher;
pub mod tree;

pub use agent::{Agent, INITIAL_GOAL};
pub use executor::{ActionExecutor, ActionInvocation, ActionOutcome, ActionStatus};
pub use matcher::{check, satisfy};
pub use tree::{Node, NodeId, NodeKind, NodeStatus, Tree};
