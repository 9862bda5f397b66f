//! Core primitives for reactive behavior agents.
//!
//! This crate holds the pieces the engine reasons *with*: runtime values,
//! the working-memory fact base, and the table of host-registered computed
//! functions. It knows nothing about behaviors or the execution tree.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;
pub mod fact;
pub mod registry;
pub mod value;
pub mod wm;

pub use error::AbtError;
pub use fact::{Fact, FactKind, FactRef};
pub use registry::{ComputedFn, ComputedRegistry};
pub use value::{Bindings, Value};
pub use wm::WorkingMemory;
