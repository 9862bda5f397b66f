//! Umbrella crate that re-exports the `abt-*` building blocks.
//!
//! This crate is intended as a convenient entrypoint: working memory and
//! values from [`core`], the behavior-authoring surface from [`lang`], and
//! the agent and its decision cycle from [`engine`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use abt_core as core;

#[cfg(feature = "lang")]
#[cfg_attr(docsrs, doc(cfg(feature = "lang")))]
pub use abt_lang as lang;

#[cfg(feature = "engine")]
#[cfg_attr(docsrs, doc(cfg(feature = "engine")))]
pub use abt_engine as engine;
