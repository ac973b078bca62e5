//! The hyperparameter container and its merge engine.
//!
//! This module handles:
//! - Hyperparameter values and their type-check categories
//! - Merging overrides into defaults, including `type`/`kwargs` pairing
//! - Name-based access to the merged result

pub mod container;
pub mod merge;
pub mod value;

pub use container::HParams;
pub use merge::{KWARGS_KEY, MergeOptions, TYPE_KEY, merge, merge_layers};
pub use value::{CALLABLE_PREFIX, CallableRef, Category, Spec, Value};
