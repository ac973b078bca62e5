//! hparams - hierarchical hyperparameters with default/override merging.
//!
//! This library provides the core functionality for hparams, including:
//! - Merging partial overrides into declarative defaults, recursively
//! - Category type checks and the `type`/`kwargs` pairing rule
//! - Name-based access to the merged container
//! - Spec file loading (TOML/JSON) and capture/restore of containers
//!
//! # Example
//!
//! ```no_run
//! use hparams::hparams::MergeOptions;
//! use hparams::persist::capture_to_file;
//! use hparams::spec::load_hparams;
//! use std::path::{Path, PathBuf};
//!
//! let hparams = load_hparams(
//! 	Path::new("defaults.toml"),
//! 	&[PathBuf::from("overrides.json")],
//! 	MergeOptions::default(),
//! )
//! .unwrap();
//!
//! let hidden = hparams.lookup("encoder.kwargs.hidden_size").unwrap();
//! println!("hidden size: {:?}", hidden.as_i64());
//!
//! capture_to_file(&hparams, Path::new("hparams.capture.json")).unwrap();
//! ```

pub mod error;
pub mod hparams;
pub mod persist;
pub mod spec;

pub use error::{HParamsError, Result};
pub use hparams::{CallableRef, Category, HParams, MergeOptions, Spec, Value};
pub use persist::{capture, restore};
