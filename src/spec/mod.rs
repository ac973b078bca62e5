//! Loading hyperparameter specs from files.
//!
//! This module handles:
//! - TOML and JSON spec file parsing
//! - Layering override files on top of a defaults file

pub mod loader;
pub mod parser;

pub use loader::load_hparams;
pub use parser::{SpecFormat, parse_spec_file, parse_spec_str};
