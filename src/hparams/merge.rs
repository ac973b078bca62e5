//! Default/override merging.
//!
//! Merge rules, applied at every nesting level:
//! - Names only in the defaults keep their default value
//! - Mappings merge recursively (override keys win)
//! - Other values are replaced after a category check
//! - Names only in the overrides are rejected, except `kwargs`
//! - `kwargs` reuses the default entries only while `type` is unchanged

use crate::error::{HParamsError, Result};
use crate::hparams::container::HParams;
use crate::hparams::value::{Category, Spec, Value};
use indexmap::IndexMap;
use log::{debug, trace, warn};

/// Name of the hyperparameter selecting a class or function to build.
pub const TYPE_KEY: &str = "type";

/// Name of the constructor arguments paired with [`TYPE_KEY`].
pub const KWARGS_KEY: &str = "kwargs";

/// Options controlling how overrides are merged.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
	/// Accept override names missing from the defaults instead of failing.
	pub allow_new_hparam: bool,
}

/// Merge `overrides` into `defaults`, producing a container.
///
/// With no overrides the result is exactly `defaults`, with every mapping
/// wrapped into a nested container. Nothing is returned unless every
/// override passed validation.
pub fn merge(
	overrides: Option<&Spec>,
	defaults: Option<&Spec>,
	options: MergeOptions,
) -> Result<HParams> {
	let defaults = defaults.ok_or(HParamsError::MissingDefaults)?;
	merge_node(overrides, defaults, options, "")
}

/// Apply override layers in order, each on top of the previous result.
///
/// Later layers win. The `type`/`kwargs` pairing is evaluated per layer, so a
/// layer that changes `type` drops the `kwargs` built up by earlier layers.
pub fn merge_layers(defaults: &Spec, layers: &[Spec], options: MergeOptions) -> Result<HParams> {
	let mut merged = merge(None, Some(defaults), options)?;

	for (i, layer) in layers.iter().enumerate() {
		debug!("applying override layer {} of {}", i + 1, layers.len());
		merged = merge(Some(layer), Some(&merged.to_mapping()), options)?;
	}

	Ok(merged)
}

fn merge_node(
	overrides: Option<&Spec>,
	defaults: &Spec,
	options: MergeOptions,
	prefix: &str,
) -> Result<HParams> {
	let Some(overrides) = overrides else {
		return Ok(HParams::wrap(defaults.clone()));
	};

	debug!(
		"merging {} override(s) into {} default(s) at '{}'",
		overrides.len(),
		defaults.len(),
		display_prefix(prefix)
	);

	let mut merged = IndexMap::with_capacity(defaults.len());

	for (name, default_value) in defaults {
		let path = join_path(prefix, name);
		let value = if name == KWARGS_KEY {
			merge_kwargs(overrides, defaults, options, &path)?
		} else {
			match overrides.get(name) {
				Some(override_value) => {
					merge_value(&path, override_value, default_value, options)?
				}
				None => default_value.clone().wrap(),
			}
		};
		merged.insert(name.clone(), value);
	}

	for (name, override_value) in overrides {
		if defaults.contains_key(name) {
			continue;
		}

		let path = join_path(prefix, name);
		let value = if name == KWARGS_KEY {
			merge_kwargs(overrides, defaults, options, &path)?
		} else if options.allow_new_hparam {
			debug!("accepting new hyperparameter '{path}'");
			override_value.clone().wrap()
		} else {
			return Err(HParamsError::UnknownHyperparameter { name: path });
		};
		merged.insert(name.clone(), value);
	}

	Ok(HParams::from_entries(merged))
}

/// Merge a single overridden value against its default.
fn merge_value(
	path: &str,
	override_value: &Value,
	default_value: &Value,
	options: MergeOptions,
) -> Result<Value> {
	if let Some(default_spec) = default_value.as_spec() {
		if override_value.is_none() {
			return Ok(default_value.clone().wrap());
		}
		let override_spec = override_value
			.as_spec()
			.ok_or_else(|| type_mismatch(path, default_value, override_value))?;
		let nested = merge_node(Some(&*override_spec), &default_spec, options, path)?;
		return Ok(Value::Nested(nested));
	}

	check_category(path, override_value, default_value)?;

	Ok(override_value.clone().wrap())
}

/// Resolve `kwargs` for a node from its `type` and `kwargs` entries.
fn merge_kwargs(
	overrides: &Spec,
	defaults: &Spec,
	options: MergeOptions,
	path: &str,
) -> Result<Value> {
	let default_kwargs = defaults.get(KWARGS_KEY);
	let override_kwargs = overrides.get(KWARGS_KEY);

	// A scalar default `kwargs` is an ordinary hyperparameter.
	if let Some(default_value) = default_kwargs
		&& !default_value.is_none()
		&& !default_value.is_mapping()
	{
		return match override_kwargs {
			Some(override_value) => {
				merge_value(path, override_value, default_value, options)
			}
			None => Ok(default_value.clone()),
		};
	}

	if override_kwargs.is_none() && default_kwargs.is_some_and(Value::is_none) {
		return Ok(Value::None);
	}

	let type_changed = match overrides.get(TYPE_KEY) {
		Some(override_type) => defaults.get(TYPE_KEY) != Some(override_type),
		None => false,
	};

	let mut kwargs = Spec::new();
	if let Some(default_spec) = default_kwargs.and_then(Value::as_spec) {
		if type_changed {
			if !default_spec.is_empty() {
				warn!("'{path}': type changed, discarding {} default kwarg(s)", default_spec.len());
			}
		} else {
			kwargs = default_spec.into_owned();
		}
	}

	match override_kwargs {
		None | Some(Value::None) => {}
		Some(override_value) => {
			let override_spec = override_value.as_spec().ok_or_else(|| {
				HParamsError::TypeMismatch {
					name: path.to_string(),
					expected: "mapping",
					found: override_value.type_name(),
				}
			})?;
			for (key, value) in override_spec.into_owned() {
				kwargs.insert(key, value);
			}
		}
	}

	trace!("'{path}' resolved to {} kwarg(s)", kwargs.len());
	Ok(Value::Nested(HParams::wrap(kwargs)))
}

/// Check that an override falls into a category its default accepts.
fn check_category(path: &str, override_value: &Value, default_value: &Value) -> Result<()> {
	let expected = default_value.category();
	let found = override_value.category();
	trace!("type check '{path}': default {expected:?}, override {found:?}");

	if expected == Category::None || found == Category::None || expected == found {
		return Ok(());
	}

	Err(type_mismatch(path, default_value, override_value))
}

fn type_mismatch(path: &str, default_value: &Value, override_value: &Value) -> HParamsError {
	HParamsError::TypeMismatch {
		name: path.to_string(),
		expected: default_value.type_name(),
		found: override_value.type_name(),
	}
}

fn join_path(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		name.to_string()
	} else {
		format!("{prefix}.{name}")
	}
}

fn display_prefix(prefix: &str) -> &str {
	if prefix.is_empty() { "<root>" } else { prefix }
}
