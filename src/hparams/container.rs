use crate::error::{HParamsError, Result};
use crate::hparams::merge::{MergeOptions, merge};
use crate::hparams::value::{Spec, Value};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A merged, validated set of hyperparameters.
///
/// Built from a default [`Spec`] and optional overrides (see [`merge`]).
/// Nested mappings are stored as nested `HParams`, each exclusively owned by
/// its parent.
///
/// # Example
///
/// ```
/// use hparams::{HParams, Spec, Value};
///
/// let defaults: Spec = [
/// 	("str".to_string(), Value::from("str")),
/// 	("dict".to_string(), Value::map([("k1", "v1"), ("k2", "v2")])),
/// ]
/// .into_iter()
/// .collect();
/// let overrides: Spec = [("dict".to_string(), Value::map([("k1", "new")]))]
/// 	.into_iter()
/// 	.collect();
///
/// let hparams = HParams::new(Some(&overrides), &defaults).unwrap();
/// assert_eq!(hparams.lookup("dict.k1").unwrap(), &Value::from("new"));
/// assert_eq!(hparams.lookup("dict.k2").unwrap(), &Value::from("v2"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HParams {
	hparams: IndexMap<String, Value>,
}

impl HParams {
	/// Merge `overrides` into `defaults`, rejecting unknown names.
	pub fn new(overrides: Option<&Spec>, defaults: &Spec) -> Result<Self> {
		merge(overrides, Some(defaults), MergeOptions::default())
	}

	/// Merge `overrides` into `defaults` with explicit merge options.
	pub fn with_options(
		overrides: Option<&Spec>,
		defaults: &Spec,
		options: MergeOptions,
	) -> Result<Self> {
		merge(overrides, Some(defaults), options)
	}

	/// Build a container from already-merged entries.
	pub(crate) fn from_entries(hparams: IndexMap<String, Value>) -> Self {
		HParams { hparams }
	}

	/// Wrap a raw spec as-is, turning every mapping into a nested container.
	pub(crate) fn wrap(spec: Spec) -> Self {
		HParams {
			hparams: spec.into_iter().map(|(k, v)| (k, v.wrap())).collect(),
		}
	}

	/// Get a hyperparameter by name.
	pub fn get(&self, name: &str) -> Result<&Value> {
		self.hparams
			.get(name)
			.ok_or_else(|| HParamsError::UnknownHyperparameter {
				name: name.to_string(),
			})
	}

	pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
		self.hparams
			.get_mut(name)
			.ok_or_else(|| HParamsError::UnknownHyperparameter {
				name: name.to_string(),
			})
	}

	/// Get a hyperparameter, falling back to `default` if it does not exist.
	pub fn get_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
		self.hparams.get(name).unwrap_or(default)
	}

	/// Get a nested container by name.
	pub fn nested(&self, name: &str) -> Result<&HParams> {
		self.get(name)?
			.as_nested()
			.ok_or_else(|| HParamsError::NotNested {
				name: name.to_string(),
			})
	}

	pub fn nested_mut(&mut self, name: &str) -> Result<&mut HParams> {
		self.get_mut(name)?
			.as_nested_mut()
			.ok_or_else(|| HParamsError::NotNested {
				name: name.to_string(),
			})
	}

	/// Resolve a dotted path such as `encoder.kwargs.hidden_size`.
	pub fn lookup(&self, path: &str) -> Result<&Value> {
		let mut current = self;
		let mut segments = path.split('.').peekable();
		let mut walked = String::new();

		while let Some(segment) = segments.next() {
			if !walked.is_empty() {
				walked.push('.');
			}
			walked.push_str(segment);

			let value = current
				.hparams
				.get(segment)
				.ok_or_else(|| HParamsError::UnknownHyperparameter {
					name: walked.clone(),
				})?;

			if segments.peek().is_none() {
				return Ok(value);
			}

			current = value.as_nested().ok_or_else(|| HParamsError::NotNested {
				name: walked.clone(),
			})?;
		}

		// `split` always yields at least one segment.
		Err(HParamsError::UnknownHyperparameter {
			name: path.to_string(),
		})
	}

	/// Replace the value of an existing hyperparameter.
	///
	/// No type check is performed. Mappings are wrapped into a nested
	/// container, replacing whatever was there before.
	pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
		let slot = self.get_mut(name)?;
		*slot = value.into().wrap();
		Ok(())
	}

	/// Add a hyperparameter that does not exist yet.
	pub fn add_hparam(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
		let name = name.into();
		if self.hparams.contains_key(&name) {
			return Err(HParamsError::DuplicateHyperparameter { name });
		}
		debug!("adding hyperparameter '{name}'");
		self.hparams.insert(name, value.into().wrap());
		Ok(())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.hparams.contains_key(name)
	}

	/// Number of top-level hyperparameters.
	pub fn len(&self) -> usize {
		self.hparams.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hparams.is_empty()
	}

	/// Iterate over `(name, value)` pairs. Each call starts from the beginning.
	pub fn items(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
		self.hparams.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
		self.hparams.keys().map(String::as_str)
	}

	/// Convert back into a raw spec, unwrapping nested containers recursively.
	pub fn to_mapping(&self) -> Spec {
		self.hparams
			.iter()
			.map(|(k, v)| (k.clone(), v.to_plain()))
			.collect()
	}

	/// Plain JSON view of the hyperparameters.
	pub fn to_json(&self) -> serde_json::Value {
		serde_json::Value::Object(
			self.hparams
				.iter()
				.map(|(k, v)| (k.clone(), v.to_json()))
				.collect(),
		)
	}
}

impl PartialEq for HParams {
	fn eq(&self, other: &Self) -> bool {
		self.to_mapping() == other.to_mapping()
	}
}

/// Pretty-printed JSON with sorted keys.
impl fmt::Display for HParams {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#}", self.to_json())
	}
}
