use crate::hparams::container::HParams;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Prefix marking a string in a spec file as a callable or type reference.
pub const CALLABLE_PREFIX: &str = "callable:";

/// A raw hyperparameter mapping, as supplied for defaults or overrides.
pub type Spec = IndexMap<String, Value>;

/// Reference to a callable or constructible type, identified by its path.
///
/// Hyperparameters never hold executable code; consumers resolve the path
/// (e.g. `torch.nn.Linear` or `my_crate::init::xavier`) themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallableRef {
	path: String,
}

impl CallableRef {
	pub fn new(path: impl Into<String>) -> Self {
		CallableRef { path: path.into() }
	}

	/// The path this reference points at.
	pub fn path(&self) -> &str {
		&self.path
	}
}

impl fmt::Display for CallableRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path)
	}
}

/// Category a value falls into for merge-time type checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
	/// `None`; accepts any override when used as a default.
	None,
	/// Callable or type reference.
	Callable,
	/// Any ordinary scalar or list value.
	Plain,
	/// A mapping, raw or already wrapped into a container.
	Mapping,
}

/// A single hyperparameter value.
///
/// `Map` only appears in raw [`Spec`]s. Once a value is stored in an
/// [`HParams`] container every mapping has been wrapped into `Nested`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
	None,
	Bool(bool),
	Int(i64),
	Float(#[serde(with = "float_repr")] f64),
	Str(String),
	List(Vec<Value>),
	Callable(CallableRef),
	Map(Spec),
	Nested(HParams),
}

impl Value {
	/// Build a callable reference value.
	pub fn callable(path: impl Into<String>) -> Self {
		Value::Callable(CallableRef::new(path))
	}

	/// Build a raw mapping value from `(name, value)` pairs.
	pub fn map<K, V, I>(entries: I) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
		I: IntoIterator<Item = (K, V)>,
	{
		Value::Map(
			entries
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}

	pub fn category(&self) -> Category {
		match self {
			Value::None => Category::None,
			Value::Callable(_) => Category::Callable,
			Value::Map(_) | Value::Nested(_) => Category::Mapping,
			_ => Category::Plain,
		}
	}

	/// Short name of the value's runtime type, used in error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::None => "none",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::Str(_) => "str",
			Value::List(_) => "list",
			Value::Callable(_) => "callable",
			Value::Map(_) | Value::Nested(_) => "mapping",
		}
	}

	pub fn is_none(&self) -> bool {
		matches!(self, Value::None)
	}

	pub fn is_mapping(&self) -> bool {
		self.category() == Category::Mapping
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int(i) => Some(*i),
			_ => None,
		}
	}

	/// Numeric value as `f64`; integers are widened.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Float(f) => Some(*f),
			Value::Int(i) => Some(*i as f64),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_callable(&self) -> Option<&CallableRef> {
		match self {
			Value::Callable(c) => Some(c),
			_ => None,
		}
	}

	pub fn as_nested(&self) -> Option<&HParams> {
		match self {
			Value::Nested(h) => Some(h),
			_ => None,
		}
	}

	pub fn as_nested_mut(&mut self) -> Option<&mut HParams> {
		match self {
			Value::Nested(h) => Some(h),
			_ => None,
		}
	}

	/// View of a mapping value as a raw spec, whether or not it is wrapped.
	pub(crate) fn as_spec(&self) -> Option<Cow<'_, Spec>> {
		match self {
			Value::Map(spec) => Some(Cow::Borrowed(spec)),
			Value::Nested(h) => Some(Cow::Owned(h.to_mapping())),
			_ => None,
		}
	}

	/// Wrap raw mappings into nested containers, recursively.
	///
	/// Lists are left untouched: only direct mapping values become containers.
	pub(crate) fn wrap(self) -> Value {
		match self {
			Value::Map(spec) => Value::Nested(HParams::wrap(spec)),
			other => other,
		}
	}

	/// Convert nested containers back into raw mappings, recursively.
	pub fn to_plain(&self) -> Value {
		match self {
			Value::Nested(h) => Value::Map(h.to_mapping()),
			Value::Map(spec) => Value::Map(
				spec.iter()
					.map(|(k, v)| (k.clone(), v.to_plain()))
					.collect(),
			),
			Value::List(items) => Value::List(items.iter().map(Value::to_plain).collect()),
			other => other.clone(),
		}
	}

	/// Interpret a string from a spec file, honouring [`CALLABLE_PREFIX`].
	pub fn from_spec_string(s: String) -> Value {
		match s.strip_prefix(CALLABLE_PREFIX) {
			Some(path) => Value::callable(path),
			None => Value::Str(s),
		}
	}

	pub fn from_json(json: serde_json::Value) -> Value {
		match json {
			serde_json::Value::Null => Value::None,
			serde_json::Value::Bool(b) => Value::Bool(b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Value::Int(i),
				None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
			},
			serde_json::Value::String(s) => Value::from_spec_string(s),
			serde_json::Value::Array(items) => {
				Value::List(items.into_iter().map(Value::from_json).collect())
			}
			serde_json::Value::Object(map) => Value::Map(spec_from_json(map)),
		}
	}

	pub fn from_toml(toml: toml::Value) -> Value {
		match toml {
			toml::Value::String(s) => Value::from_spec_string(s),
			toml::Value::Integer(i) => Value::Int(i),
			toml::Value::Float(f) => Value::Float(f),
			toml::Value::Boolean(b) => Value::Bool(b),
			toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
			toml::Value::Array(items) => {
				Value::List(items.into_iter().map(Value::from_toml).collect())
			}
			toml::Value::Table(table) => Value::Map(spec_from_toml(table)),
		}
	}

	/// Plain JSON view of this value.
	///
	/// Callables render with [`CALLABLE_PREFIX`] so the output can be fed back
	/// in as a spec file. Non-finite floats become `null`.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Value::None => serde_json::Value::Null,
			Value::Bool(b) => serde_json::Value::Bool(*b),
			Value::Int(i) => serde_json::Value::from(*i),
			Value::Float(f) => serde_json::Number::from_f64(*f)
				.map(serde_json::Value::Number)
				.unwrap_or(serde_json::Value::Null),
			Value::Str(s) => serde_json::Value::String(s.clone()),
			Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
			Value::Callable(c) => serde_json::Value::String(format!("{CALLABLE_PREFIX}{}", c.path())),
			Value::Map(spec) => serde_json::Value::Object(
				spec.iter()
					.map(|(k, v)| (k.clone(), v.to_json()))
					.collect(),
			),
			Value::Nested(h) => h.to_json(),
		}
	}
}

/// JSON has no non-finite numbers, so captures write them as strings.
mod float_repr {
	use serde::de::Error;
	use serde::{Deserialize, Deserializer, Serializer};

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Repr {
		Number(f64),
		Text(String),
	}

	pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
		if value.is_nan() {
			serializer.serialize_str("nan")
		} else if value.is_infinite() {
			serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
		} else {
			serializer.serialize_f64(*value)
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
		match Repr::deserialize(deserializer)? {
			Repr::Number(f) => Ok(f),
			Repr::Text(text) => match text.as_str() {
				"inf" => Ok(f64::INFINITY),
				"-inf" => Ok(f64::NEG_INFINITY),
				"nan" => Ok(f64::NAN),
				other => Err(D::Error::custom(format!("invalid float: {other}"))),
			},
		}
	}
}

/// Convert a JSON object into a raw spec.
pub fn spec_from_json(map: serde_json::Map<String, serde_json::Value>) -> Spec {
	map.into_iter()
		.map(|(k, v)| (k, Value::from_json(v)))
		.collect()
}

/// Convert a TOML table into a raw spec.
pub fn spec_from_toml(table: toml::Table) -> Spec {
	table
		.into_iter()
		.map(|(k, v)| (k, Value::from_toml(v)))
		.collect()
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Int(i)
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Value::Int(i64::from(i))
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float(f)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Str(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Str(s)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Value::List(items)
	}
}

impl From<CallableRef> for Value {
	fn from(c: CallableRef) -> Self {
		Value::Callable(c)
	}
}

impl From<Spec> for Value {
	fn from(spec: Spec) -> Self {
		Value::Map(spec)
	}
}

impl From<HParams> for Value {
	fn from(h: HParams) -> Self {
		Value::Nested(h)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(opt: Option<T>) -> Self {
		opt.map_or(Value::None, Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_categories() {
		assert_eq!(Value::None.category(), Category::None);
		assert_eq!(Value::callable("f").category(), Category::Callable);
		assert_eq!(Value::from("s").category(), Category::Plain);
		assert_eq!(Value::from(1).category(), Category::Plain);
		assert_eq!(Value::from(vec![Value::from(1)]).category(), Category::Plain);
		assert_eq!(Value::map([("a", 1)]).category(), Category::Mapping);
	}

	#[test]
	fn test_from_json_callable_prefix() {
		let value = Value::from_json(json!({
			"fn": "callable:torch.nn.Linear",
			"name": "plain",
			"rate": 0.5,
			"layers": 3,
			"extra": null,
		}));

		let Value::Map(spec) = value else {
			panic!("Expected mapping");
		};
		assert_eq!(spec["fn"], Value::callable("torch.nn.Linear"));
		assert_eq!(spec["name"], Value::from("plain"));
		assert_eq!(spec["rate"], Value::Float(0.5));
		assert_eq!(spec["layers"], Value::Int(3));
		assert!(spec["extra"].is_none());
	}

	#[test]
	fn test_from_toml_table() {
		let table: toml::Table = toml::from_str(
			r#"
name = "model"
init = "callable:init::xavier"

[dims]
hidden = 256
"#,
		)
		.unwrap();
		let spec = spec_from_toml(table);

		assert_eq!(spec["init"], Value::callable("init::xavier"));
		assert_eq!(spec["dims"], Value::map([("hidden", 256)]));
	}

	#[test]
	fn test_to_json_renders_callables_with_prefix() {
		let value = Value::map([("fn", Value::callable("a.b"))]);
		assert_eq!(value.to_json(), json!({"fn": "callable:a.b"}));
	}

	#[test]
	fn test_option_conversion() {
		assert!(Value::from(None::<i64>).is_none());
		assert_eq!(Value::from(Some("x")), Value::from("x"));
	}

	#[test]
	fn test_as_f64_widens_integers() {
		assert_eq!(Value::from(2).as_f64(), Some(2.0));
		assert_eq!(Value::from("2").as_f64(), None);
	}
}
