use crate::error::{HParamsError, Result};
use crate::hparams::value::{Spec, spec_from_json, spec_from_toml};
use std::path::Path;

/// File formats a spec can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
	Toml,
	Json,
}

impl SpecFormat {
	/// Pick the format from the file extension.
	pub fn from_path(path: &Path) -> Result<Self> {
		let extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.map(str::to_ascii_lowercase);

		match extension.as_deref() {
			Some("toml") => Ok(SpecFormat::Toml),
			Some("json") => Ok(SpecFormat::Json),
			_ => Err(HParamsError::UnsupportedFormat {
				path: path.to_path_buf(),
			}),
		}
	}
}

/// Parse a spec file from the given path.
pub fn parse_spec_file(path: &Path) -> Result<Spec> {
	let content = std::fs::read_to_string(path).map_err(|source| HParamsError::ReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_spec_str(&content, path)
}

/// Parse a spec from a string (useful for testing).
///
/// `path` selects the format and is used in error messages.
pub fn parse_spec_str(content: &str, path: &Path) -> Result<Spec> {
	match SpecFormat::from_path(path)? {
		SpecFormat::Toml => {
			let table: toml::Table =
				toml::from_str(content).map_err(|source| HParamsError::SpecParseError {
					path: path.to_path_buf(),
					source,
				})?;
			Ok(spec_from_toml(table))
		}
		SpecFormat::Json => {
			let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
				.map_err(|source| HParamsError::SpecJsonError {
					path: path.to_path_buf(),
					source,
				})?;
			Ok(spec_from_json(object))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hparams::value::Value;
	use std::path::PathBuf;

	#[test]
	fn test_parse_empty_toml() {
		let path = PathBuf::from("defaults.toml");
		let spec = parse_spec_str("", &path).unwrap();
		assert!(spec.is_empty());
	}

	#[test]
	fn test_parse_toml_tables() {
		let content = r#"
str = "str"
list = ["item1", "item2"]
type = "type_name"

[dict]
key1 = "value1"
key2 = "value2"

[nested_dict.dict_l2]
key1_l2 = "value1_l2"

[kwargs]
arg1 = "argv1"
"#;
		let path = PathBuf::from("defaults.toml");
		let spec = parse_spec_str(content, &path).unwrap();

		assert_eq!(spec.len(), 6);
		assert_eq!(spec["str"], Value::from("str"));
		assert_eq!(
			spec["list"],
			Value::List(vec![Value::from("item1"), Value::from("item2")])
		);
		assert_eq!(
			spec["nested_dict"],
			Value::map([("dict_l2", Value::map([("key1_l2", "value1_l2")]))])
		);
	}

	#[test]
	fn test_parse_json_with_null_and_callable() {
		let content = r#"{"fn": "callable:init.xavier", "dropout": null, "layers": 2}"#;
		let path = PathBuf::from("overrides.json");
		let spec = parse_spec_str(content, &path).unwrap();

		assert_eq!(spec["fn"], Value::callable("init.xavier"));
		assert!(spec["dropout"].is_none());
		assert_eq!(spec["layers"], Value::Int(2));
	}

	#[test]
	fn test_parse_invalid_toml() {
		let path = PathBuf::from("broken.toml");
		let result = parse_spec_str("invalid toml [[[", &path);
		assert!(matches!(result, Err(HParamsError::SpecParseError { .. })));
	}

	#[test]
	fn test_parse_json_root_must_be_object() {
		let path = PathBuf::from("list.json");
		let result = parse_spec_str("[1, 2, 3]", &path);
		assert!(matches!(result, Err(HParamsError::SpecJsonError { .. })));
	}

	#[test]
	fn test_unsupported_extension() {
		let path = PathBuf::from("defaults.yaml");
		match parse_spec_str("a: 1", &path).unwrap_err() {
			HParamsError::UnsupportedFormat { path } => {
				assert_eq!(path, PathBuf::from("defaults.yaml"));
			}
			e => panic!("Expected UnsupportedFormat error, got {e:?}"),
		}
	}

	#[test]
	fn test_format_from_path_is_case_insensitive() {
		assert_eq!(
			SpecFormat::from_path(Path::new("A.JSON")).unwrap(),
			SpecFormat::Json
		);
	}
}
