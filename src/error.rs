use std::path::PathBuf;

/// Library-level structured errors for hparams.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum HParamsError {
	#[error(
		"Unknown hyperparameter: {name}. Only `kwargs` can contain entries undefined in the default hyperparameters"
	)]
	UnknownHyperparameter { name: String },

	#[error("Hyperparameter '{name}' must have type {expected}, got {found}")]
	TypeMismatch {
		name: String,
		expected: &'static str,
		found: &'static str,
	},

	#[error("Hyperparameter already exists: {name}")]
	DuplicateHyperparameter { name: String },

	#[error("Default hyperparameters must be provided")]
	MissingDefaults,

	#[error("Hyperparameter '{name}' is not a nested container")]
	NotNested { name: String },

	#[error("Failed to read file: {path}")]
	ReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse spec file: {path}")]
	SpecParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to parse spec file: {path}")]
	SpecJsonError {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Unsupported spec format: {path} (expected .toml or .json)")]
	UnsupportedFormat { path: PathBuf },

	#[error("Failed to capture hyperparameters")]
	CaptureError {
		#[source]
		source: serde_json::Error,
	},

	#[error("Failed to restore hyperparameters")]
	RestoreError {
		#[source]
		source: serde_json::Error,
	},

	#[error("Unsupported capture schema: {schema}")]
	UnsupportedCapture { schema: String },

	#[error("Failed to write file: {path}")]
	WriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Result type alias using HParamsError.
pub type Result<T> = std::result::Result<T, HParamsError>;
