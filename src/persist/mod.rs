//! Capturing hyperparameters to a blob and restoring them.
//!
//! Captures serialize the container's internal representation, so nested
//! containers and callable references survive the round trip.

use crate::error::{HParamsError, Result};
use crate::hparams::HParams;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema identifier written into every capture.
pub const CAPTURE_SCHEMA: &str = "hparams/capture@1";

#[derive(Serialize, Deserialize)]
struct Capture<H> {
	schema: String,
	hparams: H,
}

/// Serialize a container into a JSON blob.
pub fn capture(hparams: &HParams) -> Result<String> {
	let capture = Capture {
		schema: CAPTURE_SCHEMA.to_string(),
		hparams,
	};
	serde_json::to_string(&capture).map_err(|source| HParamsError::CaptureError { source })
}

/// Rebuild a container from a blob produced by [`capture`].
pub fn restore(blob: &str) -> Result<HParams> {
	let capture: Capture<HParams> =
		serde_json::from_str(blob).map_err(|source| HParamsError::RestoreError { source })?;

	if capture.schema != CAPTURE_SCHEMA {
		return Err(HParamsError::UnsupportedCapture {
			schema: capture.schema,
		});
	}

	Ok(capture.hparams)
}

pub fn capture_to_file(hparams: &HParams, path: &Path) -> Result<()> {
	let blob = capture(hparams)?;
	std::fs::write(path, blob).map_err(|source| HParamsError::WriteError {
		path: path.to_path_buf(),
		source,
	})?;
	debug!("captured {} hyperparameter(s) to {}", hparams.len(), path.display());
	Ok(())
}

pub fn restore_from_file(path: &Path) -> Result<HParams> {
	let blob = std::fs::read_to_string(path).map_err(|source| HParamsError::ReadError {
		path: path.to_path_buf(),
		source,
	})?;
	restore(&blob)
}
