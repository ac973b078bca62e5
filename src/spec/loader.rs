use crate::error::Result;
use crate::hparams::{HParams, MergeOptions, Spec, merge_layers};
use crate::spec::parser::parse_spec_file;
use log::debug;
use std::path::{Path, PathBuf};

/// Load a defaults file and merge override files on top of it, in order.
///
/// Every file is parsed before merging, so a broken override file is
/// reported even if an earlier layer would also have failed to merge.
pub fn load_hparams(
	defaults_path: &Path,
	override_paths: &[PathBuf],
	options: MergeOptions,
) -> Result<HParams> {
	let defaults = parse_spec_file(defaults_path)?;
	debug!("loaded {} default(s) from {}", defaults.len(), defaults_path.display());

	let layers = override_paths
		.iter()
		.map(|path| {
			let layer = parse_spec_file(path)?;
			debug!("loaded {} override(s) from {}", layer.len(), path.display());
			Ok(layer)
		})
		.collect::<Result<Vec<Spec>>>()?;

	merge_layers(&defaults, &layers, options)
}
