use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use hparams::hparams::{HParams, MergeOptions, Value};
use hparams::persist::{capture_to_file, restore_from_file};
use hparams::spec::load_hparams;

#[derive(Parser)]
#[command(name = "hparams")]
#[command(
	author,
	version,
	about = "Merge, inspect and capture hierarchical hyperparameters"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	/// Log merge decisions to stderr (-v for debug, -vv for trace)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Args)]
struct SpecArgs {
	/// Default hyperparameters (.toml or .json)
	#[arg(value_name = "DEFAULTS")]
	defaults: PathBuf,

	/// Override file, may be repeated; later files win
	#[arg(short, long = "overrides", value_name = "FILE")]
	overrides: Vec<PathBuf>,

	/// Accept override names that are not in the defaults
	#[arg(long)]
	allow_new: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the merged hyperparameters as JSON
	Merge {
		#[command(flatten)]
		spec: SpecArgs,
	},
	/// Print a single hyperparameter by dotted path
	Get {
		#[command(flatten)]
		spec: SpecArgs,

		/// Dotted path, e.g. encoder.kwargs.hidden_size
		#[arg(value_name = "PATH")]
		path: String,
	},
	/// Check that the overrides merge cleanly into the defaults
	Validate {
		#[command(flatten)]
		spec: SpecArgs,
	},
	/// Merge and write a capture that `restore` can read back
	Capture {
		#[command(flatten)]
		spec: SpecArgs,

		/// File to write the capture to
		#[arg(long, value_name = "FILE")]
		output: PathBuf,
	},
	/// Print the hyperparameters stored in a capture as JSON
	Restore {
		/// Capture file written by `capture`
		#[arg(value_name = "CAPTURE")]
		capture: PathBuf,
	},
}

struct StderrLogger;

impl Log for StderrLogger {
	fn enabled(&self, metadata: &Metadata) -> bool {
		metadata.level() <= log::max_level()
	}

	fn log(&self, record: &Record) {
		if self.enabled(record.metadata()) {
			eprintln!("[{}] {}", record.level(), record.args());
		}
	}

	fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};
	if log::set_logger(&LOGGER).is_ok() {
		log::set_max_level(level);
	}
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match cli.command {
		Commands::Merge { spec } => handle_merge(&spec),
		Commands::Get { spec, path } => handle_get(&spec, &path),
		Commands::Validate { spec } => handle_validate(&spec),
		Commands::Capture { spec, output } => handle_capture(&spec, &output),
		Commands::Restore { capture } => handle_restore(&capture),
	}
}

fn load(spec: &SpecArgs) -> Result<HParams> {
	let options = MergeOptions {
		allow_new_hparam: spec.allow_new,
	};
	load_hparams(&spec.defaults, &spec.overrides, options).with_context(|| {
		format!(
			"Failed to load hyperparameters from {}",
			spec.defaults.display()
		)
	})
}

fn handle_merge(spec: &SpecArgs) -> Result<ExitCode> {
	let hparams = load(spec)?;
	println!("{}", hparams);
	Ok(ExitCode::SUCCESS)
}

fn handle_get(spec: &SpecArgs, path: &str) -> Result<ExitCode> {
	let hparams = load(spec)?;
	let value = hparams
		.lookup(path)
		.with_context(|| format!("Failed to look up {}", path))?;

	match value {
		Value::Str(s) => println!("{}", s),
		other => println!("{:#}", other.to_json()),
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_validate(spec: &SpecArgs) -> Result<ExitCode> {
	let options = MergeOptions {
		allow_new_hparam: spec.allow_new,
	};

	match load_hparams(&spec.defaults, &spec.overrides, options) {
		Ok(hparams) => {
			println!(
				"Hyperparameters are valid: {} ({} top-level, {} override file(s))",
				spec.defaults.display(),
				hparams.len(),
				spec.overrides.len()
			);
			for path in &spec.overrides {
				println!("  {}", path.display());
			}
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Hyperparameter error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}

fn handle_capture(spec: &SpecArgs, output: &Path) -> Result<ExitCode> {
	let hparams = load(spec)?;
	capture_to_file(&hparams, output)
		.with_context(|| format!("Failed to capture to {}", output.display()))?;

	println!(
		"Captured {} hyperparameter(s) to {}",
		hparams.len(),
		output.display()
	);
	Ok(ExitCode::SUCCESS)
}

fn handle_restore(capture: &Path) -> Result<ExitCode> {
	let hparams = restore_from_file(capture)
		.with_context(|| format!("Failed to restore {}", capture.display()))?;
	println!("{}", hparams);
	Ok(ExitCode::SUCCESS)
}
