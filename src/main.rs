//! Program entrypoint and argument parsing.

use std::env;
use std::fs::File;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};

use vesting_forecast::process::{self, Options, OutputMode};
use vesting_forecast::validate::ReconciliationError;

static USAGE: &str = "Usage: vesting-forecast [--by-day|--by-quarter] [report-file]";

/// Parse Args
///
/// Parse an optional output-mode flag and an optional positional input path,
/// returning an error for anything else. (Skipping a dependency on `clap` or
/// equivalent given how simple this is).
fn parse_args() -> Result<(Option<String>, Options)> {
	let mut path = None;
	let mut options = Options::default();
	for arg in env::args().skip(1) {
		match arg.as_str() {
			"--by-day" => options.mode = OutputMode::ByDay,
			"--by-quarter" => options.mode = OutputMode::ByQuarter,
			_ if arg.starts_with('-') => return Err(anyhow!(USAGE)),
			_ if path.is_some() => return Err(anyhow!(USAGE)),
			_ => path = Some(arg),
		}
	}
	Ok((path, options))
}

/// The report comes from a file when a path is given, from standard input
/// otherwise.
fn open_input(path: Option<&str>) -> Result<Box<dyn Read>> {
	Ok(match path {
		Some(path) => {
			let file =
				File::open(path).with_context(|| format!("Unable to open {:?}", path))?;
			Box::new(file)
		}
		None => Box::new(io::stdin()),
	})
}

fn run() -> Result<()> {
	let (path, options) = parse_args()?;
	let mut input = open_input(path.as_deref())?;
	let mut output = io::stdout();
	process::run(&mut input, &mut output, &options)
}

fn main() -> ExitCode {
	env_logger::init();
	match run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			// Reconciliation violations go to stderr verbatim, one per line.
			match err.downcast_ref::<ReconciliationError>() {
				Some(violations) => eprintln!("{}", violations),
				None => eprintln!("Error: {:#}", err),
			}
			ExitCode::FAILURE
		}
	}
}
