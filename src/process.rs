//! Main forecast pipeline.

use std::collections::BTreeMap;
use std::io::{BufWriter, Read, Write};

use anyhow::Result;

use crate::aggregate;
use crate::forecast::{self, ForecastPolicy};
use crate::parse;
use crate::types::{Date, Qty};
use crate::validate;

/// Which aggregate the pipeline emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
	#[default]
	ByQuarter,
	ByDay,
}

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct Options {
	pub policy: ForecastPolicy,
	pub mode: OutputMode,
}

/// Run
///
/// Read an export report from `input` (trait bound `std::io::Read`), run the
/// full parse/join/forecast/aggregate/reconcile pipeline and write the
/// aggregated forecast as CSV to `output` (trait bound `std::io::Write`).
/// Nothing is written when reconciliation fails.
pub fn run<R: Read, W: Write>(input: &mut R, output: &mut W, options: &Options) -> Result<()> {
	let records = parse::read_records(input)?;
	log::debug!(
		"Parsed {} grants and {} vest events",
		records.grants.len(),
		records.vests.len()
	);

	let (mut grants, orphans) = forecast::join(records.grants, records.vests);
	forecast::fill_forecast(&mut grants, &options.policy);

	// NB orphan events never reach a grant's schedule or its reconciliation,
	// but their recorded quantities still count towards the date totals.
	let events = grants
		.iter()
		.flat_map(|grant| &grant.vest_events)
		.chain(&orphans);
	let by_day = aggregate::totals_by_day(events);

	validate::reconcile(&grants)?;
	write_totals(output, &by_day, options.mode)
}

/// Write Totals
///
/// Serialize the selected aggregate as CSV: a line separator before every
/// record (the first one included) and no trailing newline.
fn write_totals<W: Write>(
	output: &mut W,
	by_day: &BTreeMap<Date, Qty>,
	mode: OutputMode,
) -> Result<()> {
	let mut buffered = BufWriter::new(output);
	match mode {
		OutputMode::ByQuarter => {
			for (quarter, total) in aggregate::totals_by_quarter(by_day) {
				write!(buffered, "\n{},{}", quarter, total)?;
			}
		}
		OutputMode::ByDay => {
			for (date, total) in by_day {
				write!(buffered, "\n{},{}", date.format("%Y-%m-%d"), total)?;
			}
		}
	}
	buffered.flush()?;
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use rstest::*;

	fn grant_row(number: &str, issued: &str, qty: Qty) -> String {
		format!("Grant,E100,{issued},RSU,{qty},,0,{qty},,,,Employee Equity Plan,{number}")
	}

	fn vest_row(number: &str, period: u32, on: &str, qty: Qty) -> String {
		format!("Vest,,,,,,,,,,,{number},,,,,,,{period},{on},,,,,,{qty}")
	}

	fn run_pipeline(lines: &[String], options: &Options) -> Result<String> {
		let mut input = lines.join("\r\n").into_bytes();
		input.extend_from_slice(b"\r\n");
		let mut output = Vec::new();
		run(&mut input.as_slice(), &mut output, options)?;
		Ok(String::from_utf8(output).unwrap())
	}

	#[fixture]
	fn cliff_report() -> Vec<String> {
		// One post-threshold grant of 400 with four unvested tranches spread
		// over two quarters: 100 at the cliff, 100 in each later tranche.
		vec![
			grant_row("G-1001", "2021-06-15", 400),
			vest_row("G-1001", 1, "2021-07-01", 0),
			vest_row("G-1001", 2, "2021-08-01", 0),
			vest_row("G-1001", 3, "2021-10-01", 0),
			vest_row("G-1001", 4, "2021-11-01", 0),
		]
	}

	#[rstest]
	fn cliff_grant_splits_across_quarters(cliff_report: Vec<String>) {
		let output = run_pipeline(&cliff_report, &Options::default()).unwrap();
		assert_eq!(output, "\n2021-Q3,200\n2021-Q4,200");
	}

	#[rstest]
	fn by_day_mode_emits_day_totals(cliff_report: Vec<String>) {
		let options = Options {
			mode: OutputMode::ByDay,
			..Options::default()
		};
		let output = run_pipeline(&cliff_report, &options).unwrap();
		assert_eq!(
			output,
			"\n2021-07-01,100\n2021-08-01,100\n2021-10-01,100\n2021-11-01,100"
		);
	}

	#[rstest]
	fn reruns_are_byte_identical(cliff_report: Vec<String>) {
		let first = run_pipeline(&cliff_report, &Options::default()).unwrap();
		let second = run_pipeline(&cliff_report, &Options::default()).unwrap();
		assert_eq!(first, second);
	}

	#[rstest]
	fn actuals_and_forecasts_mix_in_totals() {
		let lines = vec![
			grant_row("G-2001", "2020-03-10", 900),
			vest_row("G-2001", 1, "2020-06-10", 225),
			vest_row("G-2001", 2, "2020-09-10", 0),
			vest_row("G-2001", 3, "2020-12-10", 0),
			vest_row("G-2001", 4, "2021-03-10", 0),
		];
		let output = run_pipeline(&lines, &Options::default()).unwrap();
		assert_eq!(
			output,
			"\n2020-Q2,225\n2020-Q3,225\n2020-Q4,225\n2021-Q1,225"
		);
	}

	#[rstest]
	fn orphan_events_count_towards_totals_only() {
		let lines = vec![
			grant_row("G-1001", "2021-05-01", 200),
			vest_row("G-1001", 1, "2021-06-01", 0),
			vest_row("G-1001", 2, "2021-09-01", 0),
			// No grant G-9999 exists; reconciliation must still pass.
			vest_row("G-9999", 1, "2021-09-15", 50),
		];
		let output = run_pipeline(&lines, &Options::default()).unwrap();
		assert_eq!(output, "\n2021-Q2,50\n2021-Q3,200");
	}

	#[rstest]
	fn reconciliation_failure_writes_nothing() {
		let lines = vec![
			grant_row("G-3001", "2021-06-15", 1000),
			vest_row("G-3001", 1, "2021-07-01", 100),
			vest_row("G-3001", 2, "2021-10-01", 100),
		];
		let mut input = lines.join("\r\n").into_bytes();
		let mut output = Vec::new();
		let err = run(&mut input.as_slice(), &mut output, &Options::default()).unwrap_err();

		assert!(output.is_empty());
		let violations = err
			.downcast_ref::<validate::ReconciliationError>()
			.unwrap();
		assert_eq!(
			violations.violations,
			["Grant G-3001 has 200 vested, but 1000 expected"]
		);
	}

	#[rstest]
	fn empty_input_produces_empty_output() {
		let output = run_pipeline(&[], &Options::default()).unwrap();
		assert_eq!(output, "");
	}
}
