//! Export report parsing.

use std::io::{BufReader, Read};

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

use crate::types::{Date, Grant, Qty, VestEvent};

/// Column layout of the export report.
///
/// The report is positional, not header-driven; this module is the only
/// description of the schema. Indices count logical (quote-aware) columns, so
/// a quoted field with an embedded comma is still one column.
mod columns {
	pub const GRANT_DATE: usize = 2;
	pub const GRANT_QTY: usize = 4;
	pub const GRANT_VESTED_QTY: usize = 6;
	pub const GRANT_UNVESTED_QTY: usize = 7;
	pub const GRANT_NUMBER: usize = 12;

	pub const VEST_GRANT_NUMBER: usize = 11;
	pub const VEST_PERIOD: usize = 18;
	pub const VEST_DATE: usize = 19;
	pub const VEST_QTY: usize = 25;
}

const GRANT_PREFIX: &str = "Grant";
const VEST_PREFIX: &str = "Vest"; // also matches "Vest Schedule" rows

/// Everything parsed out of one export report.
#[derive(Debug, Default)]
pub struct Records {
	pub grants: Vec<Grant>,
	pub vests: Vec<VestEvent>,
}

/// Read Records
///
/// Parse the full export report from `input`. The report interleaves grant
/// rows and vest rows with unrelated furniture (headers, footers, blank
/// lines); rows are classified by their first column and anything
/// unrecognized is skipped. A classified row with a missing or malformed
/// field fails the run.
pub fn read_records<R: Read>(input: R) -> Result<Records> {
	let mut reader = csv::ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.from_reader(BufReader::new(input));

	let mut records = Records::default();

	for result in reader.records() {
		let record = result?;
		let line = record.position().map_or(0, |position| position.line());

		let kind = record.get(0).unwrap_or("");
		if kind.starts_with(GRANT_PREFIX) {
			let grant = parse_grant(&record)
				.with_context(|| format!("Invalid grant row at line {}", line))?;
			records.grants.push(grant);
		} else if kind.starts_with(VEST_PREFIX) {
			let vest = parse_vest(&record)
				.with_context(|| format!("Invalid vest row at line {}", line))?;
			records.vests.push(vest);
		} else {
			log::debug!("Skipping unrecognized row at line {}", line);
		}
	}

	Ok(records)
}

fn parse_grant(record: &StringRecord) -> Result<Grant> {
	Ok(Grant {
		grant_number: field(record, columns::GRANT_NUMBER, "grant number")?.to_owned(),
		grant_date: parse_date(field(record, columns::GRANT_DATE, "grant date")?)?,
		grant_qty: parse_qty(field(record, columns::GRANT_QTY, "grant quantity")?)?,
		// NB the recorded actuals are informational only and often blank in
		// real exports, so they don't get the strict treatment.
		vested_qty: parse_qty_lenient(record, columns::GRANT_VESTED_QTY),
		unvested_qty: parse_qty_lenient(record, columns::GRANT_UNVESTED_QTY),
		vest_events: Vec::new(),
	})
}

fn parse_vest(record: &StringRecord) -> Result<VestEvent> {
	let period = field(record, columns::VEST_PERIOD, "vest period")?;
	Ok(VestEvent {
		grant_number: field(record, columns::VEST_GRANT_NUMBER, "grant number")?.to_owned(),
		vest_period: period
			.parse()
			.map_err(|_| anyhow!("Invalid vest period: {:?}", period))?,
		vest_date: parse_date(field(record, columns::VEST_DATE, "vest date")?)?,
		vested_qty: parse_qty(field(record, columns::VEST_QTY, "vested quantity")?)?,
	})
}

fn field<'a>(record: &'a StringRecord, index: usize, name: &str) -> Result<&'a str> {
	record
		.get(index)
		.map(str::trim)
		.ok_or_else(|| anyhow!("Missing {} column", name))
}

// Quantities may carry thousands separators ("1,000").
fn parse_qty(value: &str) -> Result<Qty> {
	let digits = value.replace(',', "");
	digits
		.parse()
		.map_err(|_| anyhow!("Invalid quantity: {:?}", value))
}

// For informational columns that nothing downstream consumes: a missing or
// unparsable value becomes zero instead of failing the run.
fn parse_qty_lenient(record: &StringRecord, index: usize) -> Qty {
	record
		.get(index)
		.and_then(|value| parse_qty(value.trim()).ok())
		.unwrap_or(0)
}

// The report is inconsistent about date forms; both ISO and US dates occur.
fn parse_date(value: &str) -> Result<Date> {
	Date::parse_from_str(value, "%Y-%m-%d")
		.or_else(|_| Date::parse_from_str(value, "%m/%d/%Y"))
		.map_err(|_| anyhow!("Invalid date: {:?}", value))
}
