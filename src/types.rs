//! Global type definitions.

use std::fmt;

use chrono::Datelike;

pub type Qty = i64;
pub type Date = chrono::NaiveDate;

/// One equity grant from the export's grant schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
	pub grant_number: String,
	pub grant_date: Date,
	pub grant_qty: Qty,
	// NB recorded actuals at export time, informational only
	pub vested_qty: Qty,
	pub unvested_qty: Qty,
	/// Empty at parse time, populated by the joiner.
	pub vest_events: Vec<VestEvent>,
}

/// One scheduled or forecasted vesting tranche.
///
/// A `vested_qty` of zero in the export means the tranche hasn't occurred yet
/// and its quantity is to be forecasted.
#[derive(Debug, Clone, PartialEq)]
pub struct VestEvent {
	pub grant_number: String,
	pub vest_period: u32,
	pub vest_date: Date,
	pub vested_qty: Qty,
}

/// Calendar quarter (quarter 1 = January through March).
///
/// Orders chronologically and displays as e.g. `2023-Q2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quarter {
	pub year: i32,
	pub quarter: u32,
}

impl From<Date> for Quarter {
	fn from(date: Date) -> Self {
		Self {
			year: date.year(),
			quarter: date.month0() / 3 + 1,
		}
	}
}

impl fmt::Display for Quarter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-Q{}", self.year, self.quarter)
	}
}
