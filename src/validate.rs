//! Grant reconciliation.

use std::error::Error;
use std::fmt;

use crate::types::{Grant, Qty};

/// Allowed deviation between a grant's summed tranches and its recorded
/// grant quantity.
pub const TOLERANCE: Qty = 5;

/// Raised when any grant's schedule fails to reconcile with its total.
///
/// Displays as the violation messages joined with newlines, so the binary
/// can print it to stderr verbatim.
#[derive(Debug)]
pub struct ReconciliationError {
	pub violations: Vec<String>,
}

impl fmt::Display for ReconciliationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.violations.join("\n"))
	}
}

impl Error for ReconciliationError {}

/// Reconcile
///
/// Check every grant's forecast-filled schedule against its recorded grant
/// quantity. All violations are collected before failing; nothing fails
/// fast.
pub fn reconcile(grants: &[Grant]) -> Result<(), ReconciliationError> {
	let mut violations = Vec::new();
	for grant in grants {
		let vested: Qty = grant.vest_events.iter().map(|vest| vest.vested_qty).sum();
		if (vested - grant.grant_qty).abs() > TOLERANCE {
			violations.push(format!(
				"Grant {} has {} vested, but {} expected",
				grant.grant_number, vested, grant.grant_qty
			));
		}
	}

	if violations.is_empty() {
		Ok(())
	} else {
		Err(ReconciliationError { violations })
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::types::{Date, VestEvent};
	use rstest::*;

	fn grant_with_vests(number: &str, grant_qty: Qty, quantities: &[Qty]) -> Grant {
		let vest_events = quantities
			.iter()
			.enumerate()
			.map(|(period, &qty)| VestEvent {
				grant_number: number.to_owned(),
				vest_period: period as u32 + 1,
				vest_date: Date::from_ymd_opt(2021, 7, 15).unwrap(),
				vested_qty: qty,
			})
			.collect();
		Grant {
			grant_number: number.to_owned(),
			grant_date: Date::from_ymd_opt(2021, 6, 15).unwrap(),
			grant_qty,
			vested_qty: 0,
			unvested_qty: grant_qty,
			vest_events,
		}
	}

	#[rstest]
	#[case(&[100, 100, 100, 100])]
	#[case(&[100, 100, 100, 105])] // exactly at the tolerance edge
	#[case(&[100, 100, 100, 95])]
	fn within_tolerance_passes(#[case] quantities: &[Qty]) {
		let grants = vec![grant_with_vests("G-1", 400, quantities)];
		assert!(reconcile(&grants).is_ok());
	}

	#[rstest]
	fn deviation_beyond_tolerance_fails() {
		let grants = vec![grant_with_vests("G-1", 400, &[100, 100, 100, 106])];
		let err = reconcile(&grants).unwrap_err();
		assert_eq!(
			err.violations,
			["Grant G-1 has 406 vested, but 400 expected"]
		);
	}

	#[rstest]
	fn all_violations_are_collected() {
		let grants = vec![
			grant_with_vests("G-1", 400, &[100]),
			grant_with_vests("G-2", 400, &[100, 100, 100, 100]),
			grant_with_vests("G-3", 200, &[]),
		];
		let err = reconcile(&grants).unwrap_err();
		assert_eq!(err.violations.len(), 2);
		assert!(err.violations[0].contains("G-1"));
		assert!(err.violations[1].contains("G-3"));
	}

	#[rstest]
	fn display_joins_violations_one_per_line() {
		let err = ReconciliationError {
			violations: vec!["first".to_owned(), "second".to_owned()],
		};
		assert_eq!(err.to_string(), "first\nsecond");
	}
}
