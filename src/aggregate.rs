//! Day and quarter aggregation of vest events.

use std::collections::BTreeMap;

use crate::types::{Date, Qty, Quarter, VestEvent};

/// Totals By Day
///
/// Sum vested quantities per calendar day over all supplied events. The
/// events are sorted by vest date first, so the totals fill chronologically
/// and iterate the same way.
pub fn totals_by_day<'a, I>(events: I) -> BTreeMap<Date, Qty>
where
	I: IntoIterator<Item = &'a VestEvent>,
{
	let mut events: Vec<&VestEvent> = events.into_iter().collect();
	events.sort_by_key(|vest| vest.vest_date);

	let mut totals = BTreeMap::new();
	for vest in events {
		*totals.entry(vest.vest_date).or_insert(0) += vest.vested_qty;
	}
	totals
}

/// Totals By Quarter
///
/// Reduce per-day totals into per-calendar-quarter totals.
pub fn totals_by_quarter(by_day: &BTreeMap<Date, Qty>) -> BTreeMap<Quarter, Qty> {
	let mut totals = BTreeMap::new();
	for (&date, &qty) in by_day {
		*totals.entry(Quarter::from(date)).or_insert(0) += qty;
	}
	totals
}
