//! Joining vest schedules to their grants and forecasting unvested tranches.

use std::collections::HashMap;

use crate::types::{Date, Grant, Qty, VestEvent};

/// Allocation policy for forecasted tranches.
///
/// Grants issued strictly after `cliff_threshold` vest with a 25% cliff: the
/// first tranche gets a quarter of the grant and the remainder is spread
/// evenly over the rest of the schedule. Earlier grants vest evenly across
/// all tranches.
#[derive(Debug, Clone)]
pub struct ForecastPolicy {
	pub cliff_threshold: Date,
}

impl Default for ForecastPolicy {
	fn default() -> Self {
		Self {
			cliff_threshold: Date::from_ymd_opt(2021, 1, 1).unwrap(),
		}
	}
}

/// Join
///
/// Attach each vest event to the grant with the matching grant number,
/// preserving the events' relative order. Returns the joined grants along
/// with the orphan events that matched no grant. Orphans never reach a
/// grant's schedule, but the caller still feeds them into the date
/// aggregation.
pub fn join(mut grants: Vec<Grant>, vests: Vec<VestEvent>) -> (Vec<Grant>, Vec<VestEvent>) {
	let mut index = HashMap::new();
	for (position, grant) in grants.iter().enumerate() {
		if index.contains_key(grant.grant_number.as_str()) {
			log::warn!("Duplicate grant number '{}'", grant.grant_number);
			continue;
		}
		index.insert(grant.grant_number.clone(), position);
	}

	let mut orphans = Vec::new();
	for vest in vests {
		match index.get(vest.grant_number.as_str()) {
			Some(&position) => grants[position].vest_events.push(vest),
			None => {
				log::debug!("Vest event for unknown grant '{}'", vest.grant_number);
				orphans.push(vest);
			}
		}
	}

	(grants, orphans)
}

/// Fill Forecast
///
/// Replace every zero-quantity tranche with its projected quantity. Nonzero
/// tranches are actuals that already occurred and stay untouched.
pub fn fill_forecast(grants: &mut [Grant], policy: &ForecastPolicy) {
	for grant in grants {
		let periods = grant.vest_events.len();
		let cliff = grant.grant_date > policy.cliff_threshold;
		for (period, vest) in grant.vest_events.iter_mut().enumerate() {
			if vest.vested_qty == 0 {
				vest.vested_qty = forecast_qty(grant.grant_qty, period, periods, cliff);
			}
		}
	}
}

/// Projected quantity for tranche `period` of a `periods`-tranche schedule.
///
/// A single-tranche schedule degenerates to the even rule, which puts the
/// whole grant into its only tranche.
fn forecast_qty(grant_qty: Qty, period: usize, periods: usize, cliff: bool) -> Qty {
	if cliff && periods > 1 {
		let first = round_div(grant_qty, 4);
		if period == 0 {
			first
		} else {
			round_div(grant_qty - first, periods as Qty - 1)
		}
	} else {
		round_div(grant_qty, periods as Qty)
	}
}

// Rounds half away from zero, like the report's own projections.
fn round_div(quantity: Qty, divisor: Qty) -> Qty {
	(quantity as f64 / divisor as f64).round() as Qty
}
