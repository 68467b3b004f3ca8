// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Alert cooldown tracking.
//!
//! Remembers when each task was last alerted on so repeated failures do not
//! flood recipients. State lives for the process lifetime only.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::JobId;

pub const DEFAULT_ALERT_COOLDOWN_MINUTES: i64 = 60;

#[derive(Debug, Default)]
struct CooldownState {
	last_alert: HashMap<JobId, DateTime<Utc>>,
	in_flight: HashSet<JobId>,
}

/// Outcome of [`CooldownTracker::try_reserve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
	/// Caller may send; must follow up with `complete` or `release`.
	Granted,
	/// An alert was sent within the window.
	CoolingDown { last_alert: DateTime<Utc> },
	/// Another worker is sending for this task right now.
	InFlight,
}

#[derive(Debug)]
pub struct CooldownTracker {
	window: Duration,
	state: Mutex<CooldownState>,
}

impl Default for CooldownTracker {
	fn default() -> Self {
		Self::new(Duration::minutes(DEFAULT_ALERT_COOLDOWN_MINUTES))
	}
}

impl CooldownTracker {
	pub fn new(window: Duration) -> Self {
		Self {
			window,
			state: Mutex::new(CooldownState::default()),
		}
	}

	pub fn window(&self) -> Duration {
		self.window
	}

	/// True when an alert for `job_id` was recorded less than one window ago.
	pub fn should_suppress(&self, job_id: JobId, now: DateTime<Utc>) -> bool {
		let state = self.state.lock();
		Self::cooling_down(&state, self.window, job_id, now).is_some()
	}

	pub fn record_alert_sent(&self, job_id: JobId, now: DateTime<Utc>) {
		self.state.lock().last_alert.insert(job_id, now);
	}

	pub fn last_alert(&self, job_id: JobId) -> Option<DateTime<Utc>> {
		self.state.lock().last_alert.get(&job_id).copied()
	}

	/// Check the cooldown and claim the task under one lock.
	pub fn try_reserve(&self, job_id: JobId, now: DateTime<Utc>) -> Reservation {
		let mut state = self.state.lock();

		if let Some(last_alert) = Self::cooling_down(&state, self.window, job_id, now) {
			return Reservation::CoolingDown { last_alert };
		}
		if !state.in_flight.insert(job_id) {
			return Reservation::InFlight;
		}

		debug!(job_id = %job_id, "alert reservation granted");
		Reservation::Granted
	}

	/// Record a delivered alert and drop the reservation.
	pub fn complete(&self, job_id: JobId, now: DateTime<Utc>) {
		let mut state = self.state.lock();
		state.in_flight.remove(&job_id);
		state.last_alert.insert(job_id, now);
	}

	/// Drop a reservation without recording anything, so the next tick retries.
	pub fn release(&self, job_id: JobId) {
		self.state.lock().in_flight.remove(&job_id);
	}

	fn cooling_down(
		state: &CooldownState,
		window: Duration,
		job_id: JobId,
		now: DateTime<Utc>,
	) -> Option<DateTime<Utc>> {
		state
			.last_alert
			.get(&job_id)
			.copied()
			.filter(|last| now - *last < window)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use proptest::prelude::*;

	fn t0() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
	}

	#[test]
	fn unknown_job_is_not_suppressed() {
		let tracker = CooldownTracker::default();
		assert!(!tracker.should_suppress(JobId(1), t0()));
	}

	#[test]
	fn recorded_alert_suppresses_within_window() {
		let tracker = CooldownTracker::default();
		tracker.record_alert_sent(JobId(1), t0());

		assert!(tracker.should_suppress(JobId(1), t0() + Duration::minutes(10)));
		assert!(!tracker.should_suppress(JobId(1), t0() + Duration::minutes(60)));
		assert!(!tracker.should_suppress(JobId(2), t0()));
	}

	#[test]
	fn recording_overwrites_previous_timestamp() {
		let tracker = CooldownTracker::default();
		tracker.record_alert_sent(JobId(1), t0());
		let later = t0() + Duration::minutes(90);
		tracker.record_alert_sent(JobId(1), later);

		assert_eq!(tracker.last_alert(JobId(1)), Some(later));
		assert!(tracker.should_suppress(JobId(1), later + Duration::minutes(30)));
	}

	#[test]
	fn reservation_blocks_second_worker_until_released() {
		let tracker = CooldownTracker::default();
		assert_eq!(tracker.try_reserve(JobId(1), t0()), Reservation::Granted);
		assert_eq!(tracker.try_reserve(JobId(1), t0()), Reservation::InFlight);

		tracker.release(JobId(1));
		assert_eq!(tracker.last_alert(JobId(1)), None);
		assert_eq!(tracker.try_reserve(JobId(1), t0()), Reservation::Granted);
	}

	#[test]
	fn completed_reservation_starts_cooldown() {
		let tracker = CooldownTracker::default();
		assert_eq!(tracker.try_reserve(JobId(1), t0()), Reservation::Granted);
		tracker.complete(JobId(1), t0());

		assert_eq!(
			tracker.try_reserve(JobId(1), t0() + Duration::minutes(5)),
			Reservation::CoolingDown { last_alert: t0() }
		);
	}

	proptest! {
		#[test]
		fn suppressed_iff_inside_window(
			window_minutes in 1i64..600,
			delta_seconds in 0i64..72_000,
		) {
			let tracker = CooldownTracker::new(Duration::minutes(window_minutes));
			tracker.record_alert_sent(JobId(7), t0());
			let delta = Duration::seconds(delta_seconds);
			prop_assert_eq!(
				tracker.should_suppress(JobId(7), t0() + delta),
				delta < Duration::minutes(window_minutes)
			);
		}
	}
}
