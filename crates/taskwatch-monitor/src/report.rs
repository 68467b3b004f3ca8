// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

/// What happened to one task during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
	Healthy,
	/// Invalid record or its history could not be read.
	Skipped,
	Suppressed,
	Sent,
	DeliveryFailed,
}

/// Counts for a single pass over the active tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
	pub jobs_checked: usize,
	pub alerts_raised: usize,
	pub alerts_sent: usize,
	pub alerts_suppressed: usize,
	pub jobs_skipped: usize,
	pub delivery_failures: usize,
}

impl TickReport {
	pub fn record(&mut self, outcome: JobOutcome) {
		self.jobs_checked += 1;
		match outcome {
			JobOutcome::Healthy => {}
			JobOutcome::Skipped => self.jobs_skipped += 1,
			JobOutcome::Suppressed => {
				self.alerts_raised += 1;
				self.alerts_suppressed += 1;
			}
			JobOutcome::Sent => {
				self.alerts_raised += 1;
				self.alerts_sent += 1;
			}
			JobOutcome::DeliveryFailed => {
				self.alerts_raised += 1;
				self.delivery_failures += 1;
			}
		}
	}
}

impl Extend<JobOutcome> for TickReport {
	fn extend<I: IntoIterator<Item = JobOutcome>>(&mut self, iter: I) {
		for outcome in iter {
			self.record(outcome);
		}
	}
}

impl FromIterator<JobOutcome> for TickReport {
	fn from_iter<I: IntoIterator<Item = JobOutcome>>(iter: I) -> Self {
		let mut report = Self::default();
		report.extend(iter);
		report
	}
}

impl fmt::Display for TickReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"checked={} alerts={} sent={} suppressed={} skipped={} failed={}",
			self.jobs_checked,
			self.alerts_raised,
			self.alerts_sent,
			self.alerts_suppressed,
			self.jobs_skipped,
			self.delivery_failures
		)
	}
}
