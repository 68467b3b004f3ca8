// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scheduled task definitions.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a scheduled task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub i64);

impl fmt::Display for JobId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for JobId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(s.parse()?))
	}
}

/// Per-weekday enable flags, Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySchedule {
	pub monday: bool,
	pub tuesday: bool,
	pub wednesday: bool,
	pub thursday: bool,
	pub friday: bool,
	pub saturday: bool,
	pub sunday: bool,
}

impl WeekdaySchedule {
	pub fn every_day() -> Self {
		Self {
			monday: true,
			tuesday: true,
			wednesday: true,
			thursday: true,
			friday: true,
			saturday: true,
			sunday: true,
		}
	}

	pub fn runs_on(&self, day: Weekday) -> bool {
		match day {
			Weekday::Mon => self.monday,
			Weekday::Tue => self.tuesday,
			Weekday::Wed => self.wednesday,
			Weekday::Thu => self.thursday,
			Weekday::Fri => self.friday,
			Weekday::Sat => self.saturday,
			Weekday::Sun => self.sunday,
		}
	}

	/// Enabled days in Monday..Sunday order.
	pub fn active_days(&self) -> Vec<Weekday> {
		[
			Weekday::Mon,
			Weekday::Tue,
			Weekday::Wed,
			Weekday::Thu,
			Weekday::Fri,
			Weekday::Sat,
			Weekday::Sun,
		]
		.into_iter()
		.filter(|day| self.runs_on(*day))
		.collect()
	}
}

/// A background task the external scheduler is expected to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
	pub id: JobId,
	/// Key that execution log rows reference.
	pub code: String,
	pub description: String,
	pub active: bool,
	/// Read from the store but not used when deciding whether to alert.
	pub weekdays: WeekdaySchedule,
	/// Expected run frequency in minutes.
	pub frequency_minutes: i64,
	pub recipients: Vec<String>,
}

impl ScheduledJob {
	pub fn runs_on(&self, day: Weekday) -> bool {
		self.weekdays.runs_on(day)
	}

	pub fn active_days(&self) -> Vec<Weekday> {
		self.weekdays.active_days()
	}
}

/// Split a stored recipient list on `,` or `;`, dropping blanks.
pub fn parse_recipients(raw: &str) -> Vec<String> {
	raw
		.split([',', ';'])
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}
