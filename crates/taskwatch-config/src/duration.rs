// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Time strings such as `30s`, `5m` or `1d`.
//!
//! The accepted form is a decimal count followed by one unit letter:
//! `s` seconds, `m` minutes, `h` hours, `d` days, `w` weeks, `y` years of
//! 365 days.

use std::time::Duration;

use crate::error::ConfigError;

fn unit_seconds(unit: char) -> Option<u64> {
	match unit {
		's' => Some(1),
		'm' => Some(60),
		'h' => Some(60 * 60),
		'd' => Some(24 * 60 * 60),
		'w' => Some(7 * 24 * 60 * 60),
		'y' => Some(365 * 24 * 60 * 60),
		_ => None,
	}
}

/// Parse a time string for the setting named `key`.
pub fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
	let invalid = |message: String| ConfigError::InvalidValue {
		key: key.to_string(),
		message,
	};

	let value = value.trim();
	let Some(unit) = value.chars().last() else {
		return Err(invalid("empty time string".to_string()));
	};
	let multiplier = unit_seconds(unit).ok_or_else(|| {
		invalid(format!(
			"'{value}' must end in one of s, m, h, d, w, y"
		))
	})?;

	let digits = &value[..value.len() - unit.len_utf8()];
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
		return Err(invalid(format!("'{value}' must be a whole number followed by a unit")));
	}

	let count: u64 = digits
		.parse()
		.map_err(|_| invalid(format!("'{value}' is out of range")))?;
	let seconds = count
		.checked_mul(multiplier)
		.ok_or_else(|| invalid(format!("'{value}' is out of range")))?;

	Ok(Duration::from_secs(seconds))
}

/// Render a duration back into the largest unit that divides it evenly.
pub fn format_duration(duration: Duration) -> String {
	let secs = duration.as_secs();
	for unit in ['y', 'w', 'd', 'h', 'm'] {
		let Some(size) = unit_seconds(unit) else {
			continue;
		};
		if secs != 0 && secs % size == 0 {
			return format!("{}{unit}", secs / size);
		}
	}
	format!("{secs}s")
}
