// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Execution log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an execution log row.
///
/// The store encodes these as integers; only the three named codes take part
/// in evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
	/// Run is scheduled and has not been picked up yet.
	Waiting,
	Success,
	Error,
	Other(i32),
}

impl ExecutionStatus {
	pub const WAITING_CODE: i32 = 1;
	pub const SUCCESS_CODE: i32 = 3;
	pub const ERROR_CODE: i32 = 7;

	pub fn code(self) -> i32 {
		match self {
			Self::Waiting => Self::WAITING_CODE,
			Self::Success => Self::SUCCESS_CODE,
			Self::Error => Self::ERROR_CODE,
			Self::Other(code) => code,
		}
	}

	/// SUCCESS and ERROR mark a run that actually happened.
	pub fn is_finished(self) -> bool {
		matches!(self, Self::Success | Self::Error)
	}
}

impl From<i32> for ExecutionStatus {
	fn from(code: i32) -> Self {
		match code {
			Self::WAITING_CODE => Self::Waiting,
			Self::SUCCESS_CODE => Self::Success,
			Self::ERROR_CODE => Self::Error,
			other => Self::Other(other),
		}
	}
}

impl fmt::Display for ExecutionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Waiting => write!(f, "WAITING"),
			Self::Success => write!(f, "SUCCESS"),
			Self::Error => write!(f, "ERROR"),
			Self::Other(code) => write!(f, "STATUS({code})"),
		}
	}
}

/// One row of a task's execution history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
	pub id: i64,
	pub job_code: String,
	pub status: ExecutionStatus,
	/// Completion time for finished runs, scheduled time for WAITING rows.
	pub end_at: DateTime<Utc>,
	pub message: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn named_codes_map_to_variants() {
		assert_eq!(ExecutionStatus::from(1), ExecutionStatus::Waiting);
		assert_eq!(ExecutionStatus::from(3), ExecutionStatus::Success);
		assert_eq!(ExecutionStatus::from(7), ExecutionStatus::Error);
		assert_eq!(ExecutionStatus::from(2), ExecutionStatus::Other(2));
	}

	#[test]
	fn only_success_and_error_are_finished() {
		assert!(ExecutionStatus::Success.is_finished());
		assert!(ExecutionStatus::Error.is_finished());
		assert!(!ExecutionStatus::Waiting.is_finished());
		assert!(!ExecutionStatus::Other(5).is_finished());
	}

	proptest! {
		#[test]
		fn code_survives_conversion(code in any::<i32>()) {
			prop_assert_eq!(ExecutionStatus::from(code).code(), code);
		}
	}
}
