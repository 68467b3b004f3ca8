// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Status evaluation for scheduled tasks.
//!
//! [`evaluate`] looks at a task's execution history and decides whether the
//! task needs attention. Checks run in a fixed order and the first match wins:
//!
//! 1. No history at all: no alert.
//! 2. The newest finished run (SUCCESS or ERROR) failed, or succeeded longer
//!    ago than the task's frequency.
//! 3. The newest WAITING row is past its scheduled time by more than the
//!    waiting grace period.
//!
//! Weekday flags and the active flag are not consulted here.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::{ExecutionLogEntry, ExecutionStatus, ScheduledJob};

/// Default tolerance before a WAITING row counts as stuck.
pub const DEFAULT_WAITING_GRACE_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
	Error,
	Late,
	StuckWaiting,
}

impl fmt::Display for AlertKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error => write!(f, "error"),
			Self::Late => write!(f, "late"),
			Self::StuckWaiting => write!(f, "stuck_waiting"),
		}
	}
}

/// Why a task needs attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
	pub kind: AlertKind,
	pub reason: String,
}

impl fmt::Display for Alert {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.reason)
	}
}

/// Thresholds the evaluator applies on top of each task's own frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorConfig {
	pub waiting_grace: Duration,
}

impl Default for EvaluatorConfig {
	fn default() -> Self {
		Self {
			waiting_grace: Duration::minutes(DEFAULT_WAITING_GRACE_MINUTES),
		}
	}
}

/// Reject records the evaluator cannot judge.
pub fn validate_job(job: &ScheduledJob) -> Result<()> {
	if job.code.trim().is_empty() {
		return Err(CoreError::EvaluationInput {
			job_id: job.id,
			message: "task code is empty".to_string(),
		});
	}
	if job.active && job.frequency_minutes <= 0 {
		return Err(CoreError::EvaluationInput {
			job_id: job.id,
			message: format!(
				"active task has non-positive frequency {}",
				job.frequency_minutes
			),
		});
	}
	if Duration::try_minutes(job.frequency_minutes).is_none() {
		return Err(CoreError::EvaluationInput {
			job_id: job.id,
			message: format!("frequency {} is out of range", job.frequency_minutes),
		});
	}
	Ok(())
}

/// Decide whether `job` needs an alert at `now`. `logs` may be in any order.
pub fn evaluate(
	job: &ScheduledJob,
	logs: &[ExecutionLogEntry],
	now: DateTime<Utc>,
	config: &EvaluatorConfig,
) -> Option<Alert> {
	if logs.is_empty() {
		return None;
	}

	let mut newest_first: Vec<&ExecutionLogEntry> = logs.iter().collect();
	newest_first.sort_by(|a, b| b.end_at.cmp(&a.end_at));

	let last_run = newest_first
		.iter()
		.find(|entry| entry.status.is_finished());

	if let Some(entry) = last_run {
		match entry.status {
			ExecutionStatus::Error => {
				return Some(Alert {
					kind: AlertKind::Error,
					reason: format!(
						"Task {} last execution resulted in an ERROR at {}. Message: {}",
						job.description,
						timestamp(entry.end_at),
						entry.message.as_deref().unwrap_or("N/A"),
					),
				});
			}
			ExecutionStatus::Success => {
				// An interval too large to represent can never have elapsed.
				let late = Duration::try_minutes(job.frequency_minutes)
					.is_some_and(|frequency| now - entry.end_at > frequency);
				if late {
					return Some(Alert {
						kind: AlertKind::Late,
						reason: format!(
							"Task {} is LATE. Last successful execution was at {}, which is more than the {} min interval.",
							job.description,
							timestamp(entry.end_at),
							job.frequency_minutes,
						),
					});
				}
			}
			_ => {}
		}
	}

	let waiting = newest_first
		.iter()
		.find(|entry| entry.status == ExecutionStatus::Waiting)?;

	if waiting.end_at < now && now - waiting.end_at > config.waiting_grace {
		return Some(Alert {
			kind: AlertKind::StuckWaiting,
			reason: format!(
				"Task {} is STUCK in WAITING state. Scheduled for {} but not processed.",
				job.description,
				timestamp(waiting.end_at),
			),
		});
	}

	None
}

fn timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
