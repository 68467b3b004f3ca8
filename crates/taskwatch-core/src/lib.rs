// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for taskwatch.
//!
//! This crate holds the scheduled task and execution log models, the pure
//! status evaluator and the in-memory alert cooldown tracker. It does no I/O;
//! the store and notifier live in their own crates.

pub mod cooldown;
pub mod error;
pub mod evaluator;
pub mod job;
pub mod log;

pub use cooldown::{CooldownTracker, Reservation, DEFAULT_ALERT_COOLDOWN_MINUTES};
pub use error::{CoreError, Result};
pub use evaluator::{
	evaluate, validate_job, Alert, AlertKind, EvaluatorConfig, DEFAULT_WAITING_GRACE_MINUTES,
};
pub use job::{parse_recipients, JobId, ScheduledJob, WeekdaySchedule};
pub use log::{ExecutionLogEntry, ExecutionStatus};
