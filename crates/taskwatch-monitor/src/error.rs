// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use taskwatch_smtp::SmtpError;
use taskwatch_store::StoreError;

/// Why an alert did not reach its recipients.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
	#[error("SMTP error: {0}")]
	Smtp(#[from] SmtpError),

	#[error("send timed out after {0:?}")]
	Timeout(Duration),

	#[error("task has no email recipients")]
	NoRecipients,

	#[error("notifier rejected message: {0}")]
	Rejected(String),
}

/// Failures that abort a whole tick.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
	#[error("failed to list active tasks: {0}")]
	Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
