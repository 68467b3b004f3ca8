// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Task monitor: polls the scheduler's tables and mails rate-limited alerts.

pub mod error;
pub mod monitor;
pub mod notifier;
pub mod report;

pub use error::{MonitorError, NotifyError, Result};
pub use monitor::{
	alert_subject, Monitor, MonitorSettings, DEFAULT_SEND_TIMEOUT, DEFAULT_TICK_INTERVAL,
};
pub use notifier::{DryRunNotifier, Notifier, SmtpNotifier};
pub use report::{JobOutcome, TickReport};
