// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The polling loop.
//!
//! Each tick lists the active tasks, evaluates every task's history and mails
//! an alert for the ones that need attention, unless that task was already
//! alerted on within the cooldown window. A failure for one task is logged and
//! never stops the others.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use taskwatch_core::{
	evaluate, validate_job, Alert, CooldownTracker, EvaluatorConfig, Reservation, ScheduledJob,
};
use taskwatch_store::TaskStore;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{NotifyError, Result};
use crate::notifier::Notifier;
use crate::report::{JobOutcome, TickReport};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct MonitorSettings {
	pub tick_interval: Duration,
	/// Upper bound on a single notifier call.
	pub send_timeout: Duration,
	/// Tasks checked at once within a tick. 1 means strictly sequential.
	pub max_concurrent_checks: usize,
	pub evaluator: EvaluatorConfig,
}

impl Default for MonitorSettings {
	fn default() -> Self {
		Self {
			tick_interval: DEFAULT_TICK_INTERVAL,
			send_timeout: DEFAULT_SEND_TIMEOUT,
			max_concurrent_checks: 1,
			evaluator: EvaluatorConfig::default(),
		}
	}
}

pub fn alert_subject(job: &ScheduledJob) -> String {
	format!("Alert: Task {} requires attention", job.description)
}

pub struct Monitor {
	store: Arc<dyn TaskStore>,
	notifier: Arc<dyn Notifier>,
	cooldown: Arc<CooldownTracker>,
	settings: MonitorSettings,
}

impl Monitor {
	pub fn new(
		store: Arc<dyn TaskStore>,
		notifier: Arc<dyn Notifier>,
		cooldown: Arc<CooldownTracker>,
		settings: MonitorSettings,
	) -> Self {
		Self {
			store,
			notifier,
			cooldown,
			settings,
		}
	}

	/// Run ticks until `shutdown` fires or its sender is dropped.
	///
	/// The first tick runs immediately. A tick in progress is finished before
	/// the shutdown signal is looked at again.
	pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
		let mut ticker = tokio::time::interval(self.settings.tick_interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

		info!(
			tick_interval_secs = self.settings.tick_interval.as_secs(),
			cooldown_secs = self.cooldown.window().num_seconds(),
			"task monitor started"
		);

		loop {
			tokio::select! {
				_ = ticker.tick() => {
					self.tick().await;
				}
				_ = shutdown.recv() => {
					info!("task monitor shutting down");
					break;
				}
			}
		}
	}

	async fn tick(&self) {
		match self.run_once(Utc::now()).await {
			Ok(report) => info!(
				jobs_checked = report.jobs_checked,
				alerts_raised = report.alerts_raised,
				alerts_sent = report.alerts_sent,
				alerts_suppressed = report.alerts_suppressed,
				jobs_skipped = report.jobs_skipped,
				delivery_failures = report.delivery_failures,
				"monitor tick complete"
			),
			Err(e) => error!(error = %e, "monitor tick aborted"),
		}
	}

	/// One pass over every active task, evaluated as of `now`.
	#[instrument(skip(self, now), fields(now = %now))]
	pub async fn run_once(&self, now: DateTime<Utc>) -> Result<TickReport> {
		let jobs = self.store.list_active_jobs().await?;
		debug!(count = jobs.len(), "active tasks loaded");

		let report = stream::iter(jobs)
			.map(|job| async move { self.check_job(&job, now).await })
			.buffer_unordered(self.settings.max_concurrent_checks.max(1))
			.collect::<TickReport>()
			.await;

		Ok(report)
	}

	#[instrument(skip(self, job, now), fields(job_id = %job.id, job_code = %job.code))]
	async fn check_job(&self, job: &ScheduledJob, now: DateTime<Utc>) -> JobOutcome {
		if let Err(e) = validate_job(job) {
			warn!(error = %e, "skipping invalid task");
			return JobOutcome::Skipped;
		}

		let logs = match self.store.list_log_entries(&job.code).await {
			Ok(logs) => logs,
			Err(e) if e.is_invalid_record() => {
				warn!(error = %e, "unreadable execution history, skipping task");
				return JobOutcome::Skipped;
			}
			Err(e) => {
				error!(error = %e, "task database unavailable, skipping task");
				return JobOutcome::Skipped;
			}
		};

		let Some(alert) = evaluate(job, &logs, now, &self.settings.evaluator) else {
			debug!(entries = logs.len(), "task healthy");
			return JobOutcome::Healthy;
		};

		match self.cooldown.try_reserve(job.id, now) {
			Reservation::Granted => {}
			Reservation::CoolingDown { last_alert } => {
				info!(
					alert_kind = %alert.kind,
					last_alert = %last_alert,
					"alert suppressed by cooldown"
				);
				return JobOutcome::Suppressed;
			}
			Reservation::InFlight => {
				debug!(alert_kind = %alert.kind, "alert already being sent");
				return JobOutcome::Suppressed;
			}
		}

		match self.deliver(job, &alert).await {
			Ok(()) => {
				self.cooldown.complete(job.id, now);
				info!(
					alert_kind = %alert.kind,
					recipients = job.recipients.len(),
					"alert sent"
				);
				JobOutcome::Sent
			}
			Err(e) => {
				self.cooldown.release(job.id);
				warn!(
					alert_kind = %alert.kind,
					reason = %alert.reason,
					error = %e,
					"alert delivery failed, will retry next tick"
				);
				JobOutcome::DeliveryFailed
			}
		}
	}

	async fn deliver(&self, job: &ScheduledJob, alert: &Alert) -> std::result::Result<(), NotifyError> {
		if job.recipients.is_empty() {
			return Err(NotifyError::NoRecipients);
		}

		let subject = alert_subject(job);
		let timeout = self.settings.send_timeout;
		tokio::time::timeout(
			timeout,
			self.notifier.send(&job.recipients, &subject, &alert.reason),
		)
		.await
		.map_err(|_| NotifyError::Timeout(timeout))?
	}
}
