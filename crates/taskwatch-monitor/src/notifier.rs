// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Alert delivery.

use std::sync::Arc;

use async_trait::async_trait;
use taskwatch_smtp::SmtpClient;
use tracing::info;

use crate::error::NotifyError;

/// Sends one message to a set of recipients.
#[async_trait]
pub trait Notifier: Send + Sync {
	async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Delivers alerts through the configured SMTP server.
pub struct SmtpNotifier {
	client: Arc<SmtpClient>,
}

impl SmtpNotifier {
	pub fn new(client: Arc<SmtpClient>) -> Self {
		Self { client }
	}
}

#[async_trait]
impl Notifier for SmtpNotifier {
	#[tracing::instrument(
		name = "smtp_notifier_send",
		skip(self, body),
		fields(recipients = to.len())
	)]
	async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
		self.client.send_email(to, subject, body).await?;
		Ok(())
	}
}

/// Logs the alert instead of mailing it.
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
	async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
		info!(
			recipients = %to.join(", "),
			subject = %subject,
			body = %body,
			"dry run: alert not mailed"
		);
		Ok(())
	}
}
