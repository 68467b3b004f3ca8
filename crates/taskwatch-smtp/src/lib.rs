// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP client for taskwatch alert emails.
//!
//! Alerts are plain text and may go to several recipients at once. The
//! password is held in a [`SecretString`] so it never shows up in logs.
//!
//! ```no_run
//! use taskwatch_smtp::{SmtpClient, SmtpConfig};
//! use taskwatch_common_secret::SecretString;
//!
//! # async fn example() -> Result<(), taskwatch_smtp::SmtpError> {
//! let config = SmtpConfig {
//!     host: "smtp.example.com".to_string(),
//!     port: 587,
//!     username: Some("monitor@example.com".to_string()),
//!     password: Some(SecretString::new("password".to_string())),
//!     from_address: "monitor@example.com".to_string(),
//!     from_name: "Task Monitor".to_string(),
//!     use_tls: true,
//! };
//!
//! let client = SmtpClient::new(config)?;
//! client
//! 	.send_email(
//! 		&["ops@example.com".to_string()],
//! 		"Alert: Task Nightly import requires attention",
//! 		"Task Nightly import is LATE.",
//! 	)
//! 	.await?;
//! # Ok(())
//! # }
//! ```

use lettre::{
	message::{header::ContentType, Mailbox},
	transport::smtp::authentication::Credentials,
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use taskwatch_common_secret::SecretString;

/// Sender display name used when none is configured.
pub const DEFAULT_FROM_NAME: &str = "Task Monitor";

/// Errors that can occur during SMTP operations.
#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
	/// Failed to connect to the SMTP server.
	#[error("connection failed: {0}")]
	Connection(String),

	/// Failed to send an email message.
	#[error("send failed: {0}")]
	Send(String),

	/// Invalid configuration (missing required fields, invalid values).
	#[error("invalid configuration: {0}")]
	Config(String),

	/// Invalid email address format.
	#[error("invalid email address: {0}")]
	Address(String),
}

/// Connection settings for the outgoing mail server.
///
/// The `password` is a [`SecretString`]: redacted in Debug output, zeroized on
/// drop and serialized as `[REDACTED]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
	/// SMTP server hostname.
	pub host: String,

	/// SMTP server port. Common values: 25 (unencrypted), 465 (TLS), 587 (STARTTLS).
	pub port: u16,

	pub username: Option<String>,

	pub password: Option<SecretString>,

	/// Address alerts are sent from.
	pub from_address: String,

	#[serde(default = "default_from_name")]
	pub from_name: String,

	/// Whether to use STARTTLS for the connection. Defaults to `true`.
	#[serde(default = "default_use_tls")]
	pub use_tls: bool,
}

fn default_from_name() -> String {
	DEFAULT_FROM_NAME.to_string()
}

fn default_use_tls() -> bool {
	true
}

/// Async SMTP client. The connection is made lazily on each send.
pub struct SmtpClient {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from_mailbox: Mailbox,
}

impl SmtpClient {
	/// Build the transport from `config`.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if the from address is invalid and
	/// [`SmtpError::Connection`] if the TLS relay cannot be set up.
	#[tracing::instrument(
		name = "smtp_client_new",
		skip(config),
		fields(host = %config.host, port = %config.port, use_tls = %config.use_tls)
	)]
	pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
		if config.host.trim().is_empty() {
			return Err(SmtpError::Config("host must not be empty".into()));
		}

		let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
			.parse()
			.map_err(|e| SmtpError::Address(format!("{e}")))?;

		let builder = if config.use_tls {
			AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?
		} else {
			AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
		};

		let mut builder = builder.port(config.port);

		if let (Some(username), Some(password)) = (config.username, config.password) {
			let credentials = Credentials::new(username, password.into_inner());
			builder = builder.credentials(credentials);
		}

		let transport = builder.build();

		tracing::debug!("SMTP client initialized");

		Ok(Self {
			transport,
			from_mailbox,
		})
	}

	/// Open a connection to the server and issue a NOOP.
	#[tracing::instrument(name = "smtp_check_health", skip(self))]
	pub async fn check_health(&self) -> Result<(), SmtpError> {
		tracing::debug!("checking SMTP server health");
		let ok = self
			.transport
			.test_connection()
			.await
			.map_err(|e| SmtpError::Connection(format!("{e}")))?;
		if !ok {
			return Err(SmtpError::Connection(
				"server did not accept the test connection".into(),
			));
		}
		tracing::debug!("SMTP server is healthy");
		Ok(())
	}

	/// Send one plain text message to every address in `to`.
	#[tracing::instrument(
		name = "smtp_send_email",
		skip(self, body_text),
		fields(recipients = to.len(), subject = %subject)
	)]
	pub async fn send_email(
		&self,
		to: &[String],
		subject: &str,
		body_text: &str,
	) -> Result<(), SmtpError> {
		let message = self.build_message(to, subject, body_text)?;

		tracing::debug!("sending email");

		self
			.transport
			.send(message)
			.await
			.map_err(|e| SmtpError::Send(format!("{e}")))?;

		tracing::info!("email sent successfully");

		Ok(())
	}

	fn build_message(&self, to: &[String], subject: &str, body_text: &str) -> Result<Message, SmtpError> {
		if to.is_empty() {
			return Err(SmtpError::Address("no recipients".into()));
		}

		let mut builder = Message::builder()
			.from(self.from_mailbox.clone())
			.subject(subject)
			.header(ContentType::TEXT_PLAIN);

		for address in to {
			let mailbox: Mailbox = address
				.parse()
				.map_err(|e| SmtpError::Address(format!("{address}: {e}")))?;
			builder = builder.to(mailbox);
		}

		builder
			.body(body_text.to_string())
			.map_err(|e| SmtpError::Send(format!("failed to build message: {e}")))
	}
}

/// Syntactic check only; says nothing about whether the mailbox exists.
///
/// ```
/// use taskwatch_smtp::is_valid_email;
///
/// assert!(is_valid_email("ops@example.com"));
/// assert!(!is_valid_email("not-an-email"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Mailbox>().is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> SmtpConfig {
		SmtpConfig {
			host: "localhost".to_string(),
			port: 2525,
			username: None,
			password: None,
			from_address: "monitor@example.com".to_string(),
			from_name: DEFAULT_FROM_NAME.to_string(),
			use_tls: false,
		}
	}

	mod email_validation {
		use super::*;

		#[test]
		fn valid_simple_email() {
			assert!(is_valid_email("user@example.com"));
		}

		#[test]
		fn valid_email_with_name() {
			assert!(is_valid_email("Ops Team <ops@example.com>"));
		}

		#[test]
		fn invalid_empty_string() {
			assert!(!is_valid_email(""));
		}

		#[test]
		fn invalid_no_domain() {
			assert!(!is_valid_email("user@"));
		}

		#[test]
		fn invalid_multiple_at_symbols() {
			assert!(!is_valid_email("user@@example.com"));
		}
	}

	mod client {
		use super::*;

		#[tokio::test]
		async fn rejects_invalid_from_address() {
			let mut config = config();
			config.from_address = "nope".to_string();
			assert!(matches!(SmtpClient::new(config), Err(SmtpError::Address(_))));
		}

		#[tokio::test]
		async fn rejects_empty_host() {
			let mut config = config();
			config.host = " ".to_string();
			assert!(matches!(SmtpClient::new(config), Err(SmtpError::Config(_))));
		}

		#[tokio::test]
		async fn message_addresses_every_recipient() {
			let client = SmtpClient::new(config()).unwrap();
			let to = vec!["ops@example.com".to_string(), "dev@example.com".to_string()];

			let message = client
				.build_message(&to, "Alert: Task Import requires attention", "body")
				.unwrap();

			let recipients: Vec<String> = message
				.envelope()
				.to()
				.iter()
				.map(|a| a.to_string())
				.collect();
			assert_eq!(recipients, to);
			assert_eq!(
				message.envelope().from().map(|a| a.to_string()),
				Some("monitor@example.com".to_string())
			);
		}

		#[tokio::test]
		async fn message_requires_recipients() {
			let client = SmtpClient::new(config()).unwrap();
			assert!(matches!(
				client.build_message(&[], "subject", "body"),
				Err(SmtpError::Address(_))
			));
		}

		#[tokio::test]
		async fn message_rejects_bad_recipient() {
			let client = SmtpClient::new(config()).unwrap();
			let to = vec!["ops@example.com".to_string(), "broken".to_string()];
			let err = client.build_message(&to, "subject", "body").unwrap_err();
			assert!(err.to_string().contains("broken"));
		}
	}

	mod smtp_config {
		use super::*;

		#[test]
		fn config_debug_does_not_leak_password() {
			let mut config = config();
			config.password = Some(SecretString::new("super-secret-password".to_string()));

			let debug = format!("{config:?}");
			assert!(!debug.contains("super-secret-password"));
			assert!(debug.contains("[REDACTED]"));
		}

		#[test]
		fn defaults() {
			assert!(default_use_tls());
			assert_eq!(default_from_name(), "Task Monitor");
		}
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn valid_emails_are_accepted(
				local in "[a-zA-Z][a-zA-Z0-9]{0,30}",
				domain in "[a-zA-Z][a-zA-Z0-9]{0,20}",
				tld in "(com|org|net|io|dev)"
			) {
				let email = format!("{local}@{domain}.{tld}");
				prop_assert!(is_valid_email(&email), "Expected valid: {}", email);
			}

			#[test]
			fn no_at_symbol_is_invalid(s in "[a-zA-Z0-9._%+-]{1,50}") {
				prop_assume!(!s.contains('@'));
				prop_assert!(!is_valid_email(&s));
			}

			#[test]
			fn password_never_in_config_debug(password in "[a-zA-Z0-9!@#$%^&*]{8,32}") {
				prop_assume!(!password.contains("REDACTED"));
				prop_assume!(!password.contains("Secret"));

				let mut config = config();
				config.password = Some(SecretString::new(password.clone()));

				let debug = format!("{config:?}");
				prop_assert!(!debug.contains(&password), "Password leaked in debug output");
			}
		}
	}
}
