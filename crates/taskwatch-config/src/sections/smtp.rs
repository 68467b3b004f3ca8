// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP configuration section for alert delivery.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use taskwatch_common_secret::SecretString;

const DEFAULT_PORT: u16 = 587;
const DEFAULT_FROM_NAME: &str = "Task Monitor";

/// Configuration layer for SMTP settings (all fields optional for layering).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmtpConfigLayer {
	pub host: Option<String>,
	pub port: Option<u16>,
	pub username: Option<String>,
	#[serde(skip_serializing)]
	pub password: Option<SecretString>,
	pub from_address: Option<String>,
	pub from_name: Option<String>,
	/// STARTTLS on or off.
	pub use_tls: Option<bool>,
}

impl SmtpConfigLayer {
	/// Merge with another layer, preferring values from `other`.
	pub fn merge(&mut self, other: SmtpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.from_address.is_some() {
			self.from_address = other.from_address;
		}
		if other.from_name.is_some() {
			self.from_name = other.from_name;
		}
		if other.use_tls.is_some() {
			self.use_tls = other.use_tls;
		}
	}

	/// Build the final config, returning None if SMTP is not configured.
	pub fn build(self) -> Result<Option<SmtpConfig>, ConfigError> {
		let Some(host) = self.host.filter(|h| !h.is_empty()) else {
			return Ok(None);
		};

		let from_address = self.from_address.ok_or_else(|| {
			ConfigError::Validation("SMTP from_address is required when host is configured".to_string())
		})?;

		if from_address.is_empty() {
			return Err(ConfigError::Validation(
				"SMTP from_address cannot be empty".to_string(),
			));
		}

		Ok(Some(SmtpConfig {
			host,
			port: self.port.unwrap_or(DEFAULT_PORT),
			username: self.username,
			password: self.password,
			from_address,
			from_name: self
				.from_name
				.unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
			use_tls: self.use_tls.unwrap_or(true),
		}))
	}
}

/// Validated SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
	pub host: String,
	pub port: u16,
	pub username: Option<String>,
	pub password: Option<SecretString>,
	pub from_address: String,
	pub from_name: String,
	pub use_tls: bool,
}

impl SmtpConfig {
	/// Check if authentication credentials are configured.
	pub fn has_auth(&self) -> bool {
		self.username.is_some() && self.password.is_some()
	}
}
