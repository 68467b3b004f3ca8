// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use taskwatch_common_secret::load_secret_env;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::TaskwatchConfigLayer;
use crate::sections::{
	DatabaseConfigLayer, LogFormat, LoggingConfigLayer, MonitorConfigLayer, SmtpConfigLayer,
};

/// Default location of the config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/taskwatch/taskwatch.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<TaskwatchConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<TaskwatchConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(TaskwatchConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file that may be absent.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// A file the operator named explicitly; absence is an error.
	pub fn required(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<TaskwatchConfigLayer, ConfigError> {
		if !self.path.exists() && !self.required {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(TaskwatchConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: TaskwatchConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: TASKWATCH_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<TaskwatchConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(TaskwatchConfigLayer {
			database: Some(load_database_from_env()?),
			smtp: Some(load_smtp_from_env()?),
			monitor: Some(load_monitor_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
	match env_var(name) {
		Some(v) => match v.to_ascii_lowercase().as_str() {
			"true" | "1" | "yes" => Ok(Some(true)),
			"false" | "0" | "no" => Ok(Some(false)),
			_ => Err(ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid boolean value '{v}'"),
			}),
		},
		None => Ok(None),
	}
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u32(name: &str) -> Result<Option<u32>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u32 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("TASKWATCH_DATABASE_URL"),
		max_connections: env_u32("TASKWATCH_DATABASE_MAX_CONNECTIONS")?,
	})
}

fn load_smtp_from_env() -> Result<SmtpConfigLayer, ConfigError> {
	Ok(SmtpConfigLayer {
		host: env_var("TASKWATCH_SMTP_HOST"),
		port: env_u16("TASKWATCH_SMTP_PORT")?,
		username: env_var("TASKWATCH_SMTP_USERNAME"),
		password: load_secret_env("TASKWATCH_SMTP_PASSWORD")
			.map_err(|e| ConfigError::Secret(e.to_string()))?,
		from_address: env_var("TASKWATCH_SMTP_FROM_ADDRESS"),
		from_name: env_var("TASKWATCH_SMTP_FROM_NAME"),
		use_tls: env_bool("TASKWATCH_SMTP_USE_TLS")?,
	})
}

fn load_monitor_from_env() -> Result<MonitorConfigLayer, ConfigError> {
	Ok(MonitorConfigLayer {
		tick_interval: env_var("TASKWATCH_MONITOR_TICK_INTERVAL"),
		alert_cooldown: env_var("TASKWATCH_MONITOR_ALERT_COOLDOWN"),
		waiting_grace: env_var("TASKWATCH_MONITOR_WAITING_GRACE"),
		send_timeout: env_var("TASKWATCH_MONITOR_SEND_TIMEOUT"),
		max_concurrent_checks: env_usize("TASKWATCH_MONITOR_MAX_CONCURRENT_CHECKS")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env_var("TASKWATCH_LOG_LEVEL"),
		format: env_var("TASKWATCH_LOG_FORMAT")
			.map(|v| v.parse::<LogFormat>())
			.transpose()?,
	})
}
