// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for taskwatch-server.
//!
//! Settings are layered from built-in defaults, a TOML file and `TASKWATCH_*`
//! environment variables, in increasing order of precedence.
//!
//! ```ignore
//! use taskwatch_config::load_config;
//!
//! let config = load_config()?;
//! println!("checking every {:?}", config.monitor.tick_interval);
//! ```

pub mod duration;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

use std::path::PathBuf;

pub use duration::{format_duration, parse_duration};
pub use error::ConfigError;
pub use layer::TaskwatchConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct TaskwatchConfig {
	pub database: DatabaseConfig,
	/// `None` when no SMTP host is configured.
	pub smtp: Option<SmtpConfig>,
	pub monitor: MonitorConfig,
	pub logging: LoggingConfig,
}

impl TaskwatchConfig {
	/// SMTP settings, required whenever alerts are actually mailed.
	pub fn require_smtp(&self) -> Result<&SmtpConfig, ConfigError> {
		self.smtp.as_ref().ok_or(ConfigError::MissingSetting {
			key: "smtp.host",
			env: "TASKWATCH_SMTP_HOST",
		})
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`TASKWATCH_*`)
/// 2. Config file (`/etc/taskwatch/taskwatch.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<TaskwatchConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with an explicit config file, which must exist.
pub fn load_config_with_file(
	config_path: impl Into<PathBuf>,
) -> Result<TaskwatchConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::required(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<TaskwatchConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = TaskwatchConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: TaskwatchConfigLayer) -> Result<TaskwatchConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize()?;
	let smtp = layer.smtp.unwrap_or_default().build()?;
	let monitor = layer.monitor.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		smtp_configured = smtp.is_some(),
		tick_interval = %format_duration(monitor.tick_interval),
		alert_cooldown = %format_duration(monitor.alert_cooldown),
		waiting_grace = %format_duration(monitor.waiting_grace),
		max_concurrent_checks = monitor.max_concurrent_checks,
		log_format = %logging.format,
		"configuration loaded"
	);

	Ok(TaskwatchConfig {
		database,
		smtp,
		monitor,
		logging,
	})
}
