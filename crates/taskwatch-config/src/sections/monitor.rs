// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Monitor loop timing.

use std::time::Duration;

use serde::Deserialize;

use crate::duration::parse_duration;
use crate::error::ConfigError;

const DEFAULT_TICK_INTERVAL: &str = "5m";
const DEFAULT_ALERT_COOLDOWN: &str = "60m";
const DEFAULT_WAITING_GRACE: &str = "5m";
const DEFAULT_SEND_TIMEOUT: &str = "30s";
const DEFAULT_MAX_CONCURRENT_CHECKS: usize = 1;

/// Durations are time strings, see [`crate::duration`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MonitorConfigLayer {
	pub tick_interval: Option<String>,
	pub alert_cooldown: Option<String>,
	pub waiting_grace: Option<String>,
	pub send_timeout: Option<String>,
	pub max_concurrent_checks: Option<usize>,
}

impl MonitorConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.tick_interval.is_some() {
			self.tick_interval = other.tick_interval;
		}
		if other.alert_cooldown.is_some() {
			self.alert_cooldown = other.alert_cooldown;
		}
		if other.waiting_grace.is_some() {
			self.waiting_grace = other.waiting_grace;
		}
		if other.send_timeout.is_some() {
			self.send_timeout = other.send_timeout;
		}
		if other.max_concurrent_checks.is_some() {
			self.max_concurrent_checks = other.max_concurrent_checks;
		}
	}

	pub fn finalize(self) -> Result<MonitorConfig, ConfigError> {
		let duration = |key: &str, value: Option<String>, default: &str| {
			parse_duration(key, value.as_deref().unwrap_or(default))
		};

		let config = MonitorConfig {
			tick_interval: duration(
				"monitor.tick_interval",
				self.tick_interval,
				DEFAULT_TICK_INTERVAL,
			)?,
			alert_cooldown: duration(
				"monitor.alert_cooldown",
				self.alert_cooldown,
				DEFAULT_ALERT_COOLDOWN,
			)?,
			waiting_grace: duration(
				"monitor.waiting_grace",
				self.waiting_grace,
				DEFAULT_WAITING_GRACE,
			)?,
			send_timeout: duration(
				"monitor.send_timeout",
				self.send_timeout,
				DEFAULT_SEND_TIMEOUT,
			)?,
			max_concurrent_checks: self
				.max_concurrent_checks
				.unwrap_or(DEFAULT_MAX_CONCURRENT_CHECKS),
		};

		config.validate()?;
		Ok(config)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
	pub tick_interval: Duration,
	pub alert_cooldown: Duration,
	pub waiting_grace: Duration,
	pub send_timeout: Duration,
	pub max_concurrent_checks: usize,
}

impl MonitorConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		let positive = [
			("monitor.tick_interval", self.tick_interval),
			("monitor.send_timeout", self.send_timeout),
		];
		for (key, value) in positive {
			if value.is_zero() {
				return Err(ConfigError::InvalidValue {
					key: key.to_string(),
					message: "must be greater than zero".to_string(),
				});
			}
		}

		if self.max_concurrent_checks == 0 {
			return Err(ConfigError::InvalidValue {
				key: "monitor.max_concurrent_checks".to_string(),
				message: "must be at least 1".to_string(),
			});
		}

		Ok(())
	}
}

impl Default for MonitorConfig {
	fn default() -> Self {
		Self {
			tick_interval: Duration::from_secs(5 * 60),
			alert_cooldown: Duration::from_secs(60 * 60),
			waiting_grace: Duration::from_secs(5 * 60),
			send_timeout: Duration::from_secs(30),
			max_concurrent_checks: DEFAULT_MAX_CONCURRENT_CHECKS,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_layer_finalize_defaults() {
		let config = MonitorConfigLayer::default().finalize().unwrap();
		assert_eq!(config, MonitorConfig::default());
	}

	#[test]
	fn test_layer_finalize_with_values() {
		let layer = MonitorConfigLayer {
			tick_interval: Some("1m".to_string()),
			alert_cooldown: Some("2h".to_string()),
			waiting_grace: Some("90s".to_string()),
			send_timeout: Some("10s".to_string()),
			max_concurrent_checks: Some(8),
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.tick_interval, Duration::from_secs(60));
		assert_eq!(config.alert_cooldown, Duration::from_secs(7200));
		assert_eq!(config.waiting_grace, Duration::from_secs(90));
		assert_eq!(config.send_timeout, Duration::from_secs(10));
		assert_eq!(config.max_concurrent_checks, 8);
	}

	#[test]
	fn test_invalid_duration_is_an_error() {
		let layer = MonitorConfigLayer {
			alert_cooldown: Some("an hour".to_string()),
			..Default::default()
		};
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("monitor.alert_cooldown"));
	}

	#[test]
	fn test_zero_tick_interval_rejected() {
		let layer = MonitorConfigLayer {
			tick_interval: Some("0s".to_string()),
			..Default::default()
		};
		assert!(layer.finalize().is_err());
	}

	#[test]
	fn test_zero_cooldown_allowed() {
		let layer = MonitorConfigLayer {
			alert_cooldown: Some("0m".to_string()),
			..Default::default()
		};
		assert_eq!(layer.finalize().unwrap().alert_cooldown, Duration::ZERO);
	}

	#[test]
	fn test_zero_concurrency_rejected() {
		let layer = MonitorConfigLayer {
			max_concurrent_checks: Some(0),
			..Default::default()
		};
		assert!(layer.finalize().is_err());
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = MonitorConfigLayer {
			tick_interval: Some("5m".to_string()),
			alert_cooldown: Some("60m".to_string()),
			..Default::default()
		};
		base.merge(MonitorConfigLayer {
			tick_interval: Some("1m".to_string()),
			..Default::default()
		});
		assert_eq!(base.tick_interval.as_deref(), Some("1m"));
		assert_eq!(base.alert_cooldown.as_deref(), Some("60m"));
	}

	#[test]
	fn test_deserialize_layer_partial() {
		let layer: MonitorConfigLayer = toml::from_str("tick_interval = \"10m\"\n").unwrap();
		assert_eq!(layer.tick_interval.as_deref(), Some("10m"));
		assert!(layer.alert_cooldown.is_none());
	}
}
