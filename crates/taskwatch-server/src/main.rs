// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! taskwatch server binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use taskwatch_config::{LogFormat, LoggingConfig, MonitorConfig, SmtpConfig, TaskwatchConfig};
use taskwatch_core::{CooldownTracker, EvaluatorConfig};
use taskwatch_monitor::{DryRunNotifier, Monitor, MonitorSettings, Notifier, SmtpNotifier};
use taskwatch_smtp::SmtpClient;
use taskwatch_store::SqliteTaskStore;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod version;

/// Watches scheduled tasks and mails an alert when one fails, runs late or
/// gets stuck waiting.
#[derive(Parser, Debug)]
#[command(name = "taskwatch-server", about = "Scheduled task monitor", version)]
struct Args {
	/// Config file. Defaults to /etc/taskwatch/taskwatch.toml when present.
	#[arg(long, short, env = "TASKWATCH_CONFIG")]
	config: Option<PathBuf>,

	/// Log alerts instead of mailing them. SMTP settings become optional.
	#[arg(long, env = "TASKWATCH_DRY_RUN")]
	dry_run: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
	/// Poll until interrupted (default)
	Run,
	/// Run a single check and print the summary
	Check,
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let command = args.command.unwrap_or(Command::Run);
	if command == Command::Version {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => taskwatch_config::load_config_with_file(path),
		None => taskwatch_config::load_config(),
	}
	.context("failed to load configuration")?;

	init_tracing(&config.logging);

	tracing::info!(
		version = version::VERSION,
		dry_run = args.dry_run,
		max_connections = config.database.max_connections,
		"starting taskwatch-server"
	);

	let smtp_client = if args.dry_run {
		tracing::warn!("dry run: alerts will be logged, not mailed");
		None
	} else {
		let smtp = config
			.require_smtp()
			.context("SMTP must be configured unless --dry-run is set")?;
		tracing::info!(
			host = %smtp.host,
			port = smtp.port,
			authenticated = smtp.has_auth(),
			"using SMTP relay"
		);
		Some(Arc::new(
			SmtpClient::new(smtp_client_config(smtp)).context("invalid SMTP configuration")?,
		))
	};

	let notifier: Arc<dyn Notifier> = match &smtp_client {
		Some(client) => Arc::new(SmtpNotifier::new(Arc::clone(client))),
		None => Arc::new(DryRunNotifier),
	};

	let pool = taskwatch_store::create_pool(&config.database.url, config.database.max_connections)
		.await
		.context("failed to open task database")?;
	let store = Arc::new(SqliteTaskStore::new(pool));

	let monitor = build_monitor(&config, store, notifier)?;

	match command {
		Command::Check => {
			if let Some(client) = &smtp_client {
				if let Err(e) = client.check_health().await {
					tracing::warn!(error = %e, "SMTP server is not reachable");
				}
			}
			let report = monitor.run_once(chrono::Utc::now()).await?;
			println!("{report}");
		}
		Command::Run | Command::Version => {
			let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
			tokio::spawn(async move {
				shutdown_signal().await;
				tracing::info!("Received shutdown signal");
				let _ = shutdown_tx.send(());
			});

			monitor.run(shutdown_rx).await;
			tracing::info!("taskwatch-server stopped");
		}
	}

	Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
	let registry = tracing_subscriber::registry().with(filter);

	match logging.format {
		LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
	}
}

fn smtp_client_config(smtp: &SmtpConfig) -> taskwatch_smtp::SmtpConfig {
	taskwatch_smtp::SmtpConfig {
		host: smtp.host.clone(),
		port: smtp.port,
		username: smtp.username.clone(),
		password: smtp.password.clone(),
		from_address: smtp.from_address.clone(),
		from_name: smtp.from_name.clone(),
		use_tls: smtp.use_tls,
	}
}

fn monitor_settings(monitor: &MonitorConfig) -> anyhow::Result<MonitorSettings> {
	let waiting_grace = chrono::Duration::from_std(monitor.waiting_grace)
		.context("monitor.waiting_grace is too large")?;

	Ok(MonitorSettings {
		tick_interval: monitor.tick_interval,
		send_timeout: monitor.send_timeout,
		max_concurrent_checks: monitor.max_concurrent_checks,
		evaluator: EvaluatorConfig { waiting_grace },
	})
}

fn build_monitor(
	config: &TaskwatchConfig,
	store: Arc<SqliteTaskStore>,
	notifier: Arc<dyn Notifier>,
) -> anyhow::Result<Monitor> {
	let cooldown = chrono::Duration::from_std(config.monitor.alert_cooldown)
		.context("monitor.alert_cooldown is too large")?;

	Ok(Monitor::new(
		store,
		notifier,
		Arc::new(CooldownTracker::new(cooldown)),
		monitor_settings(&config.monitor)?,
	))
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for Ctrl-C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{signal, SignalKind};
		match signal(SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				tracing::error!(error = %e, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {}
		_ = terminate => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[test]
	fn args_default_to_run() {
		let args = Args::parse_from(["taskwatch-server"]);
		assert!(args.command.is_none());
		assert!(!args.dry_run);
	}

	#[test]
	fn args_parse_check_with_flags() {
		let args = Args::parse_from([
			"taskwatch-server",
			"--config",
			"/tmp/taskwatch.toml",
			"--dry-run",
			"check",
		]);
		assert_eq!(args.command, Some(Command::Check));
		assert!(args.dry_run);
		assert_eq!(args.config, Some(PathBuf::from("/tmp/taskwatch.toml")));
	}

	#[test]
	fn monitor_settings_carry_config_values() {
		let config = MonitorConfig {
			tick_interval: Duration::from_secs(60),
			alert_cooldown: Duration::from_secs(3600),
			waiting_grace: Duration::from_secs(120),
			send_timeout: Duration::from_secs(5),
			max_concurrent_checks: 3,
		};
		let settings = monitor_settings(&config).unwrap();
		assert_eq!(settings.tick_interval, Duration::from_secs(60));
		assert_eq!(settings.send_timeout, Duration::from_secs(5));
		assert_eq!(settings.max_concurrent_checks, 3);
		assert_eq!(settings.evaluator.waiting_grace, chrono::Duration::minutes(2));
	}

	#[test]
	fn smtp_config_is_copied_field_for_field() {
		let smtp = SmtpConfig {
			host: "smtp.example.com".to_string(),
			port: 2525,
			username: Some("monitor".to_string()),
			password: None,
			from_address: "monitor@example.com".to_string(),
			from_name: "Task Monitor".to_string(),
			use_tls: false,
		};
		let client = smtp_client_config(&smtp);
		assert_eq!(client.host, "smtp.example.com");
		assert_eq!(client.port, 2525);
		assert_eq!(client.from_address, "monitor@example.com");
		assert!(!client.use_tls);
	}
}
