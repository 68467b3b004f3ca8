// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for taskwatch-server.

pub mod database;
pub mod logging;
pub mod monitor;
pub mod smtp;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use monitor::{MonitorConfig, MonitorConfigLayer};
pub use smtp::{SmtpConfig, SmtpConfigLayer};
