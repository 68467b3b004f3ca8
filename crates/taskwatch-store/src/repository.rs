// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository layer for scheduled task queries.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::SqlitePool;
use tracing::{instrument, warn};

use taskwatch_core::{
	parse_recipients, ExecutionLogEntry, ExecutionStatus, JobId, ScheduledJob, WeekdaySchedule,
};

use crate::error::{Result, StoreError};

/// Flag columns store `2` for enabled.
pub const FLAG_ENABLED: i64 = 2;

/// Read-only queries the monitor needs.
#[async_trait]
pub trait TaskStore: Send + Sync {
	/// Active tasks ordered by id. Rows that cannot be decoded are skipped.
	async fn list_active_jobs(&self) -> Result<Vec<ScheduledJob>>;

	/// Execution history for one task code, newest first.
	async fn list_log_entries(&self, job_code: &str) -> Result<Vec<ExecutionLogEntry>>;
}

#[derive(Clone)]
pub struct SqliteTaskStore {
	pool: SqlitePool,
}

impl SqliteTaskStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
	#[instrument(skip(self))]
	async fn list_active_jobs(&self) -> Result<Vec<ScheduledJob>> {
		let rows = sqlx::query_as::<_, ScheduledTaskRow>(
			r#"
			SELECT row_id, task_code, description, is_active,
				   monday, tuesday, wednesday, thursday, friday, saturday, sunday,
				   frequency, email_recipients
			FROM scheduled_tasks
			WHERE is_active = ?
			ORDER BY row_id ASC
			"#,
		)
		.bind(FLAG_ENABLED)
		.fetch_all(&self.pool)
		.await?;

		let jobs = rows
			.into_iter()
			.filter_map(|row| match ScheduledJob::try_from(row) {
				Ok(job) => Some(job),
				Err(e) => {
					warn!(error = %e, "skipping undecodable scheduled task");
					None
				}
			})
			.collect();

		Ok(jobs)
	}

	#[instrument(skip(self), fields(job_code = %job_code))]
	async fn list_log_entries(&self, job_code: &str) -> Result<Vec<ExecutionLogEntry>> {
		let rows = sqlx::query_as::<_, ExecutionLogRow>(
			r#"
			SELECT id, task_code, status, end_date, user_message
			FROM task_execution_logs
			WHERE task_code = ?
			ORDER BY end_date DESC, id DESC
			"#,
		)
		.bind(job_code)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}
}

#[derive(sqlx::FromRow)]
struct ScheduledTaskRow {
	row_id: i64,
	task_code: Option<String>,
	description: Option<String>,
	is_active: Option<i64>,
	monday: Option<i64>,
	tuesday: Option<i64>,
	wednesday: Option<i64>,
	thursday: Option<i64>,
	friday: Option<i64>,
	saturday: Option<i64>,
	sunday: Option<i64>,
	frequency: Option<i64>,
	email_recipients: Option<String>,
}

fn flag(value: Option<i64>) -> bool {
	value == Some(FLAG_ENABLED)
}

impl TryFrom<ScheduledTaskRow> for ScheduledJob {
	type Error = StoreError;

	fn try_from(row: ScheduledTaskRow) -> Result<Self> {
		let invalid = |message: &str| StoreError::InvalidRecord {
			table: "scheduled_tasks",
			row_id: row.row_id,
			message: message.to_string(),
		};

		let code = row
			.task_code
			.clone()
			.filter(|c| !c.trim().is_empty())
			.ok_or_else(|| invalid("missing task_code"))?;
		let frequency_minutes = row.frequency.ok_or_else(|| invalid("missing frequency"))?;

		Ok(ScheduledJob {
			id: JobId(row.row_id),
			description: row.description.unwrap_or_else(|| code.clone()),
			code,
			active: flag(row.is_active),
			weekdays: WeekdaySchedule {
				monday: flag(row.monday),
				tuesday: flag(row.tuesday),
				wednesday: flag(row.wednesday),
				thursday: flag(row.thursday),
				friday: flag(row.friday),
				saturday: flag(row.saturday),
				sunday: flag(row.sunday),
			},
			frequency_minutes,
			recipients: row
				.email_recipients
				.as_deref()
				.map(parse_recipients)
				.unwrap_or_default(),
		})
	}
}

#[derive(sqlx::FromRow)]
struct ExecutionLogRow {
	id: i64,
	task_code: String,
	status: Option<i64>,
	end_date: Option<String>,
	user_message: Option<String>,
}

impl TryFrom<ExecutionLogRow> for ExecutionLogEntry {
	type Error = StoreError;

	fn try_from(row: ExecutionLogRow) -> Result<Self> {
		let invalid = |message: String| StoreError::InvalidRecord {
			table: "task_execution_logs",
			row_id: row.id,
			message,
		};

		let status = row
			.status
			.ok_or_else(|| invalid("missing status".to_string()))?;
		let status = i32::try_from(status)
			.map(ExecutionStatus::from)
			.map_err(|_| invalid(format!("status {status} out of range")))?;
		let end_date = row
			.end_date
			.as_deref()
			.ok_or_else(|| invalid("missing end_date".to_string()))?;
		let end_at = parse_timestamp(end_date)
			.ok_or_else(|| invalid(format!("unparseable end_date '{end_date}'")))?;

		Ok(ExecutionLogEntry {
			id: row.id,
			job_code: row.task_code,
			status,
			end_at,
			message: row.user_message.filter(|m| !m.is_empty()),
		})
	}
}

/// Accept RFC 3339 or SQLite's `YYYY-MM-DD HH:MM:SS[.fff]` (taken as UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
	if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
		return Some(dt.with_timezone(&Utc));
	}
	NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
		.ok()
		.map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use sqlx::sqlite::SqlitePoolOptions;

	async fn setup_db() -> SqlitePool {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect("sqlite::memory:")
			.await
			.unwrap();

		sqlx::query(
			r#"
			CREATE TABLE scheduled_tasks (
				row_id INTEGER PRIMARY KEY,
				task_code TEXT,
				description TEXT,
				is_active INTEGER,
				monday INTEGER, tuesday INTEGER, wednesday INTEGER, thursday INTEGER,
				friday INTEGER, saturday INTEGER, sunday INTEGER,
				frequency INTEGER,
				email_recipients TEXT
			)
			"#,
		)
		.execute(&pool)
		.await
		.unwrap();

		sqlx::query(
			r#"
			CREATE TABLE task_execution_logs (
				id INTEGER PRIMARY KEY,
				task_code TEXT NOT NULL,
				status INTEGER,
				end_date TEXT,
				user_message TEXT
			)
			"#,
		)
		.execute(&pool)
		.await
		.unwrap();

		pool
	}

	async fn insert_task(pool: &SqlitePool, row_id: i64, code: Option<&str>, active: i64, frequency: Option<i64>) {
		sqlx::query(
			r#"
			INSERT INTO scheduled_tasks
			VALUES (?, ?, ?, ?, 2, 1, 2, 1, 2, 1, 1, ?, 'ops@example.com;dev@example.com')
			"#,
		)
		.bind(row_id)
		.bind(code)
		.bind(code.map(|c| format!("{c} description")))
		.bind(active)
		.bind(frequency)
		.execute(pool)
		.await
		.unwrap();
	}

	async fn insert_log(pool: &SqlitePool, id: i64, code: &str, status: i64, end_date: &str, message: Option<&str>) {
		sqlx::query("INSERT INTO task_execution_logs VALUES (?, ?, ?, ?, ?)")
			.bind(id)
			.bind(code)
			.bind(status)
			.bind(end_date)
			.bind(message)
			.execute(pool)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn list_active_jobs_filters_and_decodes() {
		let pool = setup_db().await;
		insert_task(&pool, 2, Some("EXPORT"), 2, Some(30)).await;
		insert_task(&pool, 1, Some("IMPORT"), 2, Some(15)).await;
		insert_task(&pool, 3, Some("PAUSED"), 1, Some(15)).await;

		let store = SqliteTaskStore::new(pool);
		let jobs = store.list_active_jobs().await.unwrap();

		assert_eq!(jobs.len(), 2);
		assert_eq!(jobs[0].id, JobId(1));
		assert_eq!(jobs[0].code, "IMPORT");
		assert_eq!(jobs[0].description, "IMPORT description");
		assert!(jobs[0].active);
		assert_eq!(jobs[0].frequency_minutes, 15);
		assert_eq!(jobs[0].recipients, vec!["ops@example.com", "dev@example.com"]);
		assert!(jobs[0].weekdays.monday);
		assert!(!jobs[0].weekdays.tuesday);
		assert!(jobs[0].weekdays.friday);
		assert!(!jobs[0].weekdays.sunday);
		assert_eq!(jobs[1].id, JobId(2));
	}

	#[tokio::test]
	async fn list_active_jobs_skips_undecodable_rows() {
		let pool = setup_db().await;
		insert_task(&pool, 1, None, 2, Some(15)).await;
		insert_task(&pool, 2, Some("NO_FREQ"), 2, None).await;
		insert_task(&pool, 3, Some("GOOD"), 2, Some(15)).await;

		let store = SqliteTaskStore::new(pool);
		let jobs = store.list_active_jobs().await.unwrap();

		assert_eq!(jobs.len(), 1);
		assert_eq!(jobs[0].code, "GOOD");
	}

	#[tokio::test]
	async fn list_log_entries_orders_newest_first() {
		let pool = setup_db().await;
		insert_log(&pool, 1, "IMPORT", 3, "2025-03-10T10:00:00Z", None).await;
		insert_log(&pool, 2, "IMPORT", 7, "2025-03-10T11:00:00Z", Some("disk full")).await;
		insert_log(&pool, 3, "IMPORT", 1, "2025-03-10T12:00:00Z", Some("")).await;
		insert_log(&pool, 4, "EXPORT", 3, "2025-03-10T12:30:00Z", None).await;

		let store = SqliteTaskStore::new(pool);
		let entries = store.list_log_entries("IMPORT").await.unwrap();

		assert_eq!(entries.len(), 3);
		assert_eq!(entries[0].status, ExecutionStatus::Waiting);
		assert_eq!(entries[0].message, None);
		assert_eq!(entries[1].status, ExecutionStatus::Error);
		assert_eq!(entries[1].message.as_deref(), Some("disk full"));
		assert_eq!(
			entries[1].end_at,
			Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap()
		);
		assert_eq!(entries[2].status, ExecutionStatus::Success);
	}

	#[tokio::test]
	async fn list_log_entries_rejects_bad_timestamp() {
		let pool = setup_db().await;
		insert_log(&pool, 9, "IMPORT", 3, "yesterday", None).await;

		let store = SqliteTaskStore::new(pool);
		let err = store.list_log_entries("IMPORT").await.unwrap_err();

		assert!(err.is_invalid_record());
	}

	#[test]
	fn parse_timestamp_accepts_sqlite_format() {
		assert_eq!(
			parse_timestamp("2025-03-10 11:00:00.250"),
			Some(Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap() + chrono::Duration::milliseconds(250))
		);
		assert_eq!(
			parse_timestamp("2025-03-10T08:00:00-03:00"),
			Some(Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap())
		);
		assert_eq!(parse_timestamp("not a date"), None);
	}
}
