// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for store operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
	/// The database could not be reached or the query failed.
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	/// A row was read but could not be turned into a domain value.
	#[error("invalid {table} row {row_id}: {message}")]
	InvalidRecord {
		table: &'static str,
		row_id: i64,
		message: String,
	},

	#[error("invalid database URL: {0}")]
	InvalidUrl(String),
}

impl StoreError {
	/// True for failures that say something about the data rather than the connection.
	pub fn is_invalid_record(&self) -> bool {
		matches!(self, Self::InvalidRecord { .. })
	}
}
