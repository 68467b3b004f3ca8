// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for task evaluation.

use thiserror::Error;

use crate::JobId;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
	/// A task or log record is missing a field the evaluator needs.
	#[error("invalid input for task {job_id}: {message}")]
	EvaluationInput { job_id: JobId, message: String },
}
