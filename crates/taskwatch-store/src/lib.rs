// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only access to the scheduler's task and execution log tables.

pub mod error;
pub mod pool;
pub mod repository;

pub use error::{Result, StoreError};
pub use pool::create_pool;
pub use repository::{SqliteTaskStore, TaskStore, FLAG_ENABLED};
