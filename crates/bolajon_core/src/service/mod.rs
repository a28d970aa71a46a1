//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Run every read-modify-write use-case inside one immediate SQLite
//!   transaction so concurrent requests for a learner cannot lose updates.
//! - Keep API/CLI layers decoupled from storage details.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod leaderboard_service;
pub mod learning_service;
pub mod user_service;

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
