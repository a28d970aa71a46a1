//! Learning session log entries.
//!
//! One row is appended per recorded attempt. Sessions are history only;
//! nothing derives state from them.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One evaluated attempt as stored in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningSession {
    pub id: Uuid,
    pub user_id: UserId,
    pub letter: String,
    /// Target example word, empty when the learner practised freely.
    pub word: String,
    /// Transcript (falls back to `word` when no transcript was captured).
    pub user_speech: String,
    pub is_correct: bool,
    pub ai_feedback: String,
    pub score: u32,
    pub duration_ms: u32,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
