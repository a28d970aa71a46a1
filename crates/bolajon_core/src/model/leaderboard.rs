//! Leaderboard projection records.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Ranking input: one learner's current totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardCandidate {
    pub user_id: UserId,
    pub score: u32,
    pub stars: u32,
}

/// Ranking output, 1-based `rank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedScore {
    pub user_id: UserId,
    pub rank: u32,
    pub score: u32,
    pub stars: u32,
}

/// Leaderboard row joined with display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub rank: u32,
    pub score: u32,
    pub stars: u32,
    pub name: String,
    pub avatar: Option<String>,
}
