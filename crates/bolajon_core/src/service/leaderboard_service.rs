//! Leaderboard projection use-case.
//!
//! # Responsibility
//! - Rank learners by total score and persist the ranked projection.
//!
//! # Invariants
//! - Ranks are 1-based and contiguous in the returned order.
//! - Ties keep input order; input comes from `list_by_score`, so ties are
//!   broken by earlier `created_at`, then id.
//! - After `refresh`, the table holds exactly the current top `limit` rows.

use crate::model::leaderboard::{LeaderboardCandidate, LeaderboardEntry, RankedScore};
use crate::repo::leaderboard_repo::{LeaderboardRepository, SqliteLeaderboardRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use log::info;
use rusqlite::{Connection, TransactionBehavior};
use std::time::Instant;

/// Maximum number of ranked learners kept in the projection.
pub const LEADERBOARD_LIMIT_MAX: u32 = 100;

/// Assigns ranks by score, highest first.
///
/// Sorting is stable: equal scores keep their input order.
pub fn rank_by_score(candidates: &[LeaderboardCandidate]) -> Vec<RankedScore> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by(|left, right| right.score.cmp(&left.score));

    ordered
        .into_iter()
        .zip(1u32..)
        .map(|(candidate, rank)| RankedScore {
            user_id: candidate.user_id,
            rank,
            score: candidate.score,
            stars: candidate.stars,
        })
        .collect()
}

/// Clamps a requested size to `1..=LEADERBOARD_LIMIT_MAX`; `None` or zero
/// means the maximum.
pub fn normalize_leaderboard_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => LEADERBOARD_LIMIT_MAX,
        Some(value) => value.min(LEADERBOARD_LIMIT_MAX),
    }
}

/// Leaderboard use-case service over one SQLite connection.
pub struct LeaderboardService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> LeaderboardService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Recomputes the projection from current learner totals and returns it.
    pub fn refresh(&mut self, limit: Option<u32>) -> RepoResult<Vec<LeaderboardEntry>> {
        let started_at = Instant::now();
        let limit = normalize_leaderboard_limit(limit);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let candidates = SqliteUserRepository::new(&tx)
            .list_by_score(limit)?
            .into_iter()
            .map(|user| LeaderboardCandidate {
                user_id: user.id,
                score: user.stats.total_score,
                stars: user.stats.total_stars,
            })
            .collect::<Vec<_>>();
        let ranked = rank_by_score(&candidates);

        let leaderboard = SqliteLeaderboardRepository::new(&tx);
        leaderboard.replace_rankings(&ranked)?;
        let entries = leaderboard.list_entries(limit)?;
        tx.commit()?;

        info!(
            "event=leaderboard_refresh module=service status=ok rows={} duration_ms={}",
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entries)
    }

    /// Reads the stored projection without recomputing it.
    pub fn entries(&self, limit: Option<u32>) -> RepoResult<Vec<LeaderboardEntry>> {
        SqliteLeaderboardRepository::new(&*self.conn)
            .list_entries(normalize_leaderboard_limit(limit))
    }
}
