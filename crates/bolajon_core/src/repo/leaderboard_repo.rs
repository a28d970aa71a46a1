//! Leaderboard projection repository.
//!
//! # Invariants
//! - One row per learner (`user_id` primary key).
//! - `replace_rankings` leaves exactly the given rows in the table.

use crate::model::leaderboard::{LeaderboardEntry, RankedScore};
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection};

/// Repository interface for the ranked projection.
pub trait LeaderboardRepository {
    /// Replaces the stored projection with `rows`.
    ///
    /// Callers run this inside a transaction so readers never observe a
    /// partially written ranking.
    fn replace_rankings(&self, rows: &[RankedScore]) -> RepoResult<()>;
    /// Lists stored rows joined with learner display fields, by rank.
    fn list_entries(&self, limit: u32) -> RepoResult<Vec<LeaderboardEntry>>;
}

/// SQLite-backed leaderboard repository.
pub struct SqliteLeaderboardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLeaderboardRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LeaderboardRepository for SqliteLeaderboardRepository<'_> {
    fn replace_rankings(&self, rows: &[RankedScore]) -> RepoResult<()> {
        self.conn.execute("DELETE FROM leaderboard;", [])?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO leaderboard (user_id, score, stars, rank)
             VALUES (?1, ?2, ?3, ?4);",
        )?;
        for row in rows {
            stmt.execute(params![row.user_id.to_string(), row.score, row.stars, row.rank])?;
        }

        Ok(())
    }

    fn list_entries(&self, limit: u32) -> RepoResult<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                l.user_id,
                l.rank,
                l.score,
                l.stars,
                u.name,
                u.avatar
             FROM leaderboard l
             JOIN users u ON u.id = l.user_id
             ORDER BY l.rank ASC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([limit])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            let user_id_text: String = row.get("user_id")?;
            entries.push(LeaderboardEntry {
                user_id: parse_uuid(&user_id_text, "leaderboard.user_id")?,
                rank: row.get("rank")?,
                score: row.get("score")?,
                stars: row.get("stars")?,
                name: row.get("name")?,
                avatar: row.get("avatar")?,
            });
        }

        Ok(entries)
    }
}
