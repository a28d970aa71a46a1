//! Progress repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read and upsert per-letter progress rows.
//! - Provide the completed-letter count used for level derivation.
//!
//! # Invariants
//! - At most one row per `(user_id, letter_index)`; writes are upserts.
//! - Write paths call `Progress::validate()` before SQL mutations.
//! - Lists are ordered by `letter_index ASC`.

use crate::model::progress::Progress;
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection, Row};

const PROGRESS_SELECT_SQL: &str = "SELECT
    user_id,
    letter,
    letter_index,
    words_completed,
    total_words,
    accuracy,
    attempts_count,
    completed_at
FROM progress";

/// Repository interface for learner progress.
pub trait ProgressRepository {
    fn get_progress(&self, user_id: UserId, letter_index: u32) -> RepoResult<Option<Progress>>;
    fn list_progress(&self, user_id: UserId) -> RepoResult<Vec<Progress>>;
    /// Creates the row if absent, otherwise overwrites it.
    fn upsert_progress(&self, progress: &Progress) -> RepoResult<()>;
    /// Counts rows with `completed_at` set.
    fn count_completed(&self, user_id: UserId) -> RepoResult<usize>;
    /// Deletes every progress row for the learner; returns removed count.
    fn delete_all_progress(&self, user_id: UserId) -> RepoResult<usize>;
}

/// SQLite-backed progress repository.
pub struct SqliteProgressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProgressRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProgressRepository for SqliteProgressRepository<'_> {
    fn get_progress(&self, user_id: UserId, letter_index: u32) -> RepoResult<Option<Progress>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROGRESS_SELECT_SQL}
             WHERE user_id = ?1
               AND letter_index = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), letter_index])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_progress_row(row)?));
        }

        Ok(None)
    }

    fn list_progress(&self, user_id: UserId) -> RepoResult<Vec<Progress>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROGRESS_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY letter_index ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_progress_row(row)?);
        }

        Ok(items)
    }

    fn upsert_progress(&self, progress: &Progress) -> RepoResult<()> {
        progress.validate()?;

        self.conn.execute(
            "INSERT INTO progress (
                user_id,
                letter,
                letter_index,
                words_completed,
                total_words,
                accuracy,
                attempts_count,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (user_id, letter_index) DO UPDATE SET
                letter = excluded.letter,
                words_completed = excluded.words_completed,
                total_words = excluded.total_words,
                accuracy = excluded.accuracy,
                attempts_count = excluded.attempts_count,
                completed_at = excluded.completed_at,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                progress.user_id.to_string(),
                progress.letter.as_str(),
                progress.letter_index,
                progress.words_completed,
                progress.total_words,
                progress.accuracy,
                progress.attempts_count,
                progress.completed_at,
            ],
        )?;

        Ok(())
    }

    fn count_completed(&self, user_id: UserId) -> RepoResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM progress
             WHERE user_id = ?1
               AND completed_at IS NOT NULL;",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        // COUNT(*) is never negative.
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn delete_all_progress(&self, user_id: UserId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM progress WHERE user_id = ?1;", [user_id.to_string()])?;
        Ok(removed)
    }
}

fn parse_progress_row(row: &Row<'_>) -> RepoResult<Progress> {
    let user_id_text: String = row.get("user_id")?;
    let user_id = parse_uuid(&user_id_text, "progress.user_id")?;

    let progress = Progress {
        user_id,
        letter: row.get("letter")?,
        letter_index: row.get("letter_index")?,
        words_completed: row.get("words_completed")?,
        total_words: row.get("total_words")?,
        accuracy: row.get("accuracy")?,
        attempts_count: row.get("attempts_count")?,
        completed_at: row.get("completed_at")?,
    };
    progress.validate()?;
    Ok(progress)
}
