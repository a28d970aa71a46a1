//! Learning session history repository.
//!
//! Append-only: sessions are inserted per attempt and listed newest first.

use crate::model::session::LearningSession;
use crate::model::user::UserId;
use crate::repo::{bool_to_int, parse_bool, parse_uuid, RepoResult};
use rusqlite::{params, Connection, Row};

/// Repository interface for attempt history.
pub trait SessionRepository {
    fn insert_session(&self, session: &LearningSession) -> RepoResult<()>;
    /// Lists sessions ordered by `created_at DESC, id ASC`.
    fn list_sessions(&self, user_id: UserId, limit: u32) -> RepoResult<Vec<LearningSession>>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn insert_session(&self, session: &LearningSession) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO learning_sessions (
                id,
                user_id,
                letter,
                word,
                user_speech,
                is_correct,
                ai_feedback,
                score,
                duration_ms,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                session.id.to_string(),
                session.user_id.to_string(),
                session.letter.as_str(),
                session.word.as_str(),
                session.user_speech.as_str(),
                bool_to_int(session.is_correct),
                session.ai_feedback.as_str(),
                session.score,
                session.duration_ms,
                session.created_at,
            ],
        )?;

        Ok(())
    }

    fn list_sessions(&self, user_id: UserId, limit: u32) -> RepoResult<Vec<LearningSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                user_id,
                letter,
                word,
                user_speech,
                is_correct,
                ai_feedback,
                score,
                duration_ms,
                created_at
             FROM learning_sessions
             WHERE user_id = ?1
             ORDER BY created_at DESC, id ASC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![user_id.to_string(), limit])?;
        let mut sessions = Vec::new();

        while let Some(row) = rows.next()? {
            sessions.push(parse_session_row(row)?);
        }

        Ok(sessions)
    }
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<LearningSession> {
    let id_text: String = row.get("id")?;
    let user_id_text: String = row.get("user_id")?;

    Ok(LearningSession {
        id: parse_uuid(&id_text, "learning_sessions.id")?,
        user_id: parse_uuid(&user_id_text, "learning_sessions.user_id")?,
        letter: row.get("letter")?,
        word: row.get("word")?,
        user_speech: row.get("user_speech")?,
        is_correct: parse_bool(row.get("is_correct")?, "learning_sessions.is_correct")?,
        ai_feedback: row.get("ai_feedback")?,
        score: row.get("score")?,
        duration_ms: row.get("duration_ms")?,
        created_at: row.get("created_at")?,
    })
}
