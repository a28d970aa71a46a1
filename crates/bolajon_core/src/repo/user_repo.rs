//! Learner repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/stat-update APIs over the `users` table.
//! - Provide the score-ordered read used by leaderboard refresh.
//!
//! # Invariants
//! - Stats writes validate `UserStats` before SQL mutations.
//! - Score ordering is `total_score DESC, created_at ASC, id ASC`.

use crate::model::user::{User, UserId, UserStats};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    age,
    email,
    avatar,
    total_stars,
    total_score,
    current_level,
    created_at
FROM users";

/// Repository interface for learner records.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Overwrites aggregate stats; `UserNotFound` when no row matches.
    fn update_stats(&self, id: UserId, stats: &UserStats) -> RepoResult<()>;
    /// Lists learners by score, highest first.
    fn list_by_score(&self, limit: u32) -> RepoResult<Vec<User>>;
}

/// SQLite-backed learner repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.stats.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                id,
                name,
                age,
                email,
                avatar,
                total_stars,
                total_score,
                current_level,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                user.id.to_string(),
                user.name.as_str(),
                user.age,
                user.email.as_deref(),
                user.avatar.as_deref(),
                user.stats.total_stars,
                user.stats.total_score,
                user.stats.current_level,
                user.created_at,
            ],
        )?;

        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn update_stats(&self, id: UserId, stats: &UserStats) -> RepoResult<()> {
        stats.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                total_stars = ?1,
                total_score = ?2,
                current_level = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                stats.total_stars,
                stats.total_score,
                stats.current_level,
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::UserNotFound(id));
        }

        Ok(())
    }

    fn list_by_score(&self, limit: u32) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             ORDER BY total_score DESC, created_at ASC, id ASC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([limit])?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "users.id")?;

    let user = User {
        id,
        name: row.get("name")?,
        age: row.get("age")?,
        email: row.get("email")?,
        avatar: row.get("avatar")?,
        stats: UserStats {
            total_stars: row.get("total_stars")?,
            total_score: row.get("total_score")?,
            current_level: row.get("current_level")?,
        },
        created_at: row.get("created_at")?,
    };
    user.stats.validate()?;
    Ok(user)
}
