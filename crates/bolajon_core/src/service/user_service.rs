//! Learner use-case service.
//!
//! # Responsibility
//! - Register learners and read them back with progress and achievements.
//! - Reset progress and apply signed stat adjustments.
//!
//! # Invariants
//! - Registration input is sanitised and validated before any write.
//! - `reset_progress` removes every progress row and zeroes the level;
//!   stars and score are kept.
//! - Stat adjustments clamp at zero and leave `current_level` untouched.

use crate::learning::achievements::{unlocked, Achievement};
use crate::model::progress::Progress;
use crate::model::user::{NewUser, StatsAdjustment, User, UserId, UserStats};
use crate::model::validation::ValidationError;
use crate::repo::progress_repo::{ProgressRepository, SqliteProgressRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use crate::service::now_epoch_ms;
use log::info;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for learner use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    Validation(ValidationError),
    UserNotFound(UserId),
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::UserNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for UserServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for UserServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Learner with progress ordered by letter index and unlocked milestones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub progress: Vec<Progress>,
    pub achievements: Vec<Achievement>,
}

/// Learner use-case service over one SQLite connection.
pub struct UserService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> UserService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Registers a learner with zeroed stats.
    ///
    /// # Errors
    /// - `Validation` when the sanitised name or the age is out of range.
    pub fn create_user(&self, name: &str, age: u32) -> Result<User, UserServiceError> {
        let user = NewUser::new(name, age)?.into_user(now_epoch_ms());
        SqliteUserRepository::new(&*self.conn).create_user(&user)?;

        info!(
            "event=user_create module=service status=ok user_id={} age={}",
            user.id, user.age
        );
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>, UserServiceError> {
        Ok(SqliteUserRepository::new(&*self.conn).get_user(id)?)
    }

    /// Loads learner, progress, and achievements from one read snapshot.
    pub fn get_profile(&mut self, id: UserId) -> Result<UserProfile, UserServiceError> {
        let tx = self.conn.transaction()?;
        let user = SqliteUserRepository::new(&tx)
            .get_user(id)?
            .ok_or(UserServiceError::UserNotFound(id))?;
        let progress = SqliteProgressRepository::new(&tx).list_progress(id)?;
        tx.commit()?;

        let completed = progress.iter().filter(|item| item.is_completed()).count();
        Ok(UserProfile {
            user,
            progress,
            achievements: unlocked(completed),
        })
    }

    /// Deletes all progress for the learner and zeroes the level.
    ///
    /// Returns the updated stats.
    pub fn reset_progress(&mut self, id: UserId) -> Result<UserStats, UserServiceError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let users = SqliteUserRepository::new(&tx);
        let user = users
            .get_user(id)?
            .ok_or(UserServiceError::UserNotFound(id))?;
        let removed = SqliteProgressRepository::new(&tx).delete_all_progress(id)?;

        let stats = UserStats {
            current_level: 0,
            ..user.stats
        };
        users.update_stats(id, &stats)?;
        tx.commit()?;

        info!(
            "event=progress_reset module=service status=ok user_id={} removed={}",
            id, removed
        );
        Ok(stats)
    }

    /// Applies signed star/score deltas with zero clamping.
    pub fn adjust_stats(
        &mut self,
        id: UserId,
        adjustment: StatsAdjustment,
    ) -> Result<UserStats, UserServiceError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let users = SqliteUserRepository::new(&tx);
        let user = users
            .get_user(id)?
            .ok_or(UserServiceError::UserNotFound(id))?;

        let stats = user.stats.adjusted(adjustment);
        users.update_stats(id, &stats)?;
        tx.commit()?;

        info!(
            "event=stats_adjust module=service status=ok user_id={} stars_delta={} score_delta={}",
            id, adjustment.stars_delta, adjustment.score_delta
        );
        Ok(stats)
    }
}
