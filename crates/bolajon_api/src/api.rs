//! Use-case API mirroring the learner-facing routes.
//!
//! # Responsibility
//! - Expose user, progress, and leaderboard use-cases behind plain values.
//! - Validate request shape at the boundary (ids, letter selectors).
//!
//! # Invariants
//! - Exported functions never panic.
//! - Every failure is reported through `ApiResponse` with a kind.
//! - The database path is resolved once per process.

use crate::envelope::{ApiFailure, ApiResponse};
use bolajon_core::db::open_db;
use bolajon_core::{
    core_version as core_version_inner, find_grapheme, init_logging as init_logging_inner,
    ping as ping_inner, AttemptReceipt, AttemptRequest, Grapheme, LeaderboardEntry,
    LeaderboardService, LearningService, Progress, StatsAdjustment, User, UserId, UserProfile,
    UserService, UserStats, ValidationError, ALPHABET,
};
use log::warn;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "bolajon.sqlite3";
const DB_PATH_ENV: &str = "BOLAJON_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Progress update payload.
///
/// The grapheme is selected by `letter_index` or `letter`; when both are
/// given they must name the same grapheme.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressUpdate {
    pub user_id: String,
    pub letter: Option<String>,
    pub letter_index: Option<u32>,
    pub accuracy: f64,
    /// Derived from `transcript` when omitted.
    pub is_correct: Option<bool>,
    pub transcript: String,
    pub word: String,
    pub ai_feedback: String,
    pub duration_ms: u32,
}

/// Health check.
pub fn ping() -> String {
    ping_inner().to_owned()
}

pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging; returns an empty string on success.
pub fn init_logging(level: &str, log_dir: &str) -> String {
    match init_logging_inner(level, log_dir) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the database path before first use.
///
/// Repeating the same path is a no-op; a different path after the first
/// resolution is rejected.
pub fn configure_db_path(path: impl AsRef<Path>) -> Result<(), String> {
    let requested = path.as_ref().to_path_buf();
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return Err(format!(
            "database path already resolved to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        ));
    }
    Ok(())
}

/// Returns the alphabet table in teaching order.
pub fn get_alphabet() -> ApiResponse<Vec<Grapheme>> {
    ApiResponse::ok(ALPHABET.to_vec())
}

/// Registers a learner.
pub fn create_user(name: &str, age: u32) -> ApiResponse<User> {
    respond("create_user", |conn| {
        Ok(UserService::new(conn).create_user(name, age)?)
    })
}

/// Loads a learner with progress and achievements.
pub fn get_user(user_id: &str) -> ApiResponse<UserProfile> {
    respond("get_user", |conn| {
        let id = parse_user_id(user_id)?;
        Ok(UserService::new(conn).get_profile(id)?)
    })
}

/// Lists a learner's progress by letter index.
pub fn get_progress(user_id: &str) -> ApiResponse<Vec<Progress>> {
    respond("get_progress", |conn| {
        let id = parse_user_id(user_id)?;
        ensure_user_exists(conn, id)?;
        Ok(LearningService::new(conn).list_progress(id)?)
    })
}

/// Records one attempt and returns the updated progress and stats.
pub fn update_progress(update: &ProgressUpdate) -> ApiResponse<AttemptReceipt> {
    respond("update_progress", |conn| {
        let request = to_attempt_request(update)?;
        Ok(LearningService::new(conn).record_attempt(&request)?)
    })
}

/// Checks a transcript against a letter without recording anything.
pub fn check_letter(letter: &str, transcript: &str) -> ApiResponse<bool> {
    let result = match find_grapheme(letter) {
        Some((index, _)) => u32::try_from(index)
            .map_err(|_| ApiFailure::internal("letter index overflow"))
            .and_then(|index| {
                LearningService::evaluate(index, transcript).map_err(ApiFailure::from)
            }),
        None => Err(ValidationError::UnknownLetter(letter.to_string()).into()),
    };
    ApiResponse::from_result(result)
}

/// Refreshes and returns the top of the leaderboard.
pub fn get_leaderboard(limit: Option<u32>) -> ApiResponse<Vec<LeaderboardEntry>> {
    respond("get_leaderboard", |conn| {
        Ok(LeaderboardService::new(conn).refresh(limit)?)
    })
}

/// Deletes a learner's progress and resets the level.
pub fn reset_progress(user_id: &str) -> ApiResponse<UserStats> {
    respond("reset_progress", |conn| {
        let id = parse_user_id(user_id)?;
        Ok(UserService::new(conn).reset_progress(id)?)
    })
}

/// Applies signed star/score deltas.
pub fn adjust_stats(user_id: &str, stars_delta: i64, score_delta: i64) -> ApiResponse<UserStats> {
    respond("adjust_stats", |conn| {
        let id = parse_user_id(user_id)?;
        let adjustment = StatsAdjustment {
            stars_delta,
            score_delta,
        };
        Ok(UserService::new(conn).adjust_stats(id, adjustment)?)
    })
}

fn respond<T>(
    op: &'static str,
    f: impl FnOnce(&mut Connection) -> Result<T, ApiFailure>,
) -> ApiResponse<T> {
    let result = open_db(resolve_db_path())
        .map_err(|err| ApiFailure::internal(format!("database open failed: {err}")))
        .and_then(|mut conn| f(&mut conn));

    if let Err(failure) = &result {
        warn!(
            "event=api_call module=api status=error op={} error_kind={}",
            op,
            failure.kind.as_str()
        );
    }
    ApiResponse::from_result(result)
}

fn resolve_db_path() -> &'static Path {
    DB_PATH.get_or_init(|| {
        if let Ok(raw) = std::env::var(DB_PATH_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        std::env::temp_dir().join(DB_FILE_NAME)
    })
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiFailure> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiFailure::validation(format!("invalid user id: `{}`", raw.trim())))
}

fn ensure_user_exists(conn: &mut Connection, id: UserId) -> Result<(), ApiFailure> {
    match UserService::new(conn).get_user(id)? {
        Some(_) => Ok(()),
        None => Err(ApiFailure::not_found(format!("user not found: {id}"))),
    }
}

fn letter_index_of(letter: &str) -> Result<u32, ValidationError> {
    find_grapheme(letter)
        .and_then(|(index, _)| u32::try_from(index).ok())
        .ok_or_else(|| ValidationError::UnknownLetter(letter.to_string()))
}

fn to_attempt_request(update: &ProgressUpdate) -> Result<AttemptRequest, ApiFailure> {
    let user_id = parse_user_id(&update.user_id)?;
    let letter_index = match (update.letter_index, update.letter.as_deref()) {
        (Some(index), None) => index,
        (Some(index), Some(letter)) => {
            if letter_index_of(letter)? != index {
                return Err(ValidationError::LetterMismatch {
                    letter: letter.to_string(),
                    letter_index: index,
                }
                .into());
            }
            index
        }
        (None, Some(letter)) => letter_index_of(letter)?,
        (None, None) => {
            return Err(ApiFailure::validation(
                "either letter or letter_index is required",
            ))
        }
    };

    Ok(AttemptRequest {
        user_id,
        letter_index,
        accuracy: update.accuracy,
        is_correct: update.is_correct,
        transcript: update.transcript.clone(),
        word: update.word.clone(),
        ai_feedback: update.ai_feedback.clone(),
        duration_ms: update.duration_ms,
    })
}
