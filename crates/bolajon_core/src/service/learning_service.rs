//! Attempt recording use-case.
//!
//! # Responsibility
//! - Evaluate a transcript against the target grapheme.
//! - Fold the attempt into progress, session history, and learner stats.
//!
//! # Invariants
//! - The whole fold runs in one `IMMEDIATE` transaction: prior progress is
//!   read, the next record written, the session appended, and stats
//!   recomputed before commit.
//! - `current_level` is recounted from stored progress after the write.
//! - A failed attempt (validation, missing learner, STT failure) writes
//!   nothing.

use crate::learning::achievements::{newly_unlocked, Achievement};
use crate::learning::matcher::is_match;
use crate::learning::tracker::{apply_to_stats, record_attempt, score_for};
use crate::model::alphabet::{grapheme_at, Grapheme};
use crate::model::progress::{AttemptOutcome, Progress};
use crate::model::session::LearningSession;
use crate::model::user::{UserId, UserStats};
use crate::model::validation::ValidationError;
use crate::repo::progress_repo::{ProgressRepository, SqliteProgressRepository};
use crate::repo::session_repo::{SessionRepository, SqliteSessionRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::now_epoch_ms;
use crate::speech::feedback::{Feedback, FeedbackRequest};
use crate::speech::provider::AudioClip;
use crate::speech::registry::{SpeechRegistry, SpeechRegistryError};
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const SESSIONS_DEFAULT_LIMIT: u32 = 20;
const SESSIONS_LIMIT_MAX: u32 = 100;

/// Service error for attempt use-cases.
#[derive(Debug)]
pub enum LearningServiceError {
    Validation(ValidationError),
    UserNotFound(UserId),
    Speech(SpeechRegistryError),
    Repo(RepoError),
}

impl Display for LearningServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Speech(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LearningServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::UserNotFound(_) => None,
            Self::Speech(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for LearningServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for LearningServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for LearningServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// One attempt submitted by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRequest {
    pub user_id: UserId,
    pub letter_index: u32,
    /// Pronunciation accuracy, 0..=100.
    pub accuracy: f64,
    /// Caller-evaluated correctness; derived from `transcript` when `None`.
    pub is_correct: Option<bool>,
    pub transcript: String,
    /// Target example word, empty for free practice.
    pub word: String,
    pub ai_feedback: String,
    pub duration_ms: u32,
}

impl AttemptRequest {
    /// Minimal request: correctness derived from the transcript.
    pub fn from_transcript(
        user_id: UserId,
        letter_index: u32,
        transcript: impl Into<String>,
        accuracy: f64,
    ) -> Self {
        Self {
            user_id,
            letter_index,
            accuracy,
            is_correct: None,
            transcript: transcript.into(),
            word: String::new(),
            ai_feedback: String::new(),
            duration_ms: 0,
        }
    }
}

/// One spoken attempt; the transcript comes from the speech registry.
#[derive(Debug, Clone, PartialEq)]
pub struct SpokenAttempt {
    pub user_id: UserId,
    pub letter_index: u32,
    /// Target example word; the grapheme's first example when empty.
    pub word: String,
    /// Client-measured accuracy. When `None` the feedback estimate is used,
    /// then the transcript confidence, then 0.
    pub accuracy: Option<f64>,
    pub duration_ms: u32,
}

impl SpokenAttempt {
    pub fn new(user_id: UserId, letter_index: u32, word: impl Into<String>) -> Self {
        Self {
            user_id,
            letter_index,
            word: word.into(),
            accuracy: None,
            duration_ms: 0,
        }
    }
}

/// Result of a recorded attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptReceipt {
    pub progress: Progress,
    pub stats: UserStats,
    pub is_correct: bool,
    pub score: u32,
    pub session_id: Uuid,
    /// Milestones crossed by this attempt.
    pub new_achievements: Vec<Achievement>,
    /// Pronunciation feedback, spoken attempts only.
    pub feedback: Option<Feedback>,
}

/// Attempt use-case service over one SQLite connection.
pub struct LearningService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> LearningService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Decides whether `transcript` is credited for the letter at `letter_index`.
    pub fn evaluate(letter_index: u32, transcript: &str) -> Result<bool, ValidationError> {
        let grapheme = resolve_grapheme(letter_index)?;
        Ok(is_match(
            transcript,
            grapheme.letter,
            &grapheme.example_words(),
        ))
    }

    /// Records one attempt and returns the updated state.
    ///
    /// # Errors
    /// - `Validation` for unknown letter index or accuracy outside `[0, 100]`.
    /// - `UserNotFound` when the learner does not exist.
    /// - `Repo` for storage failures; nothing is committed in that case.
    pub fn record_attempt(
        &mut self,
        request: &AttemptRequest,
    ) -> Result<AttemptReceipt, LearningServiceError> {
        let started_at = Instant::now();
        let grapheme = resolve_grapheme(request.letter_index)?;
        let is_correct = match request.is_correct {
            Some(value) => value,
            None => is_match(
                &request.transcript,
                grapheme.letter,
                &grapheme.example_words(),
            ),
        };
        let outcome = AttemptOutcome::new(is_correct, request.accuracy)?;
        let score = score_for(&outcome);
        let now_ms = now_epoch_ms();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let receipt = fold_attempt(&tx, request, grapheme, &outcome, score, now_ms)?;
        tx.commit()?;

        info!(
            "event=attempt_record module=service status=ok letter_index={} is_correct={} score={} words_completed={} level={} duration_ms={}",
            request.letter_index,
            receipt.is_correct,
            receipt.score,
            receipt.progress.words_completed,
            receipt.stats.current_level,
            started_at.elapsed().as_millis()
        );
        Ok(receipt)
    }

    /// Transcribes `audio`, asks the feedback chain about it, then records it.
    ///
    /// Correctness always comes from the letter matcher. Feedback only
    /// fills `ai_feedback` and, when the client sent none, the accuracy.
    /// A feedback failure is logged and the attempt is recorded without it.
    ///
    /// # Errors
    /// - `Speech` when every transcription provider fails; nothing is written.
    /// - Any `record_attempt` error.
    pub fn record_spoken_attempt(
        &mut self,
        speech: &SpeechRegistry,
        audio: &AudioClip,
        attempt: &SpokenAttempt,
    ) -> Result<AttemptReceipt, LearningServiceError> {
        let grapheme = resolve_grapheme(attempt.letter_index)?;
        let transcript = speech
            .transcribe(audio)
            .map_err(LearningServiceError::Speech)?;

        let word = if attempt.word.trim().is_empty() {
            grapheme.example_words()[0].to_string()
        } else {
            attempt.word.clone()
        };
        let feedback = analyze_pronunciation(speech, grapheme, &word, &transcript.text);

        let estimated = feedback
            .as_ref()
            .map(|feedback| feedback.accuracy)
            .or_else(|| {
                transcript
                    .confidence
                    .map(|confidence| f64::from(confidence) * 100.0)
            })
            .unwrap_or(0.0);
        // provider estimates are clamped; client values are validated
        let accuracy = attempt.accuracy.unwrap_or(estimated.clamp(0.0, 100.0));

        let request = AttemptRequest {
            user_id: attempt.user_id,
            letter_index: attempt.letter_index,
            accuracy,
            is_correct: None,
            transcript: transcript.text,
            word,
            ai_feedback: feedback
                .as_ref()
                .map(Feedback::summary)
                .unwrap_or_default(),
            duration_ms: attempt.duration_ms,
        };
        let mut receipt = self.record_attempt(&request)?;
        receipt.feedback = feedback;
        Ok(receipt)
    }

    /// Lists progress for one learner ordered by letter index.
    pub fn list_progress(&self, user_id: UserId) -> RepoResult<Vec<Progress>> {
        SqliteProgressRepository::new(&*self.conn).list_progress(user_id)
    }

    /// Lists recent sessions, newest first. Limit defaults to 20, max 100.
    pub fn list_sessions(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> RepoResult<Vec<LearningSession>> {
        let limit = normalize_sessions_limit(limit);
        SqliteSessionRepository::new(&*self.conn).list_sessions(user_id, limit)
    }
}

fn fold_attempt(
    conn: &Connection,
    request: &AttemptRequest,
    grapheme: &Grapheme,
    outcome: &AttemptOutcome,
    score: u32,
    now_ms: i64,
) -> Result<AttemptReceipt, LearningServiceError> {
    let users = SqliteUserRepository::new(conn);
    let progress_repo = SqliteProgressRepository::new(conn);
    let sessions = SqliteSessionRepository::new(conn);

    let user = users
        .get_user(request.user_id)?
        .ok_or(LearningServiceError::UserNotFound(request.user_id))?;
    let completed_before = progress_repo.count_completed(request.user_id)?;

    let prior = progress_repo.get_progress(request.user_id, request.letter_index)?;
    let progress = record_attempt(
        request.user_id,
        request.letter_index,
        grapheme,
        prior.as_ref(),
        outcome,
        now_ms,
    );
    progress_repo.upsert_progress(&progress)?;

    let session = LearningSession {
        id: Uuid::new_v4(),
        user_id: request.user_id,
        letter: grapheme.letter.to_string(),
        word: request.word.clone(),
        user_speech: if request.transcript.trim().is_empty() {
            request.word.clone()
        } else {
            request.transcript.clone()
        },
        is_correct: outcome.is_correct,
        ai_feedback: request.ai_feedback.clone(),
        score,
        duration_ms: request.duration_ms,
        created_at: now_ms,
    };
    sessions.insert_session(&session)?;

    let completed_after = progress_repo.count_completed(request.user_id)?;
    let stats = apply_to_stats(&user.stats, outcome, score, completed_after);
    users.update_stats(request.user_id, &stats)?;

    Ok(AttemptReceipt {
        progress,
        stats,
        is_correct: outcome.is_correct,
        score,
        session_id: session.id,
        new_achievements: newly_unlocked(completed_before, completed_after),
        feedback: None,
    })
}

fn analyze_pronunciation(
    speech: &SpeechRegistry,
    grapheme: &Grapheme,
    expected_word: &str,
    spoken_word: &str,
) -> Option<Feedback> {
    if !speech.has_feedback() {
        return None;
    }
    let request = FeedbackRequest {
        expected_word: expected_word.to_string(),
        spoken_word: spoken_word.to_string(),
        letter: grapheme.letter.to_string(),
    };
    match speech.analyze(&request) {
        Ok(feedback) => Some(feedback),
        Err(err) => {
            warn!(
                "event=attempt_feedback module=service status=error letter={} error={}",
                grapheme.letter, err
            );
            None
        }
    }
}

fn resolve_grapheme(letter_index: u32) -> Result<&'static Grapheme, ValidationError> {
    grapheme_at(letter_index as usize).ok_or(ValidationError::UnknownLetterIndex(letter_index))
}

fn normalize_sessions_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => SESSIONS_DEFAULT_LIMIT,
        Some(value) => value.min(SESSIONS_LIMIT_MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_sessions_limit, LearningService};

    #[test]
    fn evaluate_uses_alphabet_example_words() {
        assert!(LearningService::evaluate(0, "anor").unwrap());
        assert!(LearningService::evaluate(28, "ting").unwrap());
        assert!(!LearningService::evaluate(28, "nga").unwrap());
        assert!(LearningService::evaluate(29, "anor").is_err());
    }

    #[test]
    fn sessions_limit_defaults_and_clamps() {
        assert_eq!(normalize_sessions_limit(None), 20);
        assert_eq!(normalize_sessions_limit(Some(0)), 20);
        assert_eq!(normalize_sessions_limit(Some(500)), 100);
        assert_eq!(normalize_sessions_limit(Some(5)), 5);
    }
}
