//! Per-learner, per-grapheme progress record.
//!
//! # Responsibility
//! - Define the durable progress shape folded by the progress tracker.
//! - Define the attempt outcome consumed by the tracker.
//!
//! # Invariants
//! - `words_completed <= total_words` (`WORDS_PER_LETTER`).
//! - `accuracy` is the arithmetic mean of every attempt ever recorded.
//! - `attempts_count` counts every attempt, correct or not.
//! - `letter` always names the grapheme at `letter_index`.

use crate::model::alphabet::grapheme_at;
use crate::model::user::UserId;
use crate::model::validation::{validate_accuracy, ValidationError};
use serde::{Deserialize, Serialize};

/// Durable learning record, unique per `(user_id, letter_index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub user_id: UserId,
    /// Display letter, e.g. `Sh`.
    pub letter: String,
    /// Position of `letter` in the alphabet.
    pub letter_index: u32,
    pub words_completed: u32,
    pub total_words: u32,
    /// Running mean over all attempts, 0..=100.
    pub accuracy: f64,
    pub attempts_count: u32,
    /// Unix epoch milliseconds; `Some` once `words_completed` reaches the cap.
    pub completed_at: Option<i64>,
}

impl Progress {
    /// Returns whether all example words have been completed.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Validates model invariants.
    ///
    /// Used by repository write paths and when reading persisted rows.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let grapheme = grapheme_at(self.letter_index as usize)
            .ok_or(ValidationError::UnknownLetterIndex(self.letter_index))?;
        if grapheme.letter != self.letter {
            return Err(ValidationError::LetterMismatch {
                letter: self.letter.clone(),
                letter_index: self.letter_index,
            });
        }
        if self.words_completed > self.total_words {
            return Err(ValidationError::WordsCompletedOverflow {
                words_completed: self.words_completed,
                total_words: self.total_words,
            });
        }
        validate_accuracy(self.accuracy)
    }
}

/// Evaluated result of one spoken attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub is_correct: bool,
    /// Pronunciation accuracy, 0..=100.
    pub accuracy: f64,
}

impl AttemptOutcome {
    pub fn new(is_correct: bool, accuracy: f64) -> Result<Self, ValidationError> {
        validate_accuracy(accuracy)?;
        Ok(Self {
            is_correct,
            accuracy,
        })
    }
}
