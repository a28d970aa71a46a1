//! Folds attempt outcomes into progress and learner stats.
//!
//! # Responsibility
//! - Compute the next `Progress` from the prior record and one outcome.
//! - Compute score and the next `UserStats` after an attempt.
//!
//! # Invariants
//! - `words_completed` is capped at `WORDS_PER_LETTER` and never decreases.
//! - `accuracy` stays the mean of all submitted accuracies.
//! - `completed_at` is re-stamped with `now_ms` on every call once the cap
//!   is reached (last-practised semantics), `None` before that.
//! - `current_level` is derived from the completed count, never incremented.

use crate::model::alphabet::{Grapheme, ALPHABET_LEN, WORDS_PER_LETTER};
use crate::model::progress::{AttemptOutcome, Progress};
use crate::model::user::{UserId, UserStats};

/// Score awarded for one attempt: accuracy floored to a multiple of 10,
/// zero when incorrect.
pub fn score_for(outcome: &AttemptOutcome) -> u32 {
    if !outcome.is_correct {
        return 0;
    }
    // accuracy is validated to [0, 100]
    ((outcome.accuracy / 10.0).floor() as u32) * 10
}

/// Returns the next progress record for `(user_id, grapheme)`.
///
/// `prior = None` means this is the first attempt for the pair.
pub fn record_attempt(
    user_id: UserId,
    letter_index: u32,
    grapheme: &Grapheme,
    prior: Option<&Progress>,
    outcome: &AttemptOutcome,
    now_ms: i64,
) -> Progress {
    let gained = u32::from(outcome.is_correct);
    let (words_completed, accuracy, attempts_count) = match prior {
        None => (gained, outcome.accuracy, 1),
        Some(prior) => {
            let words = (prior.words_completed + gained).min(WORDS_PER_LETTER);
            let count = f64::from(prior.attempts_count);
            let mean = (prior.accuracy * count + outcome.accuracy) / (count + 1.0);
            (words, mean, prior.attempts_count + 1)
        }
    };

    Progress {
        user_id,
        letter: grapheme.letter.to_string(),
        letter_index,
        words_completed,
        total_words: WORDS_PER_LETTER,
        accuracy,
        attempts_count,
        completed_at: (words_completed >= WORDS_PER_LETTER).then_some(now_ms),
    }
}

/// Derives the level from the number of completed graphemes.
pub fn level_for(completed_letters: usize) -> u32 {
    // ALPHABET_LEN fits in u32
    completed_letters.min(ALPHABET_LEN) as u32
}

/// Returns the learner stats after one attempt.
///
/// `completed_letters` must be counted after the attempt's progress write.
pub fn apply_to_stats(
    stats: &UserStats,
    outcome: &AttemptOutcome,
    score: u32,
    completed_letters: usize,
) -> UserStats {
    let total_stars = if outcome.is_correct {
        stats.total_stars.saturating_add(score / 10)
    } else {
        stats.total_stars
    };

    UserStats {
        total_stars,
        total_score: stats.total_score.saturating_add(score),
        current_level: level_for(completed_letters),
    }
}
