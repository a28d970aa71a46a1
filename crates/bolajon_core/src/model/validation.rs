//! Validation errors raised at the core boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected input or inconsistent model state.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Sanitised name is shorter than 2 or longer than 50 chars.
    NameLength { chars: usize },
    /// Age outside the supported 4..=7 range.
    AgeOutOfRange(u32),
    /// Accuracy is not a finite value in `[0, 100]`.
    AccuracyOutOfRange(f64),
    /// Letter index does not address a grapheme.
    UnknownLetterIndex(u32),
    /// Letter string does not name a grapheme.
    UnknownLetter(String),
    /// Stored letter and letter index disagree.
    LetterMismatch { letter: String, letter_index: u32 },
    /// `words_completed` exceeds `total_words`.
    WordsCompletedOverflow { words_completed: u32, total_words: u32 },
    /// `current_level` exceeds the alphabet length.
    LevelOverflow(u32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameLength { chars } => {
                write!(f, "name must be 2..=50 characters, got {chars}")
            }
            Self::AgeOutOfRange(age) => write!(f, "age must be 4..=7, got {age}"),
            Self::AccuracyOutOfRange(value) => {
                write!(f, "accuracy must be within [0, 100], got {value}")
            }
            Self::UnknownLetterIndex(index) => write!(f, "unknown letter index: {index}"),
            Self::UnknownLetter(letter) => write!(f, "unknown letter: `{letter}`"),
            Self::LetterMismatch {
                letter,
                letter_index,
            } => write!(
                f,
                "letter `{letter}` does not match letter index {letter_index}"
            ),
            Self::WordsCompletedOverflow {
                words_completed,
                total_words,
            } => write!(
                f,
                "words_completed ({words_completed}) exceeds total_words ({total_words})"
            ),
            Self::LevelOverflow(level) => write!(f, "current_level {level} exceeds alphabet length"),
        }
    }
}

impl Error for ValidationError {}

/// Checks that `accuracy` is a finite percentage.
pub fn validate_accuracy(accuracy: f64) -> Result<(), ValidationError> {
    if accuracy.is_finite() && (0.0..=100.0).contains(&accuracy) {
        Ok(())
    } else {
        Err(ValidationError::AccuracyOutOfRange(accuracy))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_accuracy, ValidationError};

    #[test]
    fn accuracy_bounds_are_inclusive() {
        assert!(validate_accuracy(0.0).is_ok());
        assert!(validate_accuracy(100.0).is_ok());
        assert_eq!(
            validate_accuracy(100.5),
            Err(ValidationError::AccuracyOutOfRange(100.5))
        );
        assert!(validate_accuracy(-1.0).is_err());
        assert!(validate_accuracy(f64::NAN).is_err());
    }
}
