//! Pronunciation feedback contract and the local exact-match provider.

use crate::speech::provider::SpeechResult;
use serde::{Deserialize, Serialize};

/// What the learner was asked to say and what was heard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub expected_word: String,
    pub spoken_word: String,
    pub letter: String,
}

/// Child-facing assessment of one pronunciation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub is_correct: bool,
    /// Estimated pronunciation accuracy, 0..=100.
    pub accuracy: f64,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mistakes: Vec<String>,
    pub encouragement: String,
    pub provider_id: String,
}

impl Feedback {
    /// Feedback and encouragement joined into one line for the session log.
    pub fn summary(&self) -> String {
        [self.feedback.trim(), self.encouragement.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Contract implemented by each feedback adapter (LLM or local).
pub trait FeedbackService: Send + Sync {
    /// Stable lowercase id (`[a-z0-9_-]+`).
    fn provider_id(&self) -> &str;
    fn analyze(&self, request: &FeedbackRequest) -> SpeechResult<Feedback>;
}

/// Offline provider: case-insensitive exact comparison of spoken and
/// expected word. Never fails, so it fits last in a fallback order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatchFeedback;

impl ExactMatchFeedback {
    pub const PROVIDER_ID: &'static str = "exact_match";
}

impl FeedbackService for ExactMatchFeedback {
    fn provider_id(&self) -> &str {
        Self::PROVIDER_ID
    }

    fn analyze(&self, request: &FeedbackRequest) -> SpeechResult<Feedback> {
        let same = request.spoken_word.trim().to_lowercase()
            == request.expected_word.trim().to_lowercase();
        let (accuracy, feedback, mistakes) = if same {
            (100.0, "Ajoyib! To'g'ri talaffuz qildingiz!", Vec::new())
        } else {
            (
                50.0,
                "Yana bir bor urinib ko'ring.",
                vec!["Talaffuzni yaxshilash kerak".to_string()],
            )
        };
        Ok(Feedback {
            is_correct: same,
            accuracy,
            feedback: feedback.to_string(),
            mistakes,
            encouragement: "Davom eting, siz yaxshi qilyapsiz!".to_string(),
            provider_id: Self::PROVIDER_ID.to_string(),
        })
    }
}
