//! Speech provider contract and value types.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Captured learner audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    /// e.g. `audio/webm`, `audio/wav`.
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Speech-to-text result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    /// Provider confidence in `[0, 1]` when reported.
    pub confidence: Option<f32>,
    pub provider_id: String,
}

/// Reference to synthesized audio (URL, data URI, or cache key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    pub uri: String,
    pub mime_type: String,
    pub provider_id: String,
}

/// Operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechStage {
    Transcribe,
    Synthesize,
    Analyze,
}

impl SpeechStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::Synthesize => "synthesize",
            Self::Analyze => "analyze",
        }
    }
}

/// Provider failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechError {
    pub provider_id: String,
    pub stage: SpeechStage,
    /// Stable machine-readable code, e.g. `timeout`, `unauthorized`.
    pub code: String,
    pub message: String,
    /// Whether the caller may retry the same provider later.
    pub retryable: bool,
}

impl SpeechError {
    pub fn new(
        provider_id: impl Into<String>,
        stage: SpeechStage,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            stage,
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }
}

impl Display for SpeechError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} failed ({}): {}",
            self.provider_id,
            self.stage.as_str(),
            self.code,
            self.message
        )
    }
}

impl Error for SpeechError {}

pub type SpeechResult<T> = Result<T, SpeechError>;

/// Contract implemented by each speech provider adapter.
///
/// Implementations own their transport, timeouts, and credentials.
pub trait SpeechService: Send + Sync {
    /// Stable lowercase id (`[a-z0-9_-]+`).
    fn provider_id(&self) -> &str;
    fn transcribe(&self, audio: &AudioClip) -> SpeechResult<Transcript>;
    fn synthesize(&self, text: &str) -> SpeechResult<AudioRef>;
}
