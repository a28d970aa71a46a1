//! Core domain logic for the Bolajon alphabet tutor.
//! This crate is the single source of truth for learning rules and
//! persisted learner state.

pub mod db;
pub mod learning;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod speech;
pub mod state;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use learning::achievements::Achievement;
pub use learning::matcher::is_match;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::alphabet::{find_grapheme, grapheme_at, Grapheme, ALPHABET, ALPHABET_LEN};
pub use model::leaderboard::{LeaderboardCandidate, LeaderboardEntry, RankedScore};
pub use model::progress::{AttemptOutcome, Progress};
pub use model::session::LearningSession;
pub use model::user::{StatsAdjustment, User, UserId, UserStats};
pub use model::validation::ValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::leaderboard_service::{rank_by_score, LeaderboardService};
pub use service::learning_service::{
    AttemptReceipt, AttemptRequest, LearningService, LearningServiceError, SpokenAttempt,
};
pub use service::user_service::{UserProfile, UserService, UserServiceError};
pub use speech::feedback::{ExactMatchFeedback, Feedback, FeedbackRequest, FeedbackService};
pub use speech::provider::{AudioClip, AudioRef, SpeechError, SpeechService, Transcript};
pub use speech::registry::{SpeechRegistry, SpeechRegistryError};
pub use state::{InMemoryStateStore, SqliteStateStore, StateStore, StateStoreError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
