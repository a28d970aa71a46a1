//! Pure learning rules: transcript matching, progress folding, milestones.
//!
//! # Responsibility
//! - Hold every rule that decides correctness, score, and level.
//! - Stay free of I/O so callers can persist results however they like.
//!
//! # See also
//! - `service::learning_service` for the transactional wrapper.

pub mod achievements;
pub mod matcher;
pub mod tracker;
