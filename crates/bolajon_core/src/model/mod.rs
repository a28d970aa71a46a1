//! Domain model for alphabet learning state.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own boundary validation for values entering the core.
//!
//! # Invariants
//! - Users are identified by a stable `UserId`.
//! - Progress is unique per `(user_id, letter_index)`.
//! - Progress and stats are owned by exactly one user.

pub mod alphabet;
pub mod leaderboard;
pub mod progress;
pub mod session;
pub mod user;
pub mod validation;
