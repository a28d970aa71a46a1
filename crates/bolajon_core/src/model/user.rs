//! Learner record and aggregate stats.
//!
//! # Responsibility
//! - Define the canonical learner record and its aggregate counters.
//! - Sanitise and validate registration input before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another learner.
//! - `stats.current_level` never exceeds `ALPHABET_LEN`.
//! - Stats are never negative; signed adjustments clamp at zero.

use crate::model::alphabet::ALPHABET_LEN;
use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable learner identifier.
pub type UserId = Uuid;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const AGE_MIN: u32 = 4;
pub const AGE_MAX: u32 = 7;

const DEMO_EMAIL_DOMAIN: &str = "demo.com";

static MARKUP_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<>]").expect("valid markup regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Aggregate gamification counters for one learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_stars: u32,
    pub total_score: u32,
    /// Count of completed graphemes, capped at `ALPHABET_LEN`.
    pub current_level: u32,
}

/// Signed stat adjustment requested by a client (demo/admin surfaces).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsAdjustment {
    pub stars_delta: i64,
    pub score_delta: i64,
}

impl UserStats {
    /// Applies signed deltas with `max(0, value)` clamping.
    pub fn adjusted(&self, adjustment: StatsAdjustment) -> Self {
        Self {
            total_stars: clamp_add(self.total_stars, adjustment.stars_delta),
            total_score: clamp_add(self.total_score, adjustment.score_delta),
            current_level: self.current_level,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.current_level as usize > ALPHABET_LEN {
            return Err(ValidationError::LevelOverflow(self.current_level));
        }
        Ok(())
    }
}

fn clamp_add(value: u32, delta: i64) -> u32 {
    let next = i64::from(value).saturating_add(delta).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

/// Persisted learner record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: u32,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub stats: UserStats,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub age: u32,
    pub email: String,
}

impl NewUser {
    /// Sanitises and validates registration input.
    ///
    /// # Contract
    /// - Name is trimmed and stripped of `<`/`>` before length checks.
    /// - Email is derived as `lowercase(name without whitespace)@demo.com`.
    ///
    /// # Errors
    /// - `NameLength` when the sanitised name is not 2..=50 chars.
    /// - `AgeOutOfRange` when age is not 4..=7.
    pub fn new(name: &str, age: u32) -> Result<Self, ValidationError> {
        let name = sanitize_input(name);
        let chars = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
            return Err(ValidationError::NameLength { chars });
        }
        if !(AGE_MIN..=AGE_MAX).contains(&age) {
            return Err(ValidationError::AgeOutOfRange(age));
        }

        let email = demo_email(&name);
        Ok(Self { name, age, email })
    }

    /// Builds the full record with a fresh id and zeroed stats.
    pub fn into_user(self, created_at: i64) -> User {
        User {
            id: Uuid::new_v4(),
            name: self.name,
            age: self.age,
            email: Some(self.email),
            avatar: None,
            stats: UserStats::default(),
            created_at,
        }
    }
}

/// Trims input and removes markup angle brackets.
pub fn sanitize_input(input: &str) -> String {
    MARKUP_CHARS_RE.replace_all(input.trim(), "").into_owned()
}

fn demo_email(name: &str) -> String {
    let local = WHITESPACE_RE.replace_all(&name.to_lowercase(), "").into_owned();
    format!("{local}@{DEMO_EMAIL_DOMAIN}")
}
