//! Injected key-value state provider.
//!
//! # Responsibility
//! - Give callers one contract for small client-side state (active learner,
//!   UI preferences) regardless of where it lives.
//!
//! # Invariants
//! - Keys are non-empty, at most `MAX_KEY_CHARS` chars, and trimmed.
//! - Learning rules never read this store; they take plain values.

use crate::repo::RepoError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteStateStore;

pub const MAX_KEY_CHARS: usize = 128;

/// State store errors.
#[derive(Debug)]
pub enum StateStoreError {
    InvalidKey(String),
    Repo(RepoError),
}

impl Display for StateStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid state key: `{key}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StateStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for StateStoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for StateStoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

pub type StateResult<T> = Result<T, StateStoreError>;

/// Key-value contract with get/set/remove/clear.
pub trait StateStore {
    fn get(&self, key: &str) -> StateResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StateResult<()>;
    /// Returns whether a value was removed.
    fn remove(&mut self, key: &str) -> StateResult<bool>;
    fn clear(&mut self) -> StateResult<()>;
}

/// Non-persistent store for tests and embedded callers.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStateStore {
    values: BTreeMap<String, String>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, key: &str) -> StateResult<Option<String>> {
        let key = normalize_key(key)?;
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StateResult<()> {
        let key = normalize_key(key)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StateResult<bool> {
        let key = normalize_key(key)?;
        Ok(self.values.remove(key).is_some())
    }

    fn clear(&mut self) -> StateResult<()> {
        self.values.clear();
        Ok(())
    }
}

pub(crate) fn normalize_key(key: &str) -> StateResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_KEY_CHARS {
        return Err(StateStoreError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}
