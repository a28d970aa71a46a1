//! `app_state` table backed state store.

use crate::state::{normalize_key, StateResult, StateStore};
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed key-value store.
pub struct SqliteStateStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StateStore for SqliteStateStore<'_> {
    fn get(&self, key: &str) -> StateResult<Option<String>> {
        let key = normalize_key(key)?;
        let value = self
            .conn
            .query_row("SELECT value FROM app_state WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StateResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StateResult<bool> {
        let key = normalize_key(key)?;
        let removed = self
            .conn
            .execute("DELETE FROM app_state WHERE key = ?1;", [key])?;
        Ok(removed > 0)
    }

    fn clear(&mut self) -> StateResult<()> {
        self.conn.execute("DELETE FROM app_state;", [])?;
        Ok(())
    }
}
