//! Client-local key-value store using SQLite

use crate::error::Result;
use crate::models::UserProfile;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const PROFILE_KEY: &str = "current_user";

pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let conn = Connection::open(data_dir.join("murmur.db"))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ========================================================================
    // Current user
    // ========================================================================

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.save_setting(PROFILE_KEY, &serde_json::to_string(profile)?)
    }

    pub fn load_profile(&self) -> Result<Option<UserProfile>> {
        match self.get_setting(PROFILE_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn clear_profile(&self) -> Result<()> {
        self.delete_setting(PROFILE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThemePreference;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            display_name: "Ada".into(),
            avatar_url: None,
            theme: ThemePreference::Dark,
        }
    }

    #[test]
    fn test_settings_roundtrip() {
        let store = LocalStore::in_memory().unwrap();
        assert_eq!(store.get_setting("k").unwrap(), None);

        store.save_setting("k", "v1").unwrap();
        store.save_setting("k", "v2").unwrap();
        assert_eq!(store.get_setting("k").unwrap().as_deref(), Some("v2"));

        store.delete_setting("k").unwrap();
        assert_eq!(store.get_setting("k").unwrap(), None);
    }

    #[test]
    fn test_profile_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = LocalStore::open(dir.path()).unwrap();
            store.save_profile(&profile()).unwrap();
        }

        let reopened = LocalStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load_profile().unwrap(), Some(profile()));

        reopened.clear_profile().unwrap();
        assert_eq!(reopened.load_profile().unwrap(), None);
    }
}
