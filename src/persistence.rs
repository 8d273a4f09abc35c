//! Key-value persistence for settings, goals and study history.

use crate::models::{Goal, Settings, StudySession};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const GOALS_KEY: &str = "SavedGoals";
pub const SESSIONS_KEY: &str = "SavedStudySessions";
pub const CYCLE_COUNT_KEY: &str = "pomodoroCountInCycle";
pub const FOCUS_KEY: &str = "pomodoroDuration";
pub const SHORT_BREAK_KEY: &str = "shortBreakDuration";
pub const LONG_BREAK_KEY: &str = "longBreakDuration";
pub const BEFORE_LONG_BREAK_KEY: &str = "pomodorosBeforeLongBreak";
pub const STRICT_MODE_KEY: &str = "isSevereModeEnabled";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create database directory")]
    DirectoryCreation,
}

/// Load/save by key. Values are opaque bytes.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError>;
    fn save(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError>;
}

/// SQLite-backed store with a single key/value table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database in the platform data directory, initializing tables if needed.
    pub fn new() -> Result<Self, DatabaseError> {
        Self::open(&Self::db_path())
    }

    /// Opens (or creates) a database file at `path`.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| DatabaseError::DirectoryCreation)?;
        }

        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;
        debug!(path = %path.display(), "opened database");

        Ok(Self { conn })
    }

    /// Creates an in-memory database.
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    fn db_path() -> PathBuf {
        ProjectDirs::from("com", "studytimer", "StudyTimer")
            .map(|dirs| dirs.data_dir().join("studytimer.db"))
            .unwrap_or_else(|| PathBuf::from("studytimer.db"))
    }
}

impl KeyValueStore for Database {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Volatile store, for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Example goals offered on first launch.
pub fn seed_goals() -> Vec<Goal> {
    [
        ("Study maths for 2 hours", 5),
        ("Review the history chapter", 3),
        ("Do 4 Pomodoro sessions", 4),
    ]
    .into_iter()
    .filter_map(|(title, target)| Goal::new(title, target).ok())
    .collect()
}

fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<Vec<T>>, DatabaseError> {
    match store.load(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn save_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), DatabaseError> {
    let bytes = serde_json::to_vec(items)?;
    store.save(key, &bytes)
}

/// Loads goals, falling back to the seed set when nothing usable is stored.
pub fn load_goals(store: &dyn KeyValueStore) -> Vec<Goal> {
    match load_collection(store, GOALS_KEY) {
        Ok(Some(goals)) => goals,
        Ok(None) => seed_goals(),
        Err(e) => {
            warn!(error = %e, "failed to load goals, using examples");
            seed_goals()
        }
    }
}

pub fn save_goals(store: &dyn KeyValueStore, goals: &[Goal]) -> Result<(), DatabaseError> {
    save_collection(store, GOALS_KEY, goals)
}

/// Loads the study history, falling back to an empty log.
pub fn load_sessions(store: &dyn KeyValueStore) -> Vec<StudySession> {
    match load_collection(store, SESSIONS_KEY) {
        Ok(Some(sessions)) => sessions,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to load study sessions, starting empty");
            Vec::new()
        }
    }
}

pub fn save_sessions(
    store: &dyn KeyValueStore,
    sessions: &[StudySession],
) -> Result<(), DatabaseError> {
    save_collection(store, SESSIONS_KEY, sessions)
}

fn load_scalar<T: std::str::FromStr>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let bytes = match store.load(key) {
        Ok(bytes) => bytes?,
        Err(e) => {
            warn!(key, error = %e, "failed to load setting");
            return None;
        }
    };
    std::str::from_utf8(&bytes).ok()?.trim().parse().ok()
}

fn save_scalar<T: ToString>(
    store: &dyn KeyValueStore,
    key: &str,
    value: T,
) -> Result<(), DatabaseError> {
    store.save(key, value.to_string().as_bytes())
}

/// Loads settings value by value. Missing, unreadable or zero values use defaults.
pub fn load_settings(store: &dyn KeyValueStore) -> Settings {
    let defaults = Settings::default();
    Settings {
        focus_mins: load_scalar(store, FOCUS_KEY).unwrap_or(defaults.focus_mins),
        short_break_mins: load_scalar(store, SHORT_BREAK_KEY).unwrap_or(defaults.short_break_mins),
        long_break_mins: load_scalar(store, LONG_BREAK_KEY).unwrap_or(defaults.long_break_mins),
        pomodoros_before_long_break: load_scalar(store, BEFORE_LONG_BREAK_KEY)
            .unwrap_or(defaults.pomodoros_before_long_break),
        strict_mode: load_scalar(store, STRICT_MODE_KEY).unwrap_or(defaults.strict_mode),
    }
    .sanitized()
}

/// Saves every setting under its own key.
pub fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> Result<(), DatabaseError> {
    save_scalar(store, FOCUS_KEY, settings.focus_mins)?;
    save_scalar(store, SHORT_BREAK_KEY, settings.short_break_mins)?;
    save_scalar(store, LONG_BREAK_KEY, settings.long_break_mins)?;
    save_scalar(
        store,
        BEFORE_LONG_BREAK_KEY,
        settings.pomodoros_before_long_break,
    )?;
    save_scalar(store, STRICT_MODE_KEY, settings.strict_mode)?;
    Ok(())
}

pub fn load_cycle_count(store: &dyn KeyValueStore) -> u32 {
    load_scalar(store, CYCLE_COUNT_KEY).unwrap_or(0)
}

pub fn save_cycle_count(store: &dyn KeyValueStore, count: u32) -> Result<(), DatabaseError> {
    save_scalar(store, CYCLE_COUNT_KEY, count)
}
