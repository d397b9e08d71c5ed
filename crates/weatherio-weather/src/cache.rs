//! Key-value cache for the last known location and the latest snapshot pair.
//!
//! Telemetry and pollutant payloads are committed together: each commit writes
//! both into the inactive slot and then flips a single pointer key, so readers
//! always see a matching pair even though the store is only atomic per key.
//! The bare `cachedWeather` / `cachedAirPollution` names are never written;
//! readers go through [`SnapshotCache::read_pair`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::types::{Location, PollutantSnapshot, TelemetrySnapshot};

/// Fixed cache key names
pub mod keys {
    pub const USER_LOCATION: &str = "userLocation";
    pub const CACHED_WEATHER: &str = "cachedWeather";
    pub const CACHED_AIR_POLLUTION: &str = "cachedAirPollution";
    /// Names the slot holding the committed weather/pollution pair
    pub const SNAPSHOT_SLOT: &str = "cachedSnapshotSlot";
}

/// Cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt cache entry {key}: {message}")]
    Corrupt { key: String, message: String },
}

impl From<rusqlite::Error> for CacheError {
    fn from(e: rusqlite::Error) -> Self {
        CacheError::Storage(e.to_string())
    }
}

/// Opaque string key-value store, atomic per individual key.
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// In-process store, used by tests and hosts without persistent storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed store with a single `kv` table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store at the given path.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or the schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Storage(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Fails if SQLite cannot allocate the database.
    pub fn in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self
            .conn
            .lock()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// One of the two buffers a snapshot pair can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    fn name(self) -> &'static str {
        match self {
            Slot::A => "a",
            Slot::B => "b",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "a" => Some(Slot::A),
            "b" => Some(Slot::B),
            _ => None,
        }
    }

    fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    /// Slot-qualified key, e.g. `cachedWeather/a`.
    pub fn key(self, base: &str) -> String {
        format!("{}/{}", base, self.name())
    }
}

/// Decoded snapshot pair as last committed.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    pub weather: TelemetrySnapshot,
    pub air_pollution: PollutantSnapshot,
}

/// Typed access to the cache keys used by the refresh cycle and the UI.
#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Last resolved location.
    ///
    /// # Errors
    ///
    /// Returns `Corrupt` when the stored value does not decode.
    pub fn read_location(&self) -> Result<Option<Location>, CacheError> {
        let Some(raw) = self.store.get(keys::USER_LOCATION)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::Corrupt {
                key: keys::USER_LOCATION.to_string(),
                message: e.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns an error if the location cannot be serialized or stored.
    pub fn write_location(&self, location: &Location) -> Result<(), CacheError> {
        let raw = serde_json::to_string(location)?;
        self.store.set(keys::USER_LOCATION, &raw)
    }

    /// Slot holding the committed pair, if any commit has happened.
    fn active_slot(&self) -> Result<Option<Slot>, CacheError> {
        Ok(self
            .store
            .get(keys::SNAPSHOT_SLOT)?
            .as_deref()
            .and_then(Slot::parse))
    }

    /// Commit a telemetry/pollutant pair as one unit.
    ///
    /// Both payloads are serialized before anything is written, then stored in
    /// the inactive slot; the pointer flip is the single write that publishes
    /// them. A failure before the flip leaves the previous pair visible.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any store write fails.
    pub fn commit_pair(
        &self,
        weather: &TelemetrySnapshot,
        air_pollution: &PollutantSnapshot,
    ) -> Result<Slot, CacheError> {
        let weather_raw = serde_json::to_string(weather)?;
        let pollution_raw = serde_json::to_string(air_pollution)?;

        let target = self.active_slot()?.map_or(Slot::A, Slot::other);

        self.store.set(&target.key(keys::CACHED_WEATHER), &weather_raw)?;
        self.store.set(&target.key(keys::CACHED_AIR_POLLUTION), &pollution_raw)?;
        self.store.set(keys::SNAPSHOT_SLOT, target.name())?;

        tracing::debug!("Committed snapshot pair to slot {}", target.name());
        Ok(target)
    }

    /// Raw JSON of the committed pair, `(weather, air_pollution)`.
    ///
    /// # Errors
    ///
    /// Returns `Corrupt` when the pointer names a slot with missing payloads.
    pub fn read_raw_pair(&self) -> Result<Option<(String, String)>, CacheError> {
        let Some(slot) = self.active_slot()? else {
            return Ok(None);
        };

        let weather_key = slot.key(keys::CACHED_WEATHER);
        let pollution_key = slot.key(keys::CACHED_AIR_POLLUTION);
        let weather = self.store.get(&weather_key)?;
        let pollution = self.store.get(&pollution_key)?;

        match (weather, pollution) {
            (Some(w), Some(p)) => Ok(Some((w, p))),
            (None, _) => Err(CacheError::Corrupt {
                key: weather_key,
                message: "missing payload for committed slot".into(),
            }),
            (_, None) => Err(CacheError::Corrupt {
                key: pollution_key,
                message: "missing payload for committed slot".into(),
            }),
        }
    }

    /// Decoded committed pair.
    ///
    /// # Errors
    ///
    /// Returns `Corrupt` when the stored payloads do not decode.
    pub fn read_pair(&self) -> Result<Option<CachedSnapshot>, CacheError> {
        let Some((weather_raw, pollution_raw)) = self.read_raw_pair()? else {
            return Ok(None);
        };

        let weather = serde_json::from_str(&weather_raw).map_err(|e| CacheError::Corrupt {
            key: keys::CACHED_WEATHER.to_string(),
            message: e.to_string(),
        })?;
        let air_pollution =
            serde_json::from_str(&pollution_raw).map_err(|e| CacheError::Corrupt {
                key: keys::CACHED_AIR_POLLUTION.to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(CachedSnapshot {
            weather,
            air_pollution,
        }))
    }
}
