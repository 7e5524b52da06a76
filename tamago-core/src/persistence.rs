//! Save-record persistence.
//!
//! A save holds exactly one pet. The persisted schema is a strict subset
//! of the runtime one: [`PetRecord`] carries no hooks, dice or scheduler,
//! and a loaded record has to be re-attached with [`crate::Pet::attach`]
//! before anything can happen to it.
//!
//! On disk every backend stores the same JSON document:
//!
//! ```json
//! { "version": 1, "saved_at": "2026-10-19T12:00:00Z", "pet": { ... } }
//! ```
//!
//! Stores are injected through [`PetStore`], so sessions, tests and tools
//! can each pick their own backend instead of sharing one fixed file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{Result, TamagoError};
use crate::pet::PetRecord;

/// Current save format version.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The document written by every store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Format version, see [`FORMAT_VERSION`].
    pub version: u32,
    /// When the save was written.
    pub saved_at: DateTime<Utc>,
    /// The pet.
    pub pet: PetRecord,
}

/// Encode a record into a save document.
///
/// # Errors
///
/// Returns [`TamagoError::Serialization`] if encoding fails.
pub fn encode(record: &PetRecord) -> Result<Vec<u8>> {
    let file = SaveFile {
        version: FORMAT_VERSION,
        saved_at: Utc::now(),
        pet: record.clone(),
    };
    Ok(serde_json::to_vec_pretty(&file)?)
}

/// Decode a save document.
///
/// # Errors
///
/// Returns [`TamagoError::Serialization`] for malformed JSON, out-of-range
/// values, or an unsupported format version.
pub fn decode(bytes: &[u8]) -> Result<SaveFile> {
    let file: SaveFile = serde_json::from_slice(bytes)?;
    if file.version != FORMAT_VERSION {
        return Err(TamagoError::Serialization(format!(
            "unsupported save format version {} (expected {FORMAT_VERSION})",
            file.version
        )));
    }
    Ok(file)
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Where a single pet is saved between sessions.
pub trait PetStore: Send + Sync {
    /// Load the saved pet, or `None` if there is no save.
    ///
    /// # Errors
    ///
    /// Returns an error if a save exists but cannot be read or decoded.
    fn load(&self) -> Result<Option<PetRecord>>;

    /// Save (overwrite) the pet.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save(&self, record: &PetRecord) -> Result<()>;

    /// Remove the save. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the save exists but cannot be removed.
    fn delete(&self) -> Result<bool>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Open the backend named by `config.backend`.
///
/// # Errors
///
/// Returns [`TamagoError::Config`] for an unknown backend, or the
/// backend's own error if it cannot be opened.
pub fn open_store(config: &PersistenceConfig) -> Result<Box<dyn PetStore>> {
    match config.backend.as_str() {
        "json" => Ok(Box::new(JsonFileStore::new(&config.path))),
        "sqlite" => Ok(Box::new(SqliteStore::open(&config.path, config)?)),
        "memory" => Ok(Box::new(MemoryStore::new())),
        other => Err(TamagoError::Config(format!(
            "unknown persistence backend {other:?} (expected json, sqlite or memory)"
        ))),
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// One JSON file per save. Writes go to a sibling temp file first and are
/// renamed into place, so a crash mid-write leaves the old save intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the save file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PetStore for JsonFileStore {
    fn load(&self) -> Result<Option<PetRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file = decode(&bytes)?;
        debug!(
            path = %self.path.display(),
            pet = %file.pet.id,
            saved_at = %file.saved_at,
            "Loaded save file"
        );
        Ok(Some(file.pet))
    }

    fn save(&self, record: &PetRecord) -> Result<()> {
        let bytes = encode(record)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), pet = %record.id, bytes = bytes.len(), "Pet saved");
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Save file deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn backend(&self) -> &'static str {
        "json"
    }
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS pet_saves (
    slot       TEXT PRIMARY KEY,
    data       BLOB NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

/// SQLite-backed store. Each save slot is one row, so several sessions can
/// share a database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    slot: String,
    checksum_enabled: bool,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a database at `path`, using `config.slot`.
    ///
    /// # Errors
    ///
    /// Returns [`TamagoError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            slot = %config.slot,
            wal = config.wal_mode,
            "SQLite pet store opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            slot: config.slot.clone(),
            checksum_enabled: config.checksum_enabled,
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`TamagoError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            slot: config.slot.clone(),
            checksum_enabled: config.checksum_enabled,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Save slot this store reads and writes.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl PetStore for SqliteStore {
    fn load(&self) -> Result<Option<PetRecord>> {
        let start = Instant::now();
        let conn = self.conn.lock();
        let row: Option<(Vec<u8>, Option<String>)> = conn
            .prepare_cached("SELECT data, checksum FROM pet_saves WHERE slot = ?1")?
            .query_row(params![self.slot], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        drop(conn);

        let Some((data, stored_checksum)) = row else {
            return Ok(None);
        };

        if self.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(&data);
                if expected != actual {
                    warn!(
                        slot = %self.slot,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, save may be corrupt"
                    );
                }
            }
        }

        let file = decode(&data)?;
        debug!(
            slot = %self.slot,
            pet = %file.pet.id,
            elapsed_us = start.elapsed().as_micros(),
            "Loaded pet save"
        );
        Ok(Some(file.pet))
    }

    fn save(&self, record: &PetRecord) -> Result<()> {
        let json = encode(record)?;
        let checksum = self.checksum_enabled.then(|| crc32_hex(&json));
        let now = Utc::now().to_rfc3339();

        self.conn.lock().execute(
            "INSERT INTO pet_saves (slot, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(slot) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![self.slot, json, now, checksum],
        )?;

        info!(slot = %self.slot, pet = %record.id, bytes = json.len(), "Pet saved");
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        let deleted = self
            .conn
            .lock()
            .execute("DELETE FROM pet_saves WHERE slot = ?1", params![self.slot])?;
        if deleted > 0 {
            info!(slot = %self.slot, "Pet save deleted");
        }
        Ok(deleted > 0)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

/// CRC-32 (ISO 3309) of `data` as lowercase hex.
fn crc32_hex(data: &[u8]) -> String {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ POLY } else { crc >> 1 };
        }
    }
    format!("{:08x}", !crc)
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Holds the encoded save in memory. Goes through the same encode/decode
/// path as the durable stores.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with raw bytes, e.g. a corrupt save.
    #[must_use]
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes)),
        }
    }

    /// `true` if a save is present.
    #[must_use]
    pub fn has_save(&self) -> bool {
        self.bytes.lock().is_some()
    }
}

impl PetStore for MemoryStore {
    fn load(&self) -> Result<Option<PetRecord>> {
        self.bytes
            .lock()
            .as_deref()
            .map(|bytes| decode(bytes).map(|file| file.pet))
            .transpose()
    }

    fn save(&self, record: &PetRecord) -> Result<()> {
        *self.bytes.lock() = Some(encode(record)?);
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        Ok(self.bytes.lock().take().is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meters::Meter;
    use crate::species::SpeciesKind;
    use crate::types::Profile;

    fn test_config() -> PersistenceConfig {
        PersistenceConfig {
            checksum_enabled: true,
            wal_mode: false,
            ..PersistenceConfig::default()
        }
    }

    fn sample_record() -> PetRecord {
        let mut record = PetRecord::new(
            Profile::new("Whiskers", "grey", "tabby", vec!["bell".into(), "bow".into()]),
            SpeciesKind::Cat,
        );
        record.meters.set(Meter::Hunger, 33);
        record.meters.set(Meter::Training, 40);
        record.meters.set_weight(6.7);
        record.age = 12;
        record.sick = true;
        record
    }

    fn exercise_store(store: &dyn PetStore) {
        assert!(store.load().expect("load empty").is_none());
        assert!(!store.delete().expect("delete empty"));

        let record = sample_record();
        store.save(&record).expect("save");
        assert_eq!(store.load().expect("load").expect("Some"), record);

        let mut newer = record.clone();
        newer.age = 13;
        store.save(&newer).expect("overwrite");
        assert_eq!(store.load().expect("load").expect("Some").age, 13);

        assert!(store.delete().expect("delete"));
        assert!(store.load().expect("load after delete").is_none());
    }

    #[test]
    fn memory_store_contract() {
        exercise_store(&MemoryStore::new());
    }

    #[test]
    fn json_store_contract() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("nested").join("pet.json"));
        exercise_store(&store);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn sqlite_store_contract() {
        exercise_store(&SqliteStore::open_in_memory(&test_config()).expect("open"));
    }

    #[test]
    fn sqlite_slots_are_independent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pets.db");
        let a = SqliteStore::open(&path, &PersistenceConfig { slot: "a".into(), ..test_config() })
            .expect("open a");
        let b = SqliteStore::open(&path, &PersistenceConfig { slot: "b".into(), ..test_config() })
            .expect("open b");

        a.save(&sample_record()).expect("save a");
        assert!(b.load().expect("load b").is_none());
        assert!(a.load().expect("load a").is_some());
    }

    #[test]
    fn sqlite_checksum_mismatch_still_loads() {
        let store = SqliteStore::open_in_memory(&test_config()).expect("open");
        store.save(&sample_record()).expect("save");
        store
            .conn
            .lock()
            .execute("UPDATE pet_saves SET checksum = 'deadbeef'", [])
            .expect("corrupt checksum");
        assert!(store.load().expect("load").is_some());
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let store = MemoryStore::with_bytes(b"not json at all".to_vec());
        assert!(matches!(store.load(), Err(TamagoError::Serialization(_))));
    }

    #[test]
    fn future_versions_are_rejected() {
        let mut file: serde_json::Value =
            serde_json::from_slice(&encode(&sample_record()).expect("encode")).expect("json");
        file["version"] = serde_json::json!(99);
        let bytes = serde_json::to_vec(&file).expect("re-encode");
        let err = decode(&bytes).expect_err("version 99");
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn out_of_range_meters_are_rejected() {
        let mut file: serde_json::Value =
            serde_json::from_slice(&encode(&sample_record()).expect("encode")).expect("json");
        file["pet"]["meters"]["hunger"] = serde_json::json!(250);
        let bytes = serde_json::to_vec(&file).expect("re-encode");
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn open_store_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = test_config();
        config.path = dir.path().join("save.json");
        assert_eq!(open_store(&config).expect("json").backend(), "json");

        config.backend = "sqlite".into();
        config.path = dir.path().join("save.db");
        assert_eq!(open_store(&config).expect("sqlite").backend(), "sqlite");

        config.backend = "floppy".into();
        assert!(matches!(open_store(&config), Err(TamagoError::Config(_))));
    }

    #[test]
    fn crc32_basic() {
        // Known test vector: CRC-32 of "123456789" = 0xCBF43926
        assert_eq!(crc32_hex(b"123456789"), "cbf43926");
    }
}
