//! File-backed response cache with time-based expiry.
//!
//! Every key maps to one JSON file directly under the storage root. Entries
//! are never edited in place: a write goes to a temp file in the same
//! directory and is renamed over the destination, so a concurrent reader
//! sees either the previous entry or the new one in full. Staleness is
//! evaluated lazily on read; nothing sweeps old files.

use chrono::{DateTime, Duration, Utc};
use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{error::CacheError, model::Conditions};

pub const DEFAULT_TTL_MINUTES: i64 = 15;

pub fn default_ttl() -> Duration {
    Duration::minutes(DEFAULT_TTL_MINUTES)
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Conditions),
    /// No entry, or it could not be read.
    Miss,
    /// The entry decoded fine but is older than the TTL.
    Stale,
    /// The entry exists but does not decode as a record.
    Corrupt,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub fn conditions(&self) -> Option<&Conditions> {
        match self {
            CacheLookup::Hit(cond) => Some(cond),
            _ => None,
        }
    }

    pub fn into_conditions(self) -> Option<Conditions> {
        match self {
            CacheLookup::Hit(cond) => Some(cond),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CacheLookup::Hit(_) => "hit",
            CacheLookup::Miss => "miss",
            CacheLookup::Stale => "stale",
            CacheLookup::Corrupt => "corrupt",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { root: root.into(), ttl }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the file backing `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(file_name_for_key(key))
    }

    /// Raw bytes stored under `key`. Absent and unreadable entries both yield `None`.
    pub fn retrieve(&self, key: &str) -> Option<Vec<u8>> {
        if key.is_empty() {
            return None;
        }

        let path = self.entry_path(key);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "cache entry unreadable, treating as miss");
                None
            }
        }
    }

    /// Decode stored bytes and check them against the TTL at `now`.
    pub fn parse(&self, bytes: &[u8], now: DateTime<Utc>) -> CacheLookup {
        let cond: Conditions = match serde_json::from_slice(bytes) {
            Ok(cond) => cond,
            Err(err) => {
                debug!(error = %err, "cache entry does not decode");
                return CacheLookup::Corrupt;
            }
        };

        if now.signed_duration_since(cond.cache_time) > self.ttl {
            return CacheLookup::Stale;
        }

        CacheLookup::Hit(cond)
    }

    pub fn lookup(&self, key: &str, now: DateTime<Utc>) -> CacheLookup {
        let lookup = match self.retrieve(key) {
            Some(bytes) => self.parse(&bytes, now),
            None => CacheLookup::Miss,
        };

        debug!(key, outcome = lookup.label(), "cache lookup");
        lookup
    }

    /// Replace whatever is stored under `key` with `bytes`.
    pub fn store(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        fs::create_dir_all(&self.root).map_err(|source| CacheError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(|source| CacheError::Io {
            path: self.root.clone(),
            source,
        })?;
        tmp.write_all(bytes).map_err(|source| CacheError::Io {
            path: tmp.path().to_path_buf(),
            source,
        })?;
        tmp.as_file().sync_all().map_err(|source| CacheError::Io {
            path: tmp.path().to_path_buf(),
            source,
        })?;

        tmp.persist(self.entry_path(key))?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(CacheError::NotFound {
                key: key.to_string(),
            }),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }
}

/// Flat, injective file name for a key. Bytes outside `[A-Za-z0-9-_.,]` are
/// written as `~xx`, so path separators never reach the filesystem. The
/// `.json` suffix keeps `.` and `..` from naming directories.
fn file_name_for_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 5);
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b',' => {
                name.push(byte as char)
            }
            _ => {
                let _ = write!(name, "~{byte:02x}");
            }
        }
    }
    name.push_str(".json");
    name
}
