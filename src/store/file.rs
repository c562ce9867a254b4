//! Directory-backed lock store.
//!
//! Each key is one file, `<encoded-key>.lock`, holding JSON
//! [`LockMetadata`]. Keys are percent-encoded so arbitrary characters
//! (`:`, `/`, quotes, brackets) are safe in file names. A key whose encoded
//! name would exceed the file system's name limit is stored under
//! `=sha256-<digest>.lock` instead, and its key is read back from the
//! metadata.
//!
//! Lock files are created with **create_new** semantics, so exactly one
//! process wins a race for the same key as long as every process points at
//! the same directory. Expired files are removed while holding an exclusive
//! advisory lock on `.reap.guard`, so two callers can never both clear the
//! same expired lock and then both create a new one.

use super::LockStore;
use super::metadata::LockMetadata;
use crate::error::{QueueLockError, Result};
use chrono::Utc;
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const LOCK_EXTENSION: &str = "lock";

/// Guard file serializing removal of expired locks. Its extension keeps it
/// out of key listings.
const REAP_GUARD_FILE: &str = ".reap.guard";

/// Prefix of hashed file names. `=` is always escaped by `encode_key`, so a
/// hashed name never collides with an encoded one.
const HASHED_NAME_PREFIX: &str = "=sha256-";

/// Longest file name most file systems accept, in bytes.
const MAX_FILE_NAME_LEN: usize = 255;

/// A lock store that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// acquisition if it does not exist.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding lock files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the lock file for `key`.
    pub fn lock_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", file_stem_for(key), LOCK_EXTENSION))
    }

    /// Read the metadata stored for `key`, if the key exists.
    pub fn metadata(&self, key: &str) -> Result<Option<LockMetadata>> {
        let path = self.lock_path(key);
        if !path.exists() {
            return Ok(None);
        }
        LockMetadata::from_file(&path).map(Some)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                io_error(
                    format!("failed to create lock directory '{}'", self.dir.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Create the lock file exclusively and write fresh metadata into it.
    fn create_exclusive(&self, key: &str, path: &Path) -> Result<bool> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                return Err(io_error(
                    format!("failed to create lock file '{}'", path.display()),
                    e,
                ));
            }
        };

        let json = LockMetadata::new(key).to_json()?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| {
                // Clean up the lock file on write failure
                let _ = fs::remove_file(path);
                io_error(format!("failed to write lock file '{}'", path.display()), e)
            })?;

        Ok(true)
    }

    /// Whether the lock file at `path` is live. Expired files are removed.
    ///
    /// A file whose metadata cannot be read yet (its creator is still
    /// writing it) counts as live with no expiration.
    fn check_live(&self, path: &Path) -> Result<bool> {
        let metadata = match LockMetadata::from_file(path) {
            Ok(metadata) => metadata,
            Err(_) => return Ok(path.exists()),
        };

        if metadata.is_expired() {
            self.reap_expired(path)?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Remove the lock file at `path` if it is still expired once the reap
    /// guard is held.
    ///
    /// The metadata is re-read under the guard: another caller may already
    /// have removed the expired file and created a live one in its place.
    fn reap_expired(&self, path: &Path) -> Result<()> {
        let guard_path = self.dir.join(REAP_GUARD_FILE);
        let guard = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&guard_path)
            .map_err(|e| {
                io_error(
                    format!("failed to open reap guard '{}'", guard_path.display()),
                    e,
                )
            })?;
        guard.lock_exclusive().map_err(|e| {
            io_error(
                format!("failed to lock reap guard '{}'", guard_path.display()),
                e,
            )
        })?;

        let result = match LockMetadata::from_file(path) {
            Ok(metadata) if metadata.is_expired() => {
                debug!(key = %metadata.key, "removing expired lock file");
                remove_if_present(path)
            }
            _ => Ok(()),
        };

        let _ = FileExt::unlock(&guard);
        result
    }

    /// Key stored in the lock file at `path`, or `None` for anything that
    /// is not a lock file of this store.
    fn key_for_path(path: &Path) -> Option<String> {
        if path.extension().and_then(|e| e.to_str()) != Some(LOCK_EXTENSION) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if stem.starts_with(HASHED_NAME_PREFIX) {
            // Unreadable while its creator is still writing it
            LockMetadata::from_file(path).ok().map(|m| m.key)
        } else {
            decode_key(stem)
        }
    }
}

impl LockStore for FileStore {
    fn set_if_absent(&self, key: &str) -> Result<bool> {
        self.ensure_dir()?;
        let path = self.lock_path(key);

        if self.create_exclusive(key, &path)? {
            return Ok(true);
        }

        // The existing file may be an expired lock nobody released.
        if self.check_live(&path)? {
            return Ok(false);
        }
        self.create_exclusive(key, &path)
    }

    fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()> {
        let path = self.lock_path(key);

        let mut metadata = match LockMetadata::from_file(&path) {
            Ok(metadata) => metadata,
            Err(_) if !path.exists() => return Ok(()),
            Err(_) => LockMetadata::new(key),
        };
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| QueueLockError::Store(format!("invalid expiration: {}", e)))?;
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            QueueLockError::Store(format!("expiration out of range for '{}'", key))
        })?;
        metadata.expires_at = Some(expires_at);

        rewrite_existing(&path, metadata.to_json()?.as_bytes())
    }

    fn delete(&self, key: &str) -> Result<()> {
        remove_if_present(&self.lock_path(key))
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        if !self.dir.exists() {
            return Ok(keys);
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| {
            io_error(
                format!("failed to read lock directory '{}'", self.dir.display()),
                e,
            )
        })?;

        for entry in entries {
            let entry = entry
                .map_err(|e| io_error("failed to read lock directory entry".to_string(), e))?;
            let path = entry.path();

            let Some(key) = Self::key_for_path(&path) else {
                continue;
            };

            if key.starts_with(prefix) && self.check_live(&path)? {
                keys.push(key);
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        let path = self.lock_path(key);
        if !path.exists() {
            return Ok(false);
        }
        self.check_live(&path)
    }
}

/// Map an I/O error to a store error, classifying connection-like failures
/// (e.g. a network mount dropping) as transient.
fn io_error(context: String, e: std::io::Error) -> QueueLockError {
    match e.kind() {
        ErrorKind::Interrupted
        | ErrorKind::TimedOut
        | ErrorKind::WouldBlock
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::ConnectionRefused
        | ErrorKind::NotConnected
        | ErrorKind::BrokenPipe => QueueLockError::Connection(format!("{}: {}", context, e)),
        _ => QueueLockError::Store(format!("{}: {}", context, e)),
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(
            format!("failed to remove lock file '{}'", path.display()),
            e,
        )),
    }
}

/// Overwrite the contents of an existing lock file in place.
///
/// Never creates the file: if the lock was released in the meantime there
/// is nothing to update.
fn rewrite_existing(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).truncate(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(io_error(
                format!("failed to open lock file '{}'", path.display()),
                e,
            ));
        }
    };

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| io_error(format!("failed to write lock file '{}'", path.display()), e))
}

/// File name stem for `key`: the encoded key, or a digest of the key when
/// the encoded form is too long for a file name.
fn file_stem_for(key: &str) -> String {
    let encoded = encode_key(key);
    if encoded.len() + LOCK_EXTENSION.len() + 1 <= MAX_FILE_NAME_LEN {
        return encoded;
    }
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{}{}", HASHED_NAME_PREFIX, hex::encode(hasher.finalize()))
}

/// Percent-encode every byte outside `[A-Za-z0-9_-]`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
