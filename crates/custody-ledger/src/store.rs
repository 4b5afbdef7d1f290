use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::entry::Entry;
use crate::error::LedgerError;

/// Store file framing: magic, format version, then CRC32 of the body.
///
/// On-disk format:
/// ```text
/// [4 bytes: magic "CCL\x01"]
/// [4 bytes: CRC32 of body (little-endian u32)]
/// [N bytes: body (bincode-serialized Vec<Entry>)]
/// ```
const MAGIC: &[u8; 4] = b"CCL\x01";
const HEADER_SIZE: usize = 8;

/// Persisted chain store with atomic replacement.
///
/// The whole chain is rewritten on every save: the bytes go to a named
/// temp file in the same directory, are fsynced, and are then renamed
/// over the store path. A crash mid-save never leaves a half-written
/// chain behind. An advisory lock file guards the save critical section
/// against a second writer process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// A store at the given path. Nothing is touched until load/save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if a persisted chain exists at the store path.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the persisted chain verbatim (trust-on-load; integrity is
    /// checked on demand by the verifier).
    pub fn load(&self) -> Result<Vec<Entry>, LedgerError> {
        let data = fs::read(&self.path).map_err(|e| LedgerError::StorageCorrupt {
            reason: format!("cannot read {}: {e}", self.path.display()),
        })?;

        if data.len() < HEADER_SIZE {
            return Err(LedgerError::StorageCorrupt {
                reason: "store file is truncated".into(),
            });
        }
        if &data[..4] != MAGIC {
            return Err(LedgerError::StorageCorrupt {
                reason: "bad magic; not a custody chain store".into(),
            });
        }

        let stored_crc = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        let body = &data[HEADER_SIZE..];
        let actual_crc = crc32fast::hash(body);
        if stored_crc != actual_crc {
            warn!(
                stored = stored_crc,
                actual = actual_crc,
                "store checksum mismatch"
            );
            return Err(LedgerError::StorageCorrupt {
                reason: format!("checksum mismatch: stored {stored_crc:08x}, actual {actual_crc:08x}"),
            });
        }

        let entries: Vec<Entry> =
            bincode::deserialize(body).map_err(|e| LedgerError::StorageCorrupt {
                reason: format!("undecodable entry sequence: {e}"),
            })?;

        debug!(entries = entries.len(), "loaded chain from store");
        Ok(entries)
    }

    /// Persist the whole chain atomically.
    pub fn save(&self, entries: &[Entry]) -> Result<(), LedgerError> {
        let _lock = StoreLock::acquire(&self.path)?;

        let body = bincode::serialize(entries)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let crc = crc32fast::hash(&body);

        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new_in("."),
        }
        .map_err(|e| LedgerError::StorageWrite {
            reason: format!("cannot create temp file: {e}"),
        })?;

        let write = |tmp: &mut NamedTempFile| -> std::io::Result<()> {
            tmp.write_all(MAGIC)?;
            tmp.write_all(&crc.to_le_bytes())?;
            tmp.write_all(&body)?;
            tmp.flush()?;
            tmp.as_file().sync_all()
        };
        write(&mut tmp).map_err(|e| LedgerError::StorageWrite {
            reason: format!("cannot write chain: {e}"),
        })?;

        tmp.persist(&self.path)
            .map_err(|e| LedgerError::StorageWrite {
                reason: format!("cannot replace {}: {e}", self.path.display()),
            })?;

        debug!(
            entries = entries.len(),
            bytes = body.len() + HEADER_SIZE,
            "persisted chain"
        );
        Ok(())
    }
}

/// Advisory single-writer lock, held for the save critical section.
struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    fn acquire(store_path: &Path) -> Result<Self, LedgerError> {
        let mut path = store_path.as_os_str().to_owned();
        path.push(".lock");
        let path = PathBuf::from(path);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(LedgerError::StorageWrite {
                    reason: format!(
                        "another process holds the store lock ({})",
                        path.display()
                    ),
                })
            }
            Err(e) => Err(LedgerError::StorageWrite {
                reason: format!("cannot acquire store lock: {e}"),
            }),
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release store lock");
        }
    }
}
