//! Whole-file JSON container store.

use federal_error::{StorageError, StorageErrorKind, StorageResult};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Schema version written into every record file.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, C> {
    version: u32,
    records: &'a C,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk<C> {
    Versioned { version: u32, records: C },
    Legacy(C),
}

/// A single durable container of records.
///
/// `C` is the semantic container: `Vec<T>` for ordered collections or a map
/// for keyed records. Single-process access only; concurrent writers in other
/// processes are not supported.
pub struct JsonStore<C> {
    path: PathBuf,
    lock: Mutex<()>,
    _container: PhantomData<fn() -> C>,
}

impl<C> JsonStore<C>
where
    C: Serialize + DeserializeOwned + Default,
{
    /// Create a store backed by `path`. The file is created lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _container: PhantomData,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the container, falling back to an empty one.
    ///
    /// A missing file is created empty. A corrupt file is moved aside to
    /// `<name>.corrupt` and replaced by an empty container. An unreadable file
    /// is left untouched and reads as empty.
    pub fn load(&self) -> C {
        let _guard = self.lock.lock();
        self.load_unlocked().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Reading records as empty");
            C::default()
        })
    }

    /// Persist the container, replacing the file contents.
    pub fn save(&self, container: &C) -> StorageResult<()> {
        let _guard = self.lock.lock();
        self.save_unlocked(container)
    }

    /// Load, mutate and save under the store lock.
    ///
    /// Fails without writing when the file exists but cannot be read.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut C) -> R) -> StorageResult<R> {
        let _guard = self.lock.lock();
        let mut container = self.load_unlocked()?;
        let result = mutate(&mut container);
        self.save_unlocked(&container)?;
        Ok(result)
    }

    /// Like [`update`](Self::update), but only saves when `mutate` returns `Some`.
    pub fn modify<R>(&self, mutate: impl FnOnce(&mut C) -> Option<R>) -> StorageResult<Option<R>> {
        let _guard = self.lock.lock();
        let mut container = self.load_unlocked()?;
        match mutate(&mut container) {
            Some(result) => {
                self.save_unlocked(&container)?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    /// Like [`update`](Self::update), but nothing is written when `mutate` fails.
    pub fn try_update<R, E>(&self, mutate: impl FnOnce(&mut C) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let _guard = self.lock.lock();
        let mut container = self.load_unlocked()?;
        let result = mutate(&mut container)?;
        self.save_unlocked(&container)?;
        Ok(result)
    }

    fn load_unlocked(&self) -> StorageResult<C> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Record file absent, initialising");
                return Ok(self.reinitialise());
            }
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                ))));
            }
        };

        let records = match serde_json::from_slice::<OnDisk<C>>(&content) {
            Ok(OnDisk::Versioned { version, records }) => {
                if version > SCHEMA_VERSION {
                    tracing::warn!(
                        path = %self.path.display(),
                        version,
                        supported = SCHEMA_VERSION,
                        "Record file written by a newer schema"
                    );
                }
                records
            }
            Ok(OnDisk::Legacy(records)) => {
                tracing::debug!(path = %self.path.display(), "Loaded legacy record file");
                records
            }
            Err(e) => {
                let err = StorageError::new(StorageErrorKind::Corrupt(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )));
                tracing::error!(error = %err, "Record file corrupt, resetting");
                self.quarantine();
                self.reinitialise()
            }
        };
        Ok(records)
    }

    fn reinitialise(&self) -> C {
        let empty = C::default();
        if let Err(e) = self.save_unlocked(&empty) {
            tracing::error!(error = %e, "Failed to initialise record file");
        }
        empty
    }

    fn quarantine(&self) {
        let mut aside = self.path.clone().into_os_string();
        aside.push(".corrupt");
        if let Err(e) = std::fs::rename(&self.path, &aside) {
            tracing::warn!(path = %self.path.display(), error = %e, "Could not move corrupt file aside");
        }
    }

    fn save_unlocked(&self, container: &C) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let body = serde_json::to_string_pretty(&Envelope {
            version: SCHEMA_VERSION,
            records: container,
        })
        .map_err(|e| StorageError::new(StorageErrorKind::Serialize(e.to_string())))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, body).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %self.path.display(), "Saved record file");
        Ok(())
    }
}

impl<C> std::fmt::Debug for JsonStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore").field("path", &self.path).finish()
    }
}
