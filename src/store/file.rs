//! File-based count store.
//!
//! Each owner's counters live in one checksummed snapshot file
//! (`<directory>/<owner>.counts`). The snapshot is read once on open; writes go
//! to the in-memory table and reach disk on [`CountStore::commit`].
//!
//! Several handles may be open for the same owner, in one process or many.
//! Each handle only writes back its own increments: `commit` takes an exclusive
//! lock on `<owner>.counts.lock`, re-reads the snapshot and adds the pending
//! increments to it before replacing the file.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DocclassError, Result};
use crate::store::snapshot::{self, Snapshot};
use crate::store::{CountStore, CountTable, FeatureCount};

/// File extension of snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "counts";

/// Configuration for [`FileCountStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStoreConfig {
    /// Directory holding one snapshot per owner.
    pub directory: PathBuf,
    /// Whether to fsync the snapshot before renaming it into place.
    #[serde(default)]
    pub sync_writes: bool,
}

impl FileStoreConfig {
    /// Configuration for `directory` with default options.
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        FileStoreConfig {
            directory: directory.into(),
            sync_writes: false,
        }
    }

    /// Set whether commits are synced to disk.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }
}

#[derive(Debug, Default)]
struct Tables {
    /// Last committed snapshot plus pending increments.
    view: CountTable,
    /// Increments not yet written to disk.
    pending: CountTable,
}

/// A count store persisted to a snapshot file.
#[derive(Debug)]
pub struct FileCountStore {
    /// Storage configuration.
    config: FileStoreConfig,
    /// Owner key.
    scope: String,
    /// Full path of the snapshot file.
    path: PathBuf,
    /// Full path of the commit lock file.
    lock_path: PathBuf,
    /// Current counters.
    tables: RwLock<Tables>,
    /// Whether the storage is closed.
    closed: AtomicBool,
}

impl FileCountStore {
    /// Open the store for `scope`, loading its snapshot if one exists.
    pub fn open(config: FileStoreConfig, scope: &str) -> Result<Self> {
        if scope.is_empty() {
            return Err(DocclassError::invalid_argument("store scope must not be empty"));
        }

        let directory = &config.directory;
        if !directory.exists() {
            fs::create_dir_all(directory)
                .map_err(|e| DocclassError::storage(format!("Failed to create directory: {e}")))?;
        }
        if !directory.is_dir() {
            return Err(DocclassError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        let path = directory.join(snapshot_file_name(scope));
        let lock_path = path.with_extension(format!("{SNAPSHOT_EXTENSION}.lock"));

        let table = match Self::read_snapshot(&path, scope)? {
            Some(snapshot) => {
                info!(
                    scope,
                    path = %path.display(),
                    saved_at = %snapshot.saved_at,
                    categories = snapshot.table.category_rows().len(),
                    features = snapshot.table.vocabulary_size(),
                    "loaded count snapshot"
                );
                snapshot.table
            }
            None => {
                debug!(scope, path = %path.display(), "no snapshot yet, starting empty");
                CountTable::new()
            }
        };

        Ok(FileCountStore {
            config,
            scope: scope.to_string(),
            path,
            lock_path,
            tables: RwLock::new(Tables {
                view: table,
                pending: CountTable::new(),
            }),
            closed: AtomicBool::new(false),
        })
    }

    fn read_snapshot(path: &Path, scope: &str) -> Result<Option<Snapshot>> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DocclassError::storage(format!(
                    "Failed to read snapshot {}: {e}",
                    path.display()
                )));
            }
        };

        let snapshot = snapshot::decode(&data)
            .map_err(|e| DocclassError::storage(format!("{}: {e}", path.display())))?;
        if snapshot.scope != scope {
            return Err(DocclassError::storage(format!(
                "snapshot {} belongs to '{}', not '{scope}'",
                path.display(),
                snapshot.scope
            )));
        }

        Ok(Some(snapshot))
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store configuration.
    pub fn config(&self) -> &FileStoreConfig {
        &self.config
    }

    /// Whether there are uncommitted changes.
    pub fn is_dirty(&self) -> bool {
        !self.tables.read().pending.is_empty()
    }

    /// Commit pending changes and close the store.
    pub fn close(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.commit()?;
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Check if the storage is closed.
    fn check_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(DocclassError::storage(format!(
                "file count store for '{}' is closed",
                self.scope
            )))
        } else {
            Ok(())
        }
    }

    fn open_lock_file(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| DocclassError::storage(format!("Failed to open lock file: {e}")))
    }

    fn write_snapshot(&self, bytes: &[u8]) -> Result<()> {
        let tmp_path = self.path.with_extension(format!("{SNAPSHOT_EXTENSION}.tmp"));

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| DocclassError::storage(format!("Failed to create snapshot: {e}")))?;
        file.write_all(bytes)
            .map_err(|e| DocclassError::storage(format!("Failed to write snapshot: {e}")))?;
        if self.config.sync_writes {
            file.sync_all()
                .map_err(|e| DocclassError::storage(format!("Failed to sync snapshot: {e}")))?;
        }
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .map_err(|e| DocclassError::storage(format!("Failed to replace snapshot: {e}")))?;

        if self.config.sync_writes {
            if let Some(parent) = self.path.parent() {
                // Directory fsync is not supported everywhere.
                if let Ok(dir) = File::open(parent) {
                    let _ = dir.sync_all();
                }
            }
        }

        Ok(())
    }
}

impl CountStore for FileCountStore {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn increment_feature_count(&self, feature: &str, category: &str) -> Result<()> {
        self.check_closed()?;
        let mut tables = self.tables.write();
        tables.view.add_feature(feature, category, 1.0);
        tables.pending.add_feature(feature, category, 1.0);
        Ok(())
    }

    fn increment_category_count(&self, category: &str) -> Result<()> {
        self.check_closed()?;
        let mut tables = self.tables.write();
        tables.view.add_category(category, 1.0);
        tables.pending.add_category(category, 1.0);
        Ok(())
    }

    fn get_feature_count(&self, feature: &str, category: &str) -> Result<f64> {
        self.check_closed()?;
        Ok(self.tables.read().view.feature_count(feature, category))
    }

    fn get_category_count(&self, category: &str) -> Result<f64> {
        self.check_closed()?;
        Ok(self.tables.read().view.category_count(category))
    }

    fn total_count(&self) -> Result<f64> {
        self.check_closed()?;
        Ok(self.tables.read().view.total())
    }

    fn categories(&self) -> Result<Vec<String>> {
        self.check_closed()?;
        Ok(self.tables.read().view.category_names())
    }

    fn feature_counts(&self) -> Result<Vec<FeatureCount>> {
        self.check_closed()?;
        Ok(self.tables.read().view.feature_rows())
    }

    fn commit(&self) -> Result<()> {
        self.check_closed()?;
        let mut tables = self.tables.write();
        if tables.pending.is_empty() {
            return Ok(());
        }

        let mut lock = fd_lock::RwLock::new(self.open_lock_file()?);
        let _guard = lock.write().map_err(|e| {
            DocclassError::storage(format!(
                "Failed to lock {}: {e}",
                self.lock_path.display()
            ))
        })?;

        // Other handles may have committed since this one loaded.
        let mut merged = Self::read_snapshot(&self.path, &self.scope)?
            .map(|snapshot| snapshot.table)
            .unwrap_or_default();
        merged.merge(&tables.pending);

        let bytes = snapshot::encode(&self.scope, &merged, Utc::now())?;
        self.write_snapshot(&bytes)?;

        info!(
            scope = %self.scope,
            path = %self.path.display(),
            size = bytes.len(),
            total = merged.total(),
            "committed count snapshot"
        );

        tables.view = merged;
        tables.pending = CountTable::new();
        Ok(())
    }
}

/// Snapshot file name for an owner.
///
/// ASCII letters, digits, `-` and `_` are kept; every other byte is written as
/// `%XX`, so distinct owners never share a file and no owner escapes the
/// directory.
pub fn snapshot_file_name(scope: &str) -> String {
    let mut name = String::with_capacity(scope.len() + SNAPSHOT_EXTENSION.len() + 1);
    for byte in scope.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name.push('.');
    name.push_str(SNAPSHOT_EXTENSION);
    name
}
