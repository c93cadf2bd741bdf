//! Transactional file store for library elements.
//!
//! Writes are buffered in an in-memory overlay until [`TransactionalFs::save`]
//! flushes them to disk; the overlay can be snapshotted and restored, which
//! is what makes reloading a package a reversible undo command.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EditorError, EditorResult};

/// A buffered file operation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FileOp {
    /// File content to be written on save.
    Write(Vec<u8>),
    /// File to be removed on save.
    Remove,
}

/// Snapshot of the pending (unsaved) operations of a [`TransactionalFs`].
#[derive(Debug, Clone, Default)]
pub struct FsSnapshot {
    overlay: BTreeMap<String, FileOp>,
}

/// A directory with transactional write semantics.
#[derive(Debug)]
pub struct TransactionalFs {
    root: PathBuf,
    overlay: BTreeMap<String, FileOp>,
}

impl TransactionalFs {
    /// Opens a directory as a transactional file store. The directory does
    /// not need to exist yet; it is created on the first save.
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overlay: BTreeMap::new(),
        }
    }

    /// The directory this store operates on.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether there are unsaved changes.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.overlay.is_empty()
    }

    /// Reads a file, preferring pending content over the on-disk state.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::FileRead`] if the file neither has pending
    /// content nor exists on disk.
    pub fn read(&self, name: &str) -> EditorResult<Vec<u8>> {
        match self.overlay.get(name) {
            Some(FileOp::Write(content)) => Ok(content.clone()),
            Some(FileOp::Remove) => Err(EditorError::file_read(
                self.root.join(name),
                std::io::Error::new(std::io::ErrorKind::NotFound, "file is marked for removal"),
            )),
            None => {
                let path = self.root.join(name);
                fs::read(&path).map_err(|source| EditorError::file_read(path, source))
            }
        }
    }

    /// Buffers new file content; nothing touches the disk until
    /// [`Self::save`].
    pub fn write(&mut self, name: &str, content: impl Into<Vec<u8>>) {
        self.overlay
            .insert(name.to_string(), FileOp::Write(content.into()));
    }

    /// Buffers a file removal.
    pub fn remove(&mut self, name: &str) {
        self.overlay.insert(name.to_string(), FileOp::Remove);
    }

    /// Drops all pending operations.
    pub fn discard_changes(&mut self) {
        if !self.overlay.is_empty() {
            debug!(
                root = %self.root.display(),
                pending = self.overlay.len(),
                "discarding pending file operations"
            );
        }
        self.overlay.clear();
    }

    /// Captures the pending operations.
    #[must_use]
    pub fn save_state(&self) -> FsSnapshot {
        FsSnapshot {
            overlay: self.overlay.clone(),
        }
    }

    /// Restores previously captured pending operations.
    pub fn restore_state(&mut self, snapshot: &FsSnapshot) {
        self.overlay = snapshot.overlay.clone();
    }

    /// Flushes all pending operations to disk and clears the overlay.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::FileWrite`] if any operation fails; already
    /// flushed operations are not rolled back.
    pub fn save(&mut self) -> EditorResult<()> {
        fs::create_dir_all(&self.root)
            .map_err(|source| EditorError::file_write(self.root.clone(), source))?;
        for (name, op) in &self.overlay {
            let path = self.root.join(name);
            match op {
                FileOp::Write(content) => {
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)
                            .map_err(|source| EditorError::file_write(parent.to_path_buf(), source))?;
                    }
                    fs::write(&path, content)
                        .map_err(|source| EditorError::file_write(path.clone(), source))?;
                }
                FileOp::Remove => match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(source) if source.kind() == std::io::ErrorKind::NotFound => {}
                    Err(source) => return Err(EditorError::file_write(path.clone(), source)),
                },
            }
        }
        debug!(root = %self.root.display(), files = self.overlay.len(), "saved file store");
        self.overlay.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_writes_shadow_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.lp"), b"disk").unwrap();
        let mut fs = TransactionalFs::open(dir.path());
        assert_eq!(fs.read("a.lp").unwrap(), b"disk");
        fs.write("a.lp", b"pending".to_vec());
        assert_eq!(fs.read("a.lp").unwrap(), b"pending");
        assert_eq!(std::fs::read(dir.path().join("a.lp")).unwrap(), b"disk");
    }

    #[test]
    fn save_flushes_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = TransactionalFs::open(dir.path());
        fs.write("pkg/package.lp", b"content".to_vec());
        assert!(fs.has_pending_changes());
        fs.save().unwrap();
        assert!(!fs.has_pending_changes());
        assert_eq!(
            std::fs::read(dir.path().join("pkg/package.lp")).unwrap(),
            b"content"
        );
    }

    #[test]
    fn snapshot_restores_pending_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = TransactionalFs::open(dir.path());
        fs.write("a.lp", b"one".to_vec());
        let snapshot = fs.save_state();
        fs.discard_changes();
        assert!(fs.read("a.lp").is_err());
        fs.restore_state(&snapshot);
        assert_eq!(fs.read("a.lp").unwrap(), b"one");
    }

    #[test]
    fn removal_is_buffered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.lp"), b"disk").unwrap();
        let mut fs = TransactionalFs::open(dir.path());
        fs.remove("a.lp");
        assert!(fs.read("a.lp").is_err());
        assert!(dir.path().join("a.lp").exists());
        fs.save().unwrap();
        assert!(!dir.path().join("a.lp").exists());
    }
}
