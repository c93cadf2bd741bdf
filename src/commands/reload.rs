//! Reloading a package from disk as a reversible edit.

use tracing::debug;

use crate::error::EditorResult;
use crate::library::fs::{FsSnapshot, TransactionalFs};
use crate::library::Package;
use crate::undo::{CommandMeta, UndoCommand};
use crate::Shared;

/// Replaces the live package's content with the on-disk state.
///
/// The pre-reload content and the pending file operations are captured so an
/// undo restores both; the reloaded document is validated before anything is
/// touched.
pub struct CmdPackageReload {
    meta: CommandMeta,
    package: Shared<Package>,
    fs: Shared<TransactionalFs>,
    old_files: FsSnapshot,
    new_files: FsSnapshot,
    old_package: Package,
    new_package: Option<Package>,
}

impl CmdPackageReload {
    /// Captures the current state of `package` and its file store.
    #[must_use]
    pub fn new(package: Shared<Package>, fs: Shared<TransactionalFs>) -> Self {
        let old_files = fs.borrow().save_state();
        let old_package = package.borrow().clone();
        Self {
            meta: CommandMeta::new("Reload package"),
            package,
            fs,
            old_files,
            new_files: FsSnapshot::default(),
            old_package,
            new_package: None,
        }
    }
}

impl UndoCommand for CmdPackageReload {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        // Load the on-disk state through a fresh store (no overlay) so the
        // document is validated before the live package is touched.
        let disk = TransactionalFs::open(self.fs.borrow().root());
        let reloaded = Package::open(&disk)?;
        debug!(uuid = %reloaded.uuid(), "reloading package from disk");

        // Any pending in-memory file operations are dropped by the reload.
        self.fs.borrow_mut().discard_changes();
        self.new_files = self.fs.borrow().save_state();

        self.package.borrow_mut().assign(&reloaded);
        let changed = *self.package.borrow() != self.old_package;
        self.new_package = Some(reloaded);
        Ok(changed)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        self.fs.borrow_mut().restore_state(&self.old_files);
        self.package.borrow_mut().assign(&self.old_package);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        self.fs.borrow_mut().restore_state(&self.new_files);
        if let Some(new_package) = &self.new_package {
            self.package.borrow_mut().assign(new_package);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;
    use crate::types::Version;
    use uuid::Uuid;

    fn saved_package(dir: &std::path::Path) -> (Shared<Package>, Shared<TransactionalFs>) {
        let package = Package::new(Uuid::new_v4(), "DIP8".to_string(), Version::parse("0.1").unwrap());
        let mut fs = TransactionalFs::open(dir);
        package.write_to(&mut fs);
        fs.save().unwrap();
        (shared(package), shared(fs))
    }

    #[test]
    fn reload_restores_disk_state_and_is_reversible() {
        let dir = tempfile::tempdir().unwrap();
        let (package, fs) = saved_package(dir.path());

        // Rename in memory only, then reload from disk.
        package.borrow_mut().set_name("SOIC8".to_string());
        let mut cmd = CmdPackageReload::new(Shared::clone(&package), Shared::clone(&fs));
        assert!(cmd.execute().unwrap());
        assert_eq!(package.borrow().name(), "DIP8");

        cmd.undo().unwrap();
        assert_eq!(package.borrow().name(), "SOIC8");
        cmd.redo().unwrap();
        assert_eq!(package.borrow().name(), "DIP8");
        cmd.undo().unwrap();
    }

    #[test]
    fn reload_discards_pending_file_operations_and_undo_restores_them() {
        let dir = tempfile::tempdir().unwrap();
        let (package, fs) = saved_package(dir.path());

        fs.borrow_mut().write("note.txt", b"pending".to_vec());
        let mut cmd = CmdPackageReload::new(Shared::clone(&package), Shared::clone(&fs));
        cmd.execute().unwrap();
        assert!(!fs.borrow().has_pending_changes());
        cmd.undo().unwrap();
        assert!(fs.borrow().has_pending_changes());
        assert_eq!(fs.borrow().read("note.txt").unwrap(), b"pending");
    }

    #[test]
    fn reload_of_a_missing_document_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let package = shared(Package::new(
            Uuid::new_v4(),
            "X".to_string(),
            Version::parse("0.1").unwrap(),
        ));
        let fs = shared(TransactionalFs::open(dir.path()));
        let name_before = package.borrow().name().to_string();
        let mut cmd = CmdPackageReload::new(Shared::clone(&package), fs);
        assert!(cmd.execute().is_err());
        assert_eq!(package.borrow().name(), name_before);
    }
}
