//! On-disk files written while a response streams in
//!
//! A [`FileGuard`] deletes its file when dropped unless it was kept, so an
//! early return, an error or a cancelled future never leaves a partial file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Deletes `path`, treating "already gone" as success.
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[derive(Debug)]
pub struct FileGuard {
    path: PathBuf,
    armed: bool,
}

impl FileGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disarms the guard; the file outlives it
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }

    /// Removes the file now. Safe to call more than once.
    pub fn discard(&mut self) {
        if !self.armed {
            return;
        }
        match remove_if_exists(&self.path) {
            Ok(true) => tracing::debug!(path = %self.path.display(), "removed transient file"),
            Ok(false) => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "could not remove file"),
        }
        self.armed = false;
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        self.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rdat.dat");
        std::fs::write(&path, b"partial").unwrap();

        drop(FileGuard::new(&path));
        assert!(!path.exists());
    }

    #[test]
    fn keep_preserves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("received_pdf.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let kept = FileGuard::new(&path).keep();
        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[test]
    fn discard_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rdat.dat");
        std::fs::write(&path, b"x").unwrap();

        let mut guard = FileGuard::new(&path);
        guard.discard();
        guard.discard();
        assert!(!path.exists());
        assert!(!remove_if_exists(&path).unwrap());
    }

    #[test]
    fn missing_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let mut guard = FileGuard::new(dir.path().join("never-written"));
        guard.discard();
    }
}
