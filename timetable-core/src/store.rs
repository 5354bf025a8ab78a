//! Storage for generated notes.

use std::path::{Component, Path, PathBuf};

use crate::error::{TimetableError, TimetableResult};

/// Where notes live. Paths are vault-relative and `/`-separated.
pub trait NoteStore {
    fn exists(&self, path: &str) -> bool;

    fn delete(&mut self, path: &str) -> TimetableResult<()>;

    /// Write a new note, creating missing folders.
    fn create(&mut self, path: &str, contents: &str) -> TimetableResult<()>;
}

/// Notes stored as plain files under a vault directory.
#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        VaultStore { root: root.into() }
    }

    fn full_path(&self, path: &str) -> TimetableResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(TimetableError::Config(format!(
                "Note path '{path}' must stay inside the vault"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl NoteStore for VaultStore {
    fn exists(&self, path: &str) -> bool {
        self.full_path(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn delete(&mut self, path: &str) -> TimetableResult<()> {
        let full = self.full_path(path)?;
        std::fs::remove_file(&full)?;
        tracing::debug!(path = %full.display(), "deleted note");
        Ok(())
    }

    fn create(&mut self, path: &str, contents: &str) -> TimetableResult<()> {
        let full = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, contents)?;
        tracing::debug!(path = %full.display(), "created note");
        Ok(())
    }
}
