//! Per-folder guard so two syncs never rewrite the same notes at once.
//!
//! The lock file sits in the notes folder itself, next to `учёба/` and
//! `дорога/`, so syncs into different vaults or folders run independently.

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use fs2::FileExt;
use timetable_core::{TimetableError, TimetableResult};

const LOCK_FILE: &str = ".mtuci-sync.lock";

/// Exclusive hold on one notes folder, released when dropped.
#[derive(Debug)]
pub struct NotesLock {
    _file: File,
}

impl NotesLock {
    /// Lock `notes_dir`, creating the folder when it does not exist yet.
    pub fn acquire(notes_dir: &Path) -> TimetableResult<Self> {
        fs::create_dir_all(notes_dir)?;

        let path = notes_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        file.try_lock_exclusive()
            .map_err(|_| TimetableError::Locked(path.display().to_string()))?;

        tracing::debug!(lock = %path.display(), "locked notes folder");
        Ok(NotesLock { _file: file })
    }
}
