use std::path::{Path, PathBuf};

use crate::error::{MutationError, Result};

pub fn backup_path(source_file: &Path) -> PathBuf {
    let mut backup = source_file.to_path_buf();
    let name = format!(
        ".{}.pymutest.bak",
        source_file.file_name().unwrap_or_default().to_string_lossy()
    );
    backup.set_file_name(name);
    backup
}

/// Write a sibling backup before a file's first trial so a run killed
/// mid-trial (SIGKILL, power loss) can be recovered next time.
pub fn write_backup(source_file: &Path, content: &str) -> Result<()> {
    std::fs::write(backup_path(source_file), content).map_err(|e| MutationError::Io {
        file: source_file.to_path_buf(),
        context: "failed to write backup for",
        source: e,
    })
}

pub fn remove_backup(source_file: &Path) {
    let _ = std::fs::remove_file(backup_path(source_file));
}

/// A leftover backup file means a previous run died with a mutant still
/// on disk.
pub fn check_interrupted_run(source_file: &Path) -> Option<PathBuf> {
    let bak = backup_path(source_file);
    if bak.exists() { Some(bak) } else { None }
}

/// Restore source from its backup and delete the backup.
pub fn restore_from_backup(source_file: &Path, backup_file: &Path) -> std::io::Result<()> {
    std::fs::copy(backup_file, source_file)?;
    std::fs::remove_file(backup_file)?;
    crate::runner::clear_pycache(source_file);
    Ok(())
}
