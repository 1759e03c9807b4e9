//! Safety checks run before the backup is written.
//!
//! The backup is the only way back from a bad migration, so it must never
//! land on top of the document it is meant to preserve.

use crate::error::{MigrateError, Result};
use std::path::Path;

/// Validates that a backup path is safe to write.
///
/// Checks:
/// - Backup filename must end with the configured suffix
/// - Backup cannot be the same path as the document
/// - Backup must live in the same directory as the document
pub fn validate_backup_path(document: &Path, backup: &Path, suffix: &str) -> Result<()> {
    if suffix.is_empty() {
        return Err(MigrateError::UnsafeBackupPath(
            "backup suffix must not be empty".to_string(),
        ));
    }

    let backup_name = backup.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if !backup_name.ends_with(suffix) {
        return Err(MigrateError::UnsafeBackupPath(format!(
            "backup file '{}' must end with '{}'",
            backup.display(),
            suffix
        )));
    }

    if backup == document {
        return Err(MigrateError::UnsafeBackupPath(format!(
            "backup '{}' cannot be the same as the document",
            backup.display()
        )));
    }

    if backup.parent() != document.parent() {
        return Err(MigrateError::UnsafeBackupPath(format!(
            "backup '{}' must be a sibling of '{}'",
            backup.display(),
            document.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_backup() {
        let document = PathBuf::from("/data/songs.json");
        let backup = PathBuf::from("/data/songs.json.backup");
        assert!(validate_backup_path(&document, &backup, ".backup").is_ok());
    }

    #[test]
    fn test_missing_suffix() {
        let document = PathBuf::from("/data/songs.json");
        let backup = PathBuf::from("/data/songs.old");
        let result = validate_backup_path(&document, &backup, ".backup");
        assert!(result.unwrap_err().to_string().contains("must end with '.backup'"));
    }

    #[test]
    fn test_backup_equals_document() {
        let path = PathBuf::from("/data/songs.json.backup");
        let result = validate_backup_path(&path, &path, ".backup");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as the document"));
    }

    #[test]
    fn test_empty_suffix_blocked() {
        let path = PathBuf::from("/data/songs.json");
        assert!(validate_backup_path(&path, &path, "").is_err());
    }

    #[test]
    fn test_suffix_with_separator_blocked() {
        let document = PathBuf::from("/data/songs.json");
        let backup = PathBuf::from("/data/songs.json/x.backup");
        let result = validate_backup_path(&document, &backup, "/x.backup");
        assert!(result.is_err());
    }
}
