//! Error kinds raised while migrating a song database.
//!
//! Every variant aborts the run. Variants raised before the backup write
//! (`Read`, `Parse`, `Malformed`, `MissingTitle`, `UnsafeBackupPath`) leave
//! storage untouched.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    /// Document missing or unreadable
    #[error("failed to read song database '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not well-formed JSON
    #[error("song database '{}' is not valid JSON", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but not shaped like a song database
    #[error("malformed song database: {0}")]
    Malformed(String),

    /// A song without a string `OfficialTitle`
    #[error("song at index {index} has no string 'OfficialTitle' field")]
    MissingTitle { index: usize },

    #[error("unsafe backup path: {0}")]
    UnsafeBackupPath(String),

    #[error("failed to write backup '{}'", path.display())]
    BackupWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write song database '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize song database")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid membership list '{}': {reason}", path.display())]
    Membership { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_title_message_names_index() {
        let err = MigrateError::MissingTitle { index: 7 };
        assert_eq!(
            err.to_string(),
            "song at index 7 has no string 'OfficialTitle' field"
        );
    }

    #[test]
    fn test_read_error_keeps_source() {
        use std::error::Error as _;
        let err = MigrateError::Read {
            path: PathBuf::from("/data/songs.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/data/songs.json"));
        assert!(err.source().is_some());
    }
}
