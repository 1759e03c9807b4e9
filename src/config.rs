//! Migrator configuration.

use crate::membership::MembershipSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the document path to form the backup path
pub const DEFAULT_BACKUP_SUFFIX: &str = ".backup";

/// Document location relative to the executable's directory
pub const DEFAULT_DOCUMENT_RELATIVE: &str = "Data/songs.json";

/// Configuration for a single migration run.
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Song database to migrate in place.
    pub document_path: PathBuf,

    /// Appended to `document_path` for the pre-migration copy.
    pub backup_suffix: String,

    /// Titles attributed to New Riders of the Purple Sage.
    pub membership: MembershipSet,

    /// Classify and report without writing anything.
    pub dry_run: bool,
}

impl MigratorConfig {
    /// Create a config for `document_path` with the built-in membership set.
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            membership: MembershipSet::builtin(),
            dry_run: false,
        }
    }

    /// Config for `Data/songs.json` next to the running executable.
    pub fn from_exe_dir() -> std::io::Result<Self> {
        Ok(Self::new(default_document_path()?))
    }

    /// `<document_path><backup_suffix>`, kept in the same directory.
    pub fn backup_path(&self) -> PathBuf {
        append_suffix(&self.document_path, &self.backup_suffix)
    }

    /// Set the membership set.
    pub fn with_membership(mut self, membership: MembershipSet) -> Self {
        self.membership = membership;
        self
    }

    /// Set the backup suffix.
    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

pub fn default_document_path() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join(DEFAULT_DOCUMENT_RELATIVE))
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
