//! Flat-to-artist migration of the song database.
//!
//! Run order is fixed: load, guard check, classify, group and sort,
//! backup write, final write, report. Nothing touches storage until every
//! song has been classified, and the document is never overwritten unless
//! the backup write succeeded first.

use crate::config::MigratorConfig;
use crate::error::{MigrateError, Result};
use crate::membership::{ArtistName, MembershipSet};
use crate::models::{Artist, ArtistCount, MigrationReport, Song, SongDatabase, TITLE_KEY};
use crate::progress::{create_progress_bar, create_spinner, log_phase};
use crate::safety::validate_backup_path;
use indicatif::ProgressBar;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Song borrowed from the loaded document, paired with its title
pub type TitledSong<'a> = (&'a str, &'a Value);

/// Songs bucketed by `ArtistName::rank`, in encounter order
pub type Classified<'a> = [Vec<TitledSong<'a>>; 2];

/// Document as read from storage: exact bytes plus parsed form.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub bytes: Vec<u8>,
    pub database: SongDatabase,
}

// ============================================================================
// Pure Steps
// ============================================================================

/// Assign every song to an artist. Fails on the first song lacking a string
/// `OfficialTitle`.
pub fn classify_songs<'a>(songs: &'a [Value], membership: &MembershipSet) -> Result<Classified<'a>> {
    let pb = create_progress_bar(songs.len() as u64, "Classifying songs");
    classify_with_progress(songs, membership, &pb)
}

/// Classification loop behind `classify_songs`. `pb` is cleared on return,
/// error or not.
fn classify_with_progress<'a>(
    songs: &'a [Value],
    membership: &MembershipSet,
    pb: &ProgressBar,
) -> Result<Classified<'a>> {
    let mut groups: Classified<'a> = [Vec::new(), Vec::new()];

    for (index, song) in songs.iter().enumerate() {
        let Some(title) = song.get(TITLE_KEY).and_then(Value::as_str) else {
            pb.finish_and_clear();
            return Err(MigrateError::MissingTitle { index });
        };
        groups[membership.classify(title).rank()].push((title, song));
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(groups)
}

/// Sort each group by title and emit non-empty groups in `ArtistName::ALL`
/// order. Sorting is stable, so duplicate titles keep encounter order.
pub fn assemble_artists(groups: Classified<'_>) -> Vec<Artist> {
    ArtistName::ALL
        .iter()
        .zip(groups)
        .filter(|(_, songs)| !songs.is_empty())
        .map(|(artist, mut songs)| {
            songs.sort_by(|a, b| a.0.cmp(b.0));
            Artist {
                name: artist.as_str().to_string(),
                songs: songs.into_iter().map(|(_, s)| Song(s.clone())).collect(),
            }
        })
        .collect()
}

/// Classify, group, sort and assemble in one step.
pub fn group_by_artist(songs: &[Value], membership: &MembershipSet) -> Result<Vec<Artist>> {
    Ok(assemble_artists(classify_songs(songs, membership)?))
}

// ============================================================================
// Migrator
// ============================================================================

/// One-shot migrator for a single song database document.
#[derive(Debug, Clone)]
pub struct Migrator {
    config: MigratorConfig,
}

impl Migrator {
    pub fn new(config: MigratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Read and parse the whole document.
    pub fn load(&self) -> Result<LoadedDocument> {
        let path = &self.config.document_path;
        let bytes = std::fs::read(path).map_err(|source| MigrateError::Read {
            path: path.clone(),
            source,
        })?;
        let database = SongDatabase::from_slice(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "loaded song database");
        Ok(LoadedDocument { bytes, database })
    }

    /// Write the backup, then replace the document. Returns the backup path.
    ///
    /// The backup holds `original` byte for byte. If the backup write fails
    /// the document is left alone.
    pub fn persist(&self, original: &[u8], migrated: &SongDatabase) -> Result<PathBuf> {
        let document = &self.config.document_path;
        let backup = self.config.backup_path();
        validate_backup_path(document, &backup, &self.config.backup_suffix)?;

        let contents = migrated.to_pretty_bytes()?;

        let pb = create_spinner("Writing backup");
        std::fs::write(&backup, original).map_err(|source| MigrateError::BackupWrite {
            path: backup.clone(),
            source,
        })?;
        pb.finish_and_clear();
        log_phase("backup", &backup.display().to_string());
        info!(path = %backup.display(), "backup written");

        let pb = create_spinner("Writing song database");
        replace_file(document, scratch_dir(document), &contents)?;
        pb.finish_and_clear();
        log_phase("write", &document.display().to_string());
        info!(path = %document.display(), bytes = contents.len(), "song database written");

        Ok(backup)
    }

    /// Run the whole migration.
    pub fn run(&self) -> Result<MigrationReport> {
        let start = Instant::now();
        let loaded = self.load()?;
        let database = &loaded.database;

        let mut report = MigrationReport {
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        if database.is_migrated()? {
            info!("database already migrated, nothing to do");
            report.already_migrated = true;
            report.total_songs = database.songs().map_or(0, <[Value]>::len);
            report.grouped_songs = database.grouped_song_count();
            report.elapsed_seconds = start.elapsed().as_secs_f64();
            return Ok(report);
        }

        let songs = database.songs()?;
        report.total_songs = songs.len();

        let artists = group_by_artist(songs, &self.config.membership)?;
        log_phase("classify", &format!("{} songs", songs.len()));
        report.artists = artists
            .iter()
            .map(|a| ArtistCount {
                name: a.name.clone(),
                songs: a.songs.len(),
            })
            .collect();
        report.grouped_songs = Some(report.artists.iter().map(|a| a.songs).sum());

        if self.config.dry_run {
            info!("dry run, skipping writes");
        } else {
            let migrated = database.with_artists(&artists)?;
            report.backup_path = Some(self.persist(&loaded.bytes, &migrated)?);
        }

        report.elapsed_seconds = start.elapsed().as_secs_f64();
        Ok(report)
    }
}

/// Directory holding `path`, where its scratch file is created so the final
/// rename stays on one filesystem.
fn scratch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Write `contents` to a uniquely named scratch file in `dir`, then rename it
/// over `path`. The scratch name never collides with the backup or any
/// existing file, and it is removed if the rename fails.
fn replace_file(path: &Path, dir: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source: std::io::Error| MigrateError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(contents).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
