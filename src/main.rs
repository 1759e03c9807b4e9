use anyhow::{Context, Result};
use clap::Parser;
use songdb_migrate::config::DEFAULT_BACKUP_SUFFIX;
use songdb_migrate::progress::{format_duration, set_log_only};
use songdb_migrate::{MembershipSet, MigrationReport, Migrator, MigratorConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Parser)]
#[command(name = "songdb-migrate")]
#[command(about = "Migrate songs.json from a flat song list to songs grouped by artist")]
struct Args {
    /// Song database to migrate (defaults to Data/songs.json next to the executable)
    document: Option<PathBuf>,

    /// Suffix appended to the document path for the pre-migration backup
    #[arg(long, default_value = DEFAULT_BACKUP_SUFFIX)]
    backup_suffix: String,

    /// JSON array of titles to attribute to New Riders of the Purple Sage
    #[arg(long)]
    membership: Option<PathBuf>,

    /// Classify and report without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Hide spinners and log phases to stderr instead
    #[arg(long)]
    log_only: bool,

    /// Write the migration report as JSON to this path
    #[arg(long)]
    stats: Option<PathBuf>,
}

fn main() -> Result<()> {
    {
        use tracing_subscriber::prelude::*;

        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .init()
    }

    let args = Args::parse();
    set_log_only(args.log_only);

    let mut config = match args.document {
        Some(path) => MigratorConfig::new(path),
        None => MigratorConfig::from_exe_dir()
            .context("Failed to resolve default song database location")?,
    };
    config = config
        .with_backup_suffix(args.backup_suffix)
        .with_dry_run(args.dry_run);

    if let Some(path) = &args.membership {
        let membership = MembershipSet::from_file(path)
            .with_context(|| format!("Failed to load membership list {:?}", path))?;
        println!(
            "Using {} membership titles from {}",
            membership.len(),
            path.display()
        );
        config = config.with_membership(membership);
    }

    println!("{}", document_line(&config.document_path));
    let migrator = Migrator::new(config);
    let report = migrator.run().context("Migration failed")?;

    print_report(&report);

    if let Some(path) = &args.stats {
        report
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {:?}", path))?;
    }

    Ok(())
}

fn document_line(path: &Path) -> String {
    format!("Song database: {}", path.display())
}

fn print_report(report: &MigrationReport) {
    if report.already_migrated {
        println!("Database already migrated to artist-based structure!");
        if let Some(grouped) = report.grouped_songs {
            if grouped != report.total_songs {
                warn!(
                    songs = report.total_songs,
                    grouped, "flat song list and artist groups disagree"
                );
                println!(
                    "Warning: {} songs in the flat list but {} grouped by artist; new songs were not migrated",
                    report.total_songs, grouped
                );
            }
        }
        return;
    }

    println!("Found {} songs to migrate", report.total_songs);

    if let Some(backup) = &report.backup_path {
        println!("Backup created: {}", backup.display());
    }

    println!("\n{:=<60}", "");
    if report.dry_run {
        println!("Dry run complete, nothing written");
    } else {
        println!("Migration complete!");
    }
    for artist in &report.artists {
        println!("  - {}: {} songs", artist.name, artist.songs);
    }
    println!("  - Total: {} songs", report.total_songs);
    println!(
        "  Elapsed: {}",
        format_duration(Duration::from_secs_f64(report.elapsed_seconds))
    );
    println!("{:=<60}", "");
}
