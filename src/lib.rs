//! Song database migration library - shared modules for the migrate binary.

pub mod config;
pub mod error;
pub mod membership;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod safety;

pub use config::MigratorConfig;
pub use error::MigrateError;
pub use membership::{ArtistName, MembershipSet};
pub use migrate::Migrator;
pub use models::{Artist, MigrationReport, Song, SongDatabase};
