//! Artist attribution by song title.
//!
//! A title either belongs to the membership set (New Riders of the Purple
//! Sage) or falls through to the default artist (Grateful Dead). Matching is
//! exact: no case folding, no trimming.

use crate::error::{MigrateError, Result};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use std::path::Path;

/// Titles attributed to New Riders of the Purple Sage.
pub const NRPS_TITLES: &[&str] = &[
    "Truck Driving Man",
    "Panama Red",
    "Glendale Train",
    "Henry",
    "Last Lonely Eagle",
    "Louisiana Lady",
    "Whatcha Gonna Do",
    "Dirty Business",
    "Garden of Eden",
    "Hello Mary Lou",
    "She's No Angel",
    "Willie and the Hand Jive",
];

static BUILTIN: Lazy<MembershipSet> =
    Lazy::new(|| MembershipSet::from_titles(NRPS_TITLES.iter().copied()));

/// Artist a song is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtistName {
    GratefulDead,
    NewRiders,
}

impl ArtistName {
    /// Output order of artist groups
    pub const ALL: [ArtistName; 2] = [ArtistName::GratefulDead, ArtistName::NewRiders];

    pub fn as_str(self) -> &'static str {
        match self {
            ArtistName::GratefulDead => "Grateful Dead",
            ArtistName::NewRiders => "New Riders of the Purple Sage",
        }
    }

    /// Position in `ALL`, used to bucket songs
    pub fn rank(self) -> usize {
        match self {
            ArtistName::GratefulDead => 0,
            ArtistName::NewRiders => 1,
        }
    }
}

impl std::fmt::Display for ArtistName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of titles that classify as `ArtistName::NewRiders`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSet {
    titles: FxHashSet<String>,
}

impl MembershipSet {
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    /// The compiled-in NRPS title list
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load a replacement set from a JSON array of strings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::Membership {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let titles: Vec<String> =
            serde_json::from_str(&content).map_err(|e| MigrateError::Membership {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_titles(titles))
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn classify(&self, title: &str) -> ArtistName {
        if self.contains(title) {
            ArtistName::NewRiders
        } else {
            ArtistName::GratefulDead
        }
    }
}

impl Default for MembershipSet {
    fn default() -> Self {
        Self::builtin()
    }
}
