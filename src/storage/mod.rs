//! Filesystem storage for the tournament data directory.
//!
//! Everything lives as JSON Lines in one directory:
//! - `roster.jsonl`: registered competitors
//! - `pairings.jsonl`: every pairing ever generated, with results once known
//! - `standings.jsonl`: the latest standings table

pub mod jsonl;

pub use jsonl::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Competitor, Pairing, StandingsRow};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Path of an entity's file inside the data directory.
    pub fn path_for(&self, entity: EntityType) -> PathBuf {
        self.data_dir.join(entity.filename())
    }

    pub fn roster_path(&self) -> PathBuf {
        self.path_for(EntityType::Competitor)
    }

    pub fn pairings_path(&self) -> PathBuf {
        self.path_for(EntityType::Pairing)
    }

    pub fn standings_path(&self) -> PathBuf {
        self.path_for(EntityType::Standings)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Rows read from a file plus the number of lines that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub malformed: usize,
}

/// Read the roster.
pub fn read_roster(config: &StorageConfig) -> Result<Loaded<Competitor>, StorageError> {
    JsonlReader::new(config.roster_path()).read_all_counted()
}

/// Read the full pairing history.
pub fn read_pairings(config: &StorageConfig) -> Result<Loaded<Pairing>, StorageError> {
    JsonlReader::new(config.pairings_path()).read_all_counted()
}

/// Append freshly generated pairings to the history.
pub fn append_pairings(config: &StorageConfig, pairings: &[Pairing]) -> Result<usize, StorageError> {
    JsonlWriter::new(config.pairings_path()).append_batch(pairings)
}

/// Replace the standings file.
pub fn write_standings(
    config: &StorageConfig,
    rows: &[StandingsRow],
) -> Result<usize, StorageError> {
    JsonlWriter::new(config.standings_path()).write_all(rows)
}

/// Read the last written standings.
pub fn read_standings(config: &StorageConfig) -> Result<Vec<StandingsRow>, StorageError> {
    JsonlReader::new(config.standings_path()).read_all()
}
