//! JSONL (JSON Lines) storage.
//!
//! Each line is one entity. Unreadable lines are logged and skipped so a
//! single corrupt row never hides the rest of the file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{parse_round_dir, StorageConfig, StorageError};
use crate::models::{MatchResult, PredictionRecord, Round};

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Prediction,
    Match,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Prediction => "predictions.jsonl",
            EntityType::Match => "matches.jsonl",
        }
    }
}

/// Path of an entity file. Matches are partitioned by round, predictions
/// live in one flat file.
pub fn entity_path(config: &StorageConfig, entity: EntityType, round: Option<Round>) -> PathBuf {
    match round {
        Some(round) => config.round_dir(round).join(entity.filename()),
        None => config.normalized_dir().join(entity.filename()),
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_entity(config: &StorageConfig, entity: EntityType, round: Option<Round>) -> Self {
        Self::new(entity_path(config, entity, round))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }

    /// Write entities, replacing the entire file.
    ///
    /// Writes to a sibling temp file first and renames it into place.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp_path = self.path.with_extension("jsonl.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp_path, &self.path)?;

        info!("Wrote {} entities to {:?}", entities.len(), self.path);
        Ok(entities.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_entity(config: &StorageConfig, entity: EntityType, round: Option<Round>) -> Self {
        Self::new(entity_path(config, entity, round))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities from the file. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", index + 1, self.path, e);
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// Rounds that have a fixtures file, ascending.
pub fn list_rounds(config: &StorageConfig) -> Result<Vec<Round>, StorageError> {
    let dir = config.normalized_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut rounds = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(round) = entry.file_name().to_str().and_then(parse_round_dir) {
            rounds.push(round);
        }
    }

    rounds.sort_unstable();
    Ok(rounds)
}

/// Read every stored prediction record.
pub fn read_predictions(config: &StorageConfig) -> Result<Vec<PredictionRecord>, StorageError> {
    JsonlReader::for_entity(config, EntityType::Prediction, None).read_all()
}

/// Store a submission, replacing an earlier one by the same user for the
/// same round.
pub fn upsert_prediction(
    config: &StorageConfig,
    record: &PredictionRecord,
) -> Result<bool, StorageError> {
    let mut records = read_predictions(config)?;
    let id = record.id();
    let before = records.len();
    records.retain(|r| r.id() != id);
    let replaced = records.len() != before;
    records.push(record.clone());

    JsonlWriter::for_entity(config, EntityType::Prediction, None).write_all(&records)?;
    Ok(replaced)
}

/// Read the fixtures and results of one round, in fixture order.
pub fn read_matches(config: &StorageConfig, round: Round) -> Result<Vec<MatchResult>, StorageError> {
    JsonlReader::for_entity(config, EntityType::Match, Some(round)).read_all()
}

/// Insert or replace a match by fixture id, keeping the round's fixture
/// order. New fixtures are appended.
pub fn upsert_match(config: &StorageConfig, result: &MatchResult) -> Result<bool, StorageError> {
    let mut matches = read_matches(config, result.round)?;
    let replaced = match matches.iter_mut().find(|m| m.fixture_id == result.fixture_id) {
        Some(existing) => {
            *existing = result.clone();
            true
        }
        None => {
            matches.push(result.clone());
            false
        }
    };

    JsonlWriter::for_entity(config, EntityType::Match, Some(result.round)).write_all(&matches)?;
    Ok(replaced)
}
