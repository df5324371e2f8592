//! JSONL (JSON Lines) match store.
//!
//! The store is the input provider for the statistics engine: one
//! normalized `PlayerMatch` per line, already resolved to a single identity
//! space.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::{PlayerMatch, StatKey};

/// Line-oriented JSON writer.
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

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn write_lines(&self, file: File, records: &[T]) -> Result<usize, StorageError> {
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(records.len())
    }

    /// Append records to the end of the file, creating it if needed.
    pub fn append_batch(&self, records: &[T]) -> Result<usize, StorageError> {
        if records.is_empty() {
            return Ok(0);
        }
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let count = self.write_lines(file, records)?;

        debug!("Appended {} records to {:?}", count, self.path);
        Ok(count)
    }

    /// Replace the file's contents.
    pub fn write_all(&self, records: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let count = self.write_lines(file, records)?;

        info!("Wrote {} records to {:?}", count, self.path);
        Ok(count)
    }
}

/// Line-oriented JSON reader.
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

    /// Read every parseable record. A missing file reads as empty.
    ///
    /// Lines that fail to parse are logged and skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping line {} in {:?}: {}", index + 1, self.path, e),
            }
        }

        debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read_all()?.into_iter().filter(predicate).collect())
    }
}

/// Outcome of importing a batch of matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
}

/// Read the full match history.
pub fn read_matches(config: &StorageConfig) -> Result<Vec<PlayerMatch>, StorageError> {
    JsonlReader::new(config.matches_path()).read_all()
}

/// Matches the given player took part in.
pub fn read_matches_for_player(
    config: &StorageConfig,
    player: &StatKey,
) -> Result<Vec<PlayerMatch>, StorageError> {
    JsonlReader::<PlayerMatch>::new(config.matches_path())
        .read_where(|m| m.player(player).is_some())
}

/// Append matches whose `(type, id)` is not already stored.
pub fn import_matches(
    config: &StorageConfig,
    matches: &[PlayerMatch],
) -> Result<ImportSummary, StorageError> {
    let mut seen: HashSet<StatKey> = read_matches(config)?.iter().map(|m| m.key()).collect();

    let fresh: Vec<PlayerMatch> = matches
        .iter()
        .filter(|m| seen.insert(m.key()))
        .cloned()
        .collect();

    let added = JsonlWriter::new(config.matches_path()).append_batch(&fresh)?;
    let summary = ImportSummary {
        added,
        skipped: matches.len() - added,
    };

    info!(
        "Imported {} matches ({} already present)",
        summary.added, summary.skipped
    );
    Ok(summary)
}
