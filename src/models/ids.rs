//! Record identity: original vs shared records and the composite stat key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing identities from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("Unknown record type: {0} (expected 'original' or 'shared')")]
    UnknownRecordType(String),

    #[error("Invalid key: {0} (expected '<type>-<id>')")]
    InvalidKey(String),
}

/// Which record space an entity lives in.
///
/// A user's own games and players are `Original`; entities another user has
/// shared with them are `Shared`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Original,
    Shared,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Original => "original",
            RecordType::Shared => "shared",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(RecordType::Original),
            "shared" => Ok(RecordType::Shared),
            other => Err(KeyParseError::UnknownRecordType(other.to_string())),
        }
    }
}

/// Composite `(type, id)` key used to bucket players and games.
///
/// Rendered as `"{type}-{id}"`, e.g. `original-12`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatKey {
    pub record_type: RecordType,
    pub id: u64,
}

impl StatKey {
    pub fn new(record_type: RecordType, id: u64) -> Self {
        Self { record_type, id }
    }

    pub fn original(id: u64) -> Self {
        Self::new(RecordType::Original, id)
    }

    pub fn shared(id: u64) -> Self {
        Self::new(RecordType::Shared, id)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.record_type, self.id)
    }
}

impl fmt::Debug for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatKey({})", self)
    }
}

impl FromStr for StatKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| KeyParseError::InvalidKey(s.to_string()))?;
        let record_type = kind.parse()?;
        let id = id
            .parse()
            .map_err(|_| KeyParseError::InvalidKey(s.to_string()))?;
        Ok(Self { record_type, id })
    }
}

impl Serialize for StatKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
