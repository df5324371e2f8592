//! Diagnostics hook for inconsistencies found while aggregating.
//!
//! Aggregators never fail on malformed input. They skip the offending match
//! and report it here instead.

use std::sync::Mutex;

use tracing::warn;

use crate::models::StatKey;

/// A skipped-input event reported by an aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The designated player has no result row in one of their matches.
    MissingPlayer {
        aggregator: &'static str,
        match_key: StatKey,
        player: StatKey,
    },
}

/// Receiver for aggregation diagnostics.
pub trait Diagnostics: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn missing_player(&self, aggregator: &'static str, match_key: StatKey, player: StatKey) {
        self.report(Diagnostic::MissingPlayer {
            aggregator,
            match_key,
            player,
        });
    }
}

/// Logs diagnostics through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::MissingPlayer {
                aggregator,
                match_key,
                player,
            } => {
                warn!(
                    aggregator,
                    match_key = %match_key,
                    player = %player,
                    "Player not found in match, skipping"
                );
            }
        }
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match self.events.lock() {
            Ok(mut events) => events.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
