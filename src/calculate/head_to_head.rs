//! Head-to-head records between the current player and each opponent.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{
    GameRef, HeadToHeadEntry, HeadToHeadGame, MatchPlayer, PlayerMatch, PlayerRef, StatKey,
};

use super::{game_ref, Diagnostics};

/// Result of one pairing, seen from the current player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairOutcome {
    Win,
    Loss,
    Tie,
}

fn placed_ahead(a: Option<u32>, b: Option<u32>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

/// Classify a pairing. `None` when neither winner flags nor placements decide it.
pub(crate) fn classify(me: &MatchPlayer, opponent: &MatchPlayer) -> Option<PairOutcome> {
    let (mine, theirs) = (me.valid_placement(), opponent.valid_placement());
    let same_placement = mine.is_some() && mine == theirs;
    if same_placement || (me.is_winner && opponent.is_winner) {
        Some(PairOutcome::Tie)
    } else if me.is_winner || placed_ahead(mine, theirs) {
        Some(PairOutcome::Win)
    } else if opponent.is_winner || placed_ahead(theirs, mine) {
        Some(PairOutcome::Loss)
    } else {
        None
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    wins: u32,
    losses: u32,
    ties: u32,
    matches: u32,
}

impl Tally {
    fn record(&mut self, outcome: Option<PairOutcome>) {
        self.matches += 1;
        match outcome {
            Some(PairOutcome::Win) => self.wins += 1,
            Some(PairOutcome::Loss) => self.losses += 1,
            Some(PairOutcome::Tie) => self.ties += 1,
            None => {}
        }
    }
}

struct OpponentAccumulator {
    player: PlayerRef,
    overall: Tally,
    games: HashMap<StatKey, (GameRef, Tally)>,
}

/// Tally wins, losses and ties against every opponent the current player has
/// met in a finished match.
///
/// Matches missing the current player's row are skipped and reported to
/// `diagnostics`. Entries are ordered by shared matches, most first.
pub fn head_to_head_stats(
    matches: &[PlayerMatch],
    current: &StatKey,
    diagnostics: &dyn Diagnostics,
) -> Vec<HeadToHeadEntry> {
    let mut opponents: HashMap<StatKey, OpponentAccumulator> = HashMap::new();

    for m in matches.iter().filter(|m| m.finished) {
        let Some(me) = m.player(current) else {
            diagnostics.missing_player("head_to_head", m.key(), *current);
            continue;
        };
        let game = game_ref(m);

        for opponent in m.players.iter().filter(|p| p.key() != *current) {
            let outcome = classify(me, opponent);
            let acc = opponents
                .entry(opponent.key())
                .or_insert_with(|| OpponentAccumulator {
                    player: PlayerRef::from(opponent),
                    overall: Tally::default(),
                    games: HashMap::new(),
                });

            acc.overall.record(outcome);
            acc.games
                .entry(game.key)
                .or_insert_with(|| (game.clone(), Tally::default()))
                .1
                .record(outcome);
        }
    }

    let mut entries: Vec<HeadToHeadEntry> = opponents
        .into_values()
        .map(|acc| {
            let mut games: Vec<HeadToHeadGame> = acc
                .games
                .into_values()
                .map(|(game, t)| HeadToHeadGame {
                    game,
                    wins: t.wins,
                    losses: t.losses,
                    ties: t.ties,
                    matches: t.matches,
                })
                .collect();
            games.sort_by(|a, b| {
                b.matches
                    .cmp(&a.matches)
                    .then_with(|| a.game.key.cmp(&b.game.key))
            });

            HeadToHeadEntry {
                player: acc.player,
                wins: acc.overall.wins,
                losses: acc.overall.losses,
                ties: acc.overall.ties,
                matches: acc.overall.matches,
                games,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.matches
            .cmp(&a.matches)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| a.player.key.cmp(&b.player.key))
    });

    debug!("Head-to-head for {}: {} opponents", current, entries.len());
    entries
}
