//! How often the current player teams up with each other player.

use std::collections::HashMap;

use crate::models::{PlayerMatch, PlayerRef, StatKey, TeammateFrequencyEntry};

use super::Diagnostics;

/// Count shared-team appearances per teammate across finished matches.
///
/// `wins` only counts matches both players won. Sorted by wins, most first.
pub fn teammate_frequency(
    matches: &[PlayerMatch],
    current: &StatKey,
    diagnostics: &dyn Diagnostics,
) -> Vec<TeammateFrequencyEntry> {
    let mut teammates: HashMap<StatKey, TeammateFrequencyEntry> = HashMap::new();

    for m in matches.iter().filter(|m| m.finished) {
        let Some(me) = m.player(current) else {
            diagnostics.missing_player("teammate_frequency", m.key(), *current);
            continue;
        };

        for mate in m.teammates_of(me) {
            let entry = teammates
                .entry(mate.key())
                .or_insert_with(|| TeammateFrequencyEntry {
                    player: PlayerRef::from(mate),
                    count: 0,
                    wins: 0,
                });
            entry.count += 1;
            if me.is_winner && mate.is_winner {
                entry.wins += 1;
            }
        }
    }

    let mut entries: Vec<TeammateFrequencyEntry> = teammates.into_values().collect();
    entries.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.player.key.cmp(&b.player.key))
    });
    entries
}
