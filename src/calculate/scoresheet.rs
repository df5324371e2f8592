//! Per-scoresheet and per-round score breakdowns for a single game.

use std::collections::HashMap;

use crate::models::{
    PlayerMatch, PlayerRef, RoundStats, ScoresheetPlayerStats, ScoresheetStats, StatKey,
    WinCondition,
};

use super::{
    average, by_plays_then_win_rate, calculate_win_rate, resolve_game_identity, ScoreBounds,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SheetKey {
    Id(u64),
    Name(String),
}

struct PlayerSheetAccumulator {
    player: PlayerRef,
    plays: u32,
    wins: u32,
    scores: Vec<f64>,
    bounds: ScoreBounds,
}

struct RoundAccumulator {
    name: String,
    order: u32,
    scores: Vec<f64>,
    bounds: ScoreBounds,
}

struct SheetAccumulator {
    scoresheet_id: Option<u64>,
    name: String,
    win_condition: WinCondition,
    is_coop: bool,
    plays: u32,
    scores: Vec<f64>,
    winning_scores: Vec<f64>,
    bounds: ScoreBounds,
    players: HashMap<StatKey, PlayerSheetAccumulator>,
    rounds: HashMap<u64, RoundAccumulator>,
}

impl SheetAccumulator {
    fn finish(self) -> ScoresheetStats {
        let mut players: Vec<ScoresheetPlayerStats> = self
            .players
            .into_values()
            .map(|p| ScoresheetPlayerStats {
                win_rate: calculate_win_rate(p.wins, p.plays),
                average_score: average(&p.scores),
                best_score: p.bounds.best,
                worst_score: p.bounds.worst,
                player: p.player,
                plays: p.plays,
                wins: p.wins,
            })
            .collect();
        players.sort_by(|a, b| {
            by_plays_then_win_rate(a.plays, a.win_rate, b.plays, b.win_rate)
                .then_with(|| a.player.key.cmp(&b.player.key))
        });

        let mut rounds: Vec<RoundStats> = self
            .rounds
            .into_iter()
            .map(|(round_id, r)| RoundStats {
                round_id,
                count: r.scores.len() as u32,
                average_score: average(&r.scores),
                best_score: r.bounds.best,
                worst_score: r.bounds.worst,
                name: r.name,
                order: r.order,
            })
            .collect();
        rounds.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.round_id.cmp(&b.round_id)));

        ScoresheetStats {
            scoresheet_id: self.scoresheet_id,
            name: self.name,
            win_condition: self.win_condition,
            is_coop: self.is_coop,
            plays: self.plays,
            best_score: self.bounds.best,
            worst_score: self.bounds.worst,
            average_score: average(&self.scores),
            average_winning_score: average(&self.winning_scores),
            players,
            rounds,
        }
    }
}

/// Break a game's finished matches down by scoresheet.
///
/// Matches are attributed to `game` after linked-game resolution, so a
/// linked shared game's plays land alongside the original's.
pub fn scoresheet_stats(matches: &[PlayerMatch], game: &StatKey) -> Vec<ScoresheetStats> {
    let mut sheets: HashMap<SheetKey, SheetAccumulator> = HashMap::new();

    for m in matches
        .iter()
        .filter(|m| m.finished && resolve_game_identity(m).key == *game)
    {
        let sheet = &m.scoresheet;
        let key = match sheet.id {
            Some(id) => SheetKey::Id(id),
            None => SheetKey::Name(sheet.name.clone()),
        };
        let condition = sheet.win_condition;

        let acc = sheets.entry(key).or_insert_with(|| SheetAccumulator {
            scoresheet_id: sheet.id,
            name: sheet.name.clone(),
            win_condition: condition,
            is_coop: sheet.is_coop,
            plays: 0,
            scores: Vec::new(),
            winning_scores: Vec::new(),
            bounds: ScoreBounds::default(),
            players: HashMap::new(),
            rounds: HashMap::new(),
        });
        acc.plays += 1;

        for round in &sheet.rounds {
            acc.rounds.entry(round.id).or_insert_with(|| RoundAccumulator {
                name: round.name.clone(),
                order: round.order,
                scores: Vec::new(),
                bounds: ScoreBounds::default(),
            });
        }

        for p in &m.players {
            if let Some(score) = p.score {
                acc.scores.push(score);
                if p.is_winner {
                    acc.winning_scores.push(score);
                }
            }
            acc.bounds.record(condition, p.score);

            let player_acc = acc
                .players
                .entry(p.key())
                .or_insert_with(|| PlayerSheetAccumulator {
                    player: PlayerRef::from(p),
                    plays: 0,
                    wins: 0,
                    scores: Vec::new(),
                    bounds: ScoreBounds::default(),
                });
            player_acc.plays += 1;
            if p.is_winner {
                player_acc.wins += 1;
            }
            if let Some(score) = p.score {
                player_acc.scores.push(score);
            }
            player_acc.bounds.record(condition, p.score);

            for round_score in &p.rounds {
                let round = acc
                    .rounds
                    .entry(round_score.round_id)
                    .or_insert_with(|| RoundAccumulator {
                        name: format!("Round {}", round_score.round_id),
                        order: u32::MAX,
                        scores: Vec::new(),
                        bounds: ScoreBounds::default(),
                    });
                if let Some(score) = round_score.score {
                    round.scores.push(score);
                }
                round.bounds.record(condition, round_score.score);
            }
        }
    }

    let mut stats: Vec<ScoresheetStats> = sheets
        .into_values()
        .map(SheetAccumulator::finish)
        .collect();
    stats.sort_by(|a, b| b.plays.cmp(&a.plays).then_with(|| a.name.cmp(&b.name)));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::*;
    use crate::models::{RecordType, Scoresheet};

    fn rounds_sheet() -> Scoresheet {
        Scoresheet::new(WinCondition::HighestScore)
            .with_id(1, "Standard")
            .with_round(10, "Round 1", 1)
            .with_round(11, "Round 2", 2)
    }

    #[test]
    fn test_empty_for_unknown_game() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        assert!(scoresheet_stats(&[duel(1, 0, &ana, &ben)], &StatKey::original(42)).is_empty());
    }

    #[test]
    fn test_scoresheet_totals() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let matches = vec![
            duel(1, 0, &ana, &ben),
            game_match(2, 1, 1, WinCondition::HighestScore)
                .with_player(ben.clone().winner().with_score(70.0))
                .with_player(ana.clone().with_score(10.0)),
        ];

        let stats = scoresheet_stats(&matches, &StatKey::original(1));
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.plays, 2);
        assert_eq!(s.best_score, Some(70.0));
        assert_eq!(s.worst_score, Some(10.0));
        assert_eq!(s.average_score, Some(40.0));
        assert_eq!(s.average_winning_score, Some(60.0));
        assert_eq!(s.players.len(), 2);
        assert_eq!(s.players[0].win_rate, 0.5);
    }

    #[test]
    fn test_groups_by_scoresheet() {
        let ana = player(1, "Ana");
        let mut low = game_match(2, 1, 1, WinCondition::LowestScore)
            .with_player(ana.clone().winner().with_score(12.0));
        low.scoresheet = low.scoresheet.with_id(2, "Golf");
        let matches = vec![
            game_match(1, 0, 1, WinCondition::HighestScore)
                .with_player(ana.clone().with_score(5.0)),
            low.clone(),
            {
                let mut again = low;
                again.id = 3;
                again
            },
        ];

        let stats = scoresheet_stats(&matches, &StatKey::original(1));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "Golf");
        assert_eq!(stats[0].plays, 2);
        assert_eq!(stats[0].win_condition, WinCondition::LowestScore);
        assert_eq!(stats[1].plays, 1);
    }

    #[test]
    fn test_round_breakdown() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let mut m = game_match(1, 0, 1, WinCondition::HighestScore)
            .with_player(
                ana.clone()
                    .winner()
                    .with_score(30.0)
                    .with_round_score(10, 10.0)
                    .with_round_score(11, 20.0),
            )
            .with_player(
                ben.clone()
                    .with_score(25.0)
                    .with_round_score(10, 20.0)
                    .with_round_score(11, 5.0),
            );
        m.scoresheet = rounds_sheet();

        let stats = scoresheet_stats(&[m], &StatKey::original(1));
        let rounds = &stats[0].rounds;
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].name, "Round 1");
        assert_eq!(rounds[0].count, 2);
        assert_eq!(rounds[0].average_score, Some(15.0));
        assert_eq!(rounds[0].best_score, Some(20.0));
        assert_eq!(rounds[1].worst_score, Some(5.0));
    }

    #[test]
    fn test_undeclared_round_sorted_last() {
        let ana = player(1, "Ana");
        let mut m = game_match(1, 0, 1, WinCondition::HighestScore)
            .with_player(ana.with_round_score(99, 4.0).with_round_score(10, 1.0));
        m.scoresheet = rounds_sheet();

        let stats = scoresheet_stats(&[m], &StatKey::original(1));
        let rounds = &stats[0].rounds;
        assert_eq!(rounds.len(), 3);
        assert_eq!(rounds[2].name, "Round 99");
        assert_eq!(rounds[1].count, 0);
        assert_eq!(rounds[1].average_score, None);
    }

    #[test]
    fn test_includes_linked_shared_matches() {
        let ana = player(1, "Ana");
        let mut shared = game_match(2, 1, 77, WinCondition::HighestScore)
            .linked_to(1)
            .with_player(ana.clone().with_score(8.0));
        shared.record_type = RecordType::Shared;
        let matches = vec![
            game_match(1, 0, 1, WinCondition::HighestScore).with_player(ana.with_score(3.0)),
            shared,
        ];

        let stats = scoresheet_stats(&matches, &StatKey::original(1));
        assert_eq!(stats[0].plays, 2);
        assert!(scoresheet_stats(&matches, &StatKey::shared(77)).is_empty());
    }

    #[test]
    fn test_manual_scoresheet_has_no_bounds() {
        let ana = player(1, "Ana");
        let m = game_match(1, 0, 1, WinCondition::Manual)
            .with_player(ana.winner().with_score(11.0));

        let s = &scoresheet_stats(&[m], &StatKey::original(1))[0];
        assert_eq!((s.best_score, s.worst_score), (None, None));
        assert_eq!(s.average_score, Some(11.0));
    }

    #[test]
    fn test_unfinished_matches_ignored() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let mut finished = game_match(1, 0, 1, WinCondition::HighestScore)
            .with_player(ana.clone().winner().with_score(30.0).with_round_score(10, 30.0))
            .with_player(ben.clone().with_score(20.0).with_round_score(10, 20.0));
        finished.scoresheet = rounds_sheet();

        let mut abandoned = game_match(2, 1, 1, WinCondition::HighestScore)
            .with_player(
                ana.with_score(-1_000_000.0)
                    .with_round_score(10, -500.0)
                    .with_round_score(55, 9_999.0),
            )
            .with_player(
                player(3, "Cy")
                    .winner()
                    .with_score(1_000_000.0)
                    .with_round_score(11, 9_999.0),
            )
            .unfinished();
        abandoned.scoresheet = rounds_sheet();

        let baseline = scoresheet_stats(&[finished.clone()], &StatKey::original(1));
        let with_unfinished = scoresheet_stats(&[finished, abandoned], &StatKey::original(1));
        assert_eq!(with_unfinished, baseline);
        assert_eq!(with_unfinished[0].plays, 1);
    }

    #[test]
    fn test_coop_flag_carried_through() {
        let ana = player(1, "Ana");
        let mut m = game_match(1, 0, 1, WinCondition::NoWinner)
            .with_player(ana.winner().with_score(4.0));
        m.scoresheet = Scoresheet::new(WinCondition::NoWinner)
            .with_id(5, "Campaign")
            .coop();

        let s = &scoresheet_stats(&[m], &StatKey::original(1))[0];
        assert!(s.is_coop);
        assert_eq!(s.name, "Campaign");
        assert_eq!(s.win_condition, WinCondition::NoWinner);
    }
}
