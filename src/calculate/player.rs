//! Per-player aggregation over a match history.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::models::{
    GameRef, GameStats, MatchOutcome, PlayerAggregateStats, PlayerMatch, PlayerRef, StatKey,
    Streaks,
};

use super::{average, by_plays_then_win_rate, calculate_win_rate, game_ref, ScoreBounds};

struct GameAccumulator {
    game: GameRef,
    plays: u32,
    wins: u32,
    playtime: u64,
    scores: Vec<f64>,
    bounds: ScoreBounds,
}

impl GameAccumulator {
    fn new(game: GameRef) -> Self {
        Self {
            game,
            plays: 0,
            wins: 0,
            playtime: 0,
            scores: Vec::new(),
            bounds: ScoreBounds::default(),
        }
    }

    fn finish(self) -> GameStats {
        GameStats {
            win_rate: calculate_win_rate(self.wins, self.plays),
            average_score: average(&self.scores),
            best_score: self.bounds.best,
            worst_score: self.bounds.worst,
            game: self.game,
            plays: self.plays,
            wins: self.wins,
            playtime: self.playtime,
            scores: self.scores,
        }
    }
}

struct PlayerAccumulator {
    player: PlayerRef,
    is_user: bool,
    plays: u32,
    wins: u32,
    placements: BTreeMap<u32, u32>,
    playtime: u64,
    streaks: Streaks,
    recent_form: Vec<MatchOutcome>,
    games: HashMap<StatKey, GameAccumulator>,
}

impl PlayerAccumulator {
    fn new(player: PlayerRef) -> Self {
        Self {
            player,
            is_user: false,
            plays: 0,
            wins: 0,
            placements: BTreeMap::new(),
            playtime: 0,
            streaks: Streaks::default(),
            recent_form: Vec::new(),
            games: HashMap::new(),
        }
    }

    fn finish(self) -> PlayerAggregateStats {
        let mut game_stats: Vec<GameStats> =
            self.games.into_values().map(GameAccumulator::finish).collect();
        game_stats.sort_by(|a, b| {
            by_plays_then_win_rate(a.plays, a.win_rate, b.plays, b.win_rate)
                .then_with(|| a.game.key.cmp(&b.game.key))
        });

        PlayerAggregateStats {
            win_rate: calculate_win_rate(self.wins, self.plays),
            player: self.player,
            is_user: self.is_user,
            plays: self.plays,
            wins: self.wins,
            placements: self.placements,
            playtime: self.playtime,
            streaks: self.streaks,
            recent_form: self.recent_form,
            game_stats,
        }
    }
}

/// Fold a match history into one aggregate per player.
///
/// Matches are processed oldest first, so `streaks.current` is the run ending
/// at each player's latest match and `recent_form` reads chronologically.
/// Unfinished matches are ignored. Output is sorted by plays, then win rate,
/// both descending.
pub fn aggregate_player_stats(matches: &[PlayerMatch]) -> Vec<PlayerAggregateStats> {
    let mut ordered: Vec<&PlayerMatch> = matches.iter().filter(|m| m.finished).collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.key().cmp(&b.key())));

    let mut players: HashMap<StatKey, PlayerAccumulator> = HashMap::new();

    for m in &ordered {
        let game = game_ref(m);
        let condition = m.scoresheet.win_condition;

        for p in &m.players {
            let acc = players
                .entry(p.key())
                .or_insert_with(|| PlayerAccumulator::new(PlayerRef::from(p)));

            // Latest match wins for display fields
            acc.player.name.clone_from(&p.name);
            acc.player.image.clone_from(&p.image);
            acc.is_user |= p.is_user;

            acc.plays += 1;
            if p.is_winner {
                acc.wins += 1;
            }
            if let Some(placement) = p.valid_placement() {
                *acc.placements.entry(placement).or_default() += 1;
            }
            acc.playtime += m.duration;

            let outcome = MatchOutcome::from_winner(p.is_winner);
            acc.recent_form.push(outcome);
            acc.streaks.record(outcome);

            let game_acc = acc
                .games
                .entry(game.key)
                .or_insert_with(|| GameAccumulator::new(game.clone()));
            game_acc.plays += 1;
            if p.is_winner {
                game_acc.wins += 1;
            }
            game_acc.playtime += m.duration;
            if let Some(score) = p.score {
                game_acc.scores.push(score);
            }
            game_acc.bounds.record(condition, p.score);
        }
    }

    let mut stats: Vec<PlayerAggregateStats> = players
        .into_values()
        .map(PlayerAccumulator::finish)
        .collect();
    stats.sort_by(|a, b| {
        by_plays_then_win_rate(a.plays, a.win_rate, b.plays, b.win_rate)
            .then_with(|| a.player.key.cmp(&b.player.key))
    });

    debug!(
        "Aggregated {} players from {} finished matches",
        stats.len(),
        ordered.len()
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::*;
    use crate::models::{RecordType, Streak, WinCondition};
    use pretty_assertions::assert_eq;

    fn find<'a>(stats: &'a [PlayerAggregateStats], key: StatKey) -> &'a PlayerAggregateStats {
        stats.iter().find(|s| s.player.key == key).unwrap()
    }

    #[test]
    fn test_empty_history() {
        assert!(aggregate_player_stats(&[]).is_empty());
    }

    #[test]
    fn test_single_match_two_players() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let stats = aggregate_player_stats(&[duel(1, 0, &ana, &ben)]);

        assert_eq!(stats.len(), 2);
        let a = find(&stats, StatKey::original(1));
        assert_eq!((a.plays, a.wins, a.win_rate), (1, 1, 1.0));
        assert_eq!(a.placements, BTreeMap::from([(1, 1)]));

        let b = find(&stats, StatKey::original(2));
        assert_eq!((b.plays, b.wins, b.win_rate), (1, 0, 0.0));
        assert_eq!(b.placements, BTreeMap::from([(2, 1)]));
    }

    #[test]
    fn test_unfinished_matches_ignored() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let base = vec![duel(1, 0, &ana, &ben)];

        let mut with_unfinished = base.clone();
        with_unfinished.push(
            game_match(2, 5, 1, WinCondition::HighestScore)
                .unfinished()
                .with_duration(9999)
                .with_player(ben.clone().winner().with_placement(1).with_score(1_000_000.0))
                .with_player(ana.clone().with_placement(2).with_score(-1_000_000.0))
                .with_player(player(3, "Cy").with_placement(3)),
        );

        assert_eq!(
            aggregate_player_stats(&base),
            aggregate_player_stats(&with_unfinished)
        );
    }

    #[test]
    fn test_win_rate_is_exact_ratio() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let matches = vec![
            duel(1, 0, &ana, &ben),
            duel(2, 1, &ben, &ana),
            duel(3, 2, &ana, &ben),
        ];

        for s in aggregate_player_stats(&matches) {
            assert_eq!(s.win_rate, s.wins as f64 / s.plays as f64);
        }
    }

    #[test]
    fn test_placement_histogram_skips_missing_and_zero() {
        let ana = player(1, "Ana");
        let matches = vec![
            duel(1, 0, &ana, &player(2, "Ben")),
            game_match(2, 1, 1, WinCondition::Manual).with_player(ana.clone().winner()),
            game_match(3, 2, 1, WinCondition::HighestScore)
                .with_player(ana.clone().with_placement(0)),
        ];

        let stats = aggregate_player_stats(&matches);
        let a = find(&stats, StatKey::original(1));
        assert_eq!(a.plays, 3);
        assert_eq!(a.placements.values().sum::<u32>(), 1);
    }

    #[test]
    fn test_loss_then_win_streaks() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        // Given out of order on purpose
        let matches = vec![duel(2, 3, &ana, &ben), duel(1, 0, &ben, &ana)];

        let stats = aggregate_player_stats(&matches);
        let a = find(&stats, StatKey::original(1));
        assert_eq!(a.streaks.longest, Streak::new(MatchOutcome::Win, 1));
        assert_eq!(a.streaks.current, Streak::new(MatchOutcome::Win, 1));
        assert_eq!(a.recent_form, vec![MatchOutcome::Loss, MatchOutcome::Win]);

        let b = find(&stats, StatKey::original(2));
        assert_eq!(b.streaks.current, Streak::new(MatchOutcome::Loss, 1));
        assert_eq!(b.streaks.longest, Streak::new(MatchOutcome::Win, 1));
    }

    #[test]
    fn test_current_streak_ends_at_latest_match() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let matches = vec![
            duel(1, 0, &ana, &ben),
            duel(2, 1, &ana, &ben),
            duel(3, 2, &ana, &ben),
            duel(4, 3, &ben, &ana),
            duel(5, 4, &ben, &ana),
        ];

        let stats = aggregate_player_stats(&matches);
        let a = find(&stats, StatKey::original(1));
        assert_eq!(a.streaks.current, Streak::new(MatchOutcome::Loss, 2));
        assert_eq!(a.streaks.longest, Streak::new(MatchOutcome::Win, 3));
        assert_eq!(
            a.recent_form,
            vec![
                MatchOutcome::Win,
                MatchOutcome::Win,
                MatchOutcome::Win,
                MatchOutcome::Loss,
                MatchOutcome::Loss,
            ]
        );
    }

    #[test]
    fn test_linked_shared_game_merges_into_original() {
        let ana = player(1, "Ana");
        let original = game_match(1, 0, 7, WinCondition::HighestScore)
            .with_player(ana.clone().winner().with_score(40.0));
        let mut shared = game_match(2, 1, 55, WinCondition::HighestScore)
            .linked_to(7)
            .with_player(ana.clone().with_score(20.0));
        shared.record_type = RecordType::Shared;

        let stats = aggregate_player_stats(&[original, shared]);
        let a = find(&stats, StatKey::original(1));
        assert_eq!(a.game_stats.len(), 1);

        let g = &a.game_stats[0];
        assert_eq!(g.game.key, StatKey::original(7));
        assert_eq!(g.game.record_type, RecordType::Original);
        assert_eq!(g.plays, 2);
        assert_eq!(g.wins, 1);
        assert_eq!(g.scores, vec![40.0, 20.0]);
    }

    #[test]
    fn test_game_stats_best_worst_by_condition() {
        let ana = player(1, "Ana");
        let run = |condition: WinCondition| {
            let matches: Vec<_> = [10.0, 30.0, 20.0]
                .iter()
                .enumerate()
                .map(|(i, score)| {
                    game_match(i as u64 + 1, i as i64, 1, condition)
                        .with_player(ana.clone().with_score(*score))
                })
                .collect();
            let stats = aggregate_player_stats(&matches);
            stats[0].game_stats[0].clone()
        };

        let high = run(WinCondition::HighestScore);
        assert_eq!((high.best_score, high.worst_score), (Some(30.0), Some(10.0)));
        assert_eq!(high.average_score, Some(20.0));

        let low = run(WinCondition::LowestScore);
        assert_eq!((low.best_score, low.worst_score), (Some(10.0), Some(30.0)));

        let manual = run(WinCondition::Manual);
        assert_eq!((manual.best_score, manual.worst_score), (None, None));
        assert_eq!(manual.average_score, Some(20.0));
    }

    #[test]
    fn test_average_score_none_without_scores() {
        let ana = player(1, "Ana");
        let m = game_match(1, 0, 1, WinCondition::Manual).with_player(ana.winner());
        let stats = aggregate_player_stats(&[m]);
        assert_eq!(stats[0].game_stats[0].average_score, None);
        assert_eq!(stats[0].game_stats[0].win_rate, 1.0);
    }

    #[test]
    fn test_playtime_sums_durations() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let matches = vec![
            duel(1, 0, &ana, &ben).with_duration(1800),
            duel(2, 1, &ana, &ben).with_duration(600),
        ];

        let stats = aggregate_player_stats(&matches);
        let a = find(&stats, StatKey::original(1));
        assert_eq!(a.playtime, 2400);
        assert_eq!(a.game_stats[0].playtime, 2400);
    }

    #[test]
    fn test_sorted_by_plays_then_win_rate() {
        let ana = player(1, "Ana");
        let ben = player(2, "Ben");
        let cy = player(3, "Cy");
        let dan = player(4, "Dan");
        let matches = vec![
            duel(1, 0, &ana, &ben),
            duel(2, 1, &ana, &cy),
            duel(3, 2, &cy, &ben),
            duel(4, 3, &ana, &dan),
        ];

        let order: Vec<u64> = aggregate_player_stats(&matches)
            .iter()
            .map(|s| s.player.id)
            .collect();
        // Ben and Cy tie on plays; Cy has the better rate
        assert_eq!(order, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_original_and_shared_players_are_distinct() {
        let local = player(1, "Ana");
        let remote = crate::models::MatchPlayer::new(RecordType::Shared, 1, "Ana");
        let m = game_match(1, 0, 1, WinCondition::Manual)
            .with_player(local.winner())
            .with_player(remote);

        assert_eq!(aggregate_player_stats(&[m]).len(), 2);
    }

    #[test]
    fn test_game_stats_sorted_within_player() {
        let ana = player(1, "Ana");
        let matches = vec![
            game_match(1, 0, 1, WinCondition::Manual).with_player(ana.clone()),
            game_match(2, 1, 2, WinCondition::Manual).with_player(ana.clone().winner()),
            game_match(3, 2, 2, WinCondition::Manual).with_player(ana.clone()),
        ];

        let stats = aggregate_player_stats(&matches);
        let keys: Vec<StatKey> = stats[0].game_stats.iter().map(|g| g.game.key).collect();
        assert_eq!(keys, vec![StatKey::original(2), StatKey::original(1)]);
    }
}
