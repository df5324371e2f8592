//! Team-game performance for the current player.

use crate::models::{
    MatchOutcome, MatchSummary, PlayerMatch, PlayerRef, StatKey, TeamMatch, TeamStats,
};

use super::{calculate_win_rate, game_ref, Diagnostics};

const DEFAULT_TEAM_NAME: &str = "Team";

/// Summarize finished matches where the current player had at least one
/// teammate. A team of one is not a team game.
pub fn get_team_stats(
    matches: &[PlayerMatch],
    current: &StatKey,
    diagnostics: &dyn Diagnostics,
) -> TeamStats {
    let mut team_matches = Vec::new();
    let mut team_wins = 0u32;

    for m in matches.iter().filter(|m| m.finished) {
        let Some(me) = m.player(current) else {
            diagnostics.missing_player("team_stats", m.key(), *current);
            continue;
        };
        let Some(team_id) = me.team_id else {
            continue;
        };

        let players: Vec<PlayerRef> = m.teammates_of(me).map(PlayerRef::from).collect();
        if players.is_empty() {
            continue;
        }

        if me.is_winner {
            team_wins += 1;
        }

        team_matches.push(TeamMatch {
            team_name: m
                .team_name(team_id)
                .unwrap_or(DEFAULT_TEAM_NAME)
                .to_string(),
            match_summary: MatchSummary::new(m, game_ref(m)),
            result: MatchOutcome::from_winner(me.is_winner),
            players,
        });
    }

    team_matches.sort_by(|a, b| b.match_summary.date.cmp(&a.match_summary.date));

    let total_team_games = team_matches.len() as u32;
    TeamStats {
        total_team_games,
        team_wins,
        team_win_rate: calculate_win_rate(team_wins, total_team_games),
        team_matches,
    }
}
