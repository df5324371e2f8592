//! Normalized match records consumed by the statistics engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RecordType, StatKey};

/// Rule that decides who wins a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinCondition {
    #[serde(rename = "Highest Score")]
    HighestScore,
    #[serde(rename = "Lowest Score")]
    LowestScore,
    #[serde(rename = "Manual")]
    Manual,
    #[serde(rename = "Target Score")]
    TargetScore,
    #[serde(rename = "No Winner")]
    NoWinner,
}

impl WinCondition {
    /// Whether `candidate` beats `current` under this condition.
    ///
    /// Only score-ranked conditions order scores; everything else yields `None`.
    pub fn is_better(&self, candidate: f64, current: f64) -> Option<bool> {
        match self {
            WinCondition::HighestScore => Some(candidate > current),
            WinCondition::LowestScore => Some(candidate < current),
            _ => None,
        }
    }

    pub fn ranks_scores(&self) -> bool {
        matches!(self, WinCondition::HighestScore | WinCondition::LowestScore)
    }
}

impl std::fmt::Display for WinCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WinCondition::HighestScore => "Highest Score",
            WinCondition::LowestScore => "Lowest Score",
            WinCondition::Manual => "Manual",
            WinCondition::TargetScore => "Target Score",
            WinCondition::NoWinner => "No Winner",
        };
        write!(f, "{}", s)
    }
}

/// A scoring round defined on a scoresheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub order: u32,
}

/// Win-condition metadata attached to a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoresheet {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub name: String,

    pub win_condition: WinCondition,

    #[serde(default)]
    pub is_coop: bool,

    #[serde(default)]
    pub target_score: Option<f64>,

    #[serde(default)]
    pub rounds: Vec<Round>,
}

impl Scoresheet {
    pub fn new(win_condition: WinCondition) -> Self {
        Self {
            id: None,
            name: win_condition.to_string(),
            win_condition,
            is_coop: false,
            target_score: None,
            rounds: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: u64, name: &str) -> Self {
        self.id = Some(id);
        self.name = name.to_string();
        self
    }

    pub fn coop(mut self) -> Self {
        self.is_coop = true;
        self
    }

    pub fn with_round(mut self, id: u64, name: &str, order: u32) -> Self {
        self.rounds.push(Round {
            id,
            name: name.to_string(),
            order,
        });
        self
    }
}

/// A team grouping within a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
}

/// One player's score for a single scoresheet round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundScore {
    pub round_id: u64,
    pub score: Option<f64>,
}

/// A participant's result row within a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayer {
    pub id: u64,

    #[serde(rename = "type")]
    pub record_type: RecordType,

    pub name: String,

    #[serde(default)]
    pub image: Option<String>,

    /// Flags the local account holder
    #[serde(default)]
    pub is_user: bool,

    #[serde(default)]
    pub is_winner: bool,

    #[serde(default)]
    pub score: Option<f64>,

    /// 1 = first place; absent when the win condition produces no ranking.
    /// Zero and negative values are kept as recorded and never rank.
    #[serde(default)]
    pub placement: Option<i64>,

    #[serde(default)]
    pub team_id: Option<u64>,

    #[serde(default)]
    pub rounds: Vec<RoundScore>,
}

impl MatchPlayer {
    pub fn new(record_type: RecordType, id: u64, name: &str) -> Self {
        Self {
            id,
            record_type,
            name: name.to_string(),
            image: None,
            is_user: false,
            is_winner: false,
            score: None,
            placement: None,
            team_id: None,
            rounds: Vec::new(),
        }
    }

    pub fn key(&self) -> StatKey {
        StatKey::new(self.record_type, self.id)
    }

    pub fn winner(mut self) -> Self {
        self.is_winner = true;
        self
    }

    pub fn user(mut self) -> Self {
        self.is_user = true;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_placement(mut self, placement: i64) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_team(mut self, team_id: u64) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn with_round_score(mut self, round_id: u64, score: f64) -> Self {
        self.rounds.push(RoundScore {
            round_id,
            score: Some(score),
        });
        self
    }

    /// Placement usable for ranking (positive integers only).
    pub fn valid_placement(&self) -> Option<u32> {
        self.placement
            .filter(|p| *p > 0)
            .and_then(|p| u32::try_from(p).ok())
    }
}

/// One recorded play of a game, with every participant's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatch {
    pub id: u64,

    #[serde(rename = "type")]
    pub record_type: RecordType,

    pub date: DateTime<Utc>,

    #[serde(default)]
    pub name: String,

    pub game_id: u64,

    #[serde(default)]
    pub game_name: String,

    #[serde(default)]
    pub game_image: Option<String>,

    /// Local original game a shared game has been linked to
    #[serde(default)]
    pub linked_game_id: Option<u64>,

    /// Playtime in seconds
    #[serde(default)]
    pub duration: u64,

    pub finished: bool,

    #[serde(default)]
    pub teams: Vec<Team>,

    pub scoresheet: Scoresheet,

    #[serde(default)]
    pub players: Vec<MatchPlayer>,

    #[serde(default)]
    pub location_name: Option<String>,
}

impl PlayerMatch {
    pub fn new(
        record_type: RecordType,
        id: u64,
        date: DateTime<Utc>,
        game_id: u64,
        game_name: &str,
        scoresheet: Scoresheet,
    ) -> Self {
        Self {
            id,
            record_type,
            date,
            name: format!("{} #{}", game_name, id),
            game_id,
            game_name: game_name.to_string(),
            game_image: None,
            linked_game_id: None,
            duration: 0,
            finished: true,
            teams: Vec::new(),
            scoresheet,
            players: Vec::new(),
            location_name: None,
        }
    }

    pub fn key(&self) -> StatKey {
        StatKey::new(self.record_type, self.id)
    }

    pub fn with_player(mut self, player: MatchPlayer) -> Self {
        self.players.push(player);
        self
    }

    pub fn with_team(mut self, id: u64, name: &str) -> Self {
        self.teams.push(Team {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn linked_to(mut self, game_id: u64) -> Self {
        self.linked_game_id = Some(game_id);
        self
    }

    pub fn unfinished(mut self) -> Self {
        self.finished = false;
        self
    }

    /// Find a participant's row.
    pub fn player(&self, key: &StatKey) -> Option<&MatchPlayer> {
        self.players.iter().find(|p| p.key() == *key)
    }

    /// Other players sharing `team_id`.
    pub fn teammates_of<'a>(
        &'a self,
        player: &'a MatchPlayer,
    ) -> impl Iterator<Item = &'a MatchPlayer> + 'a {
        self.players.iter().filter(move |other| {
            player.team_id.is_some()
                && other.team_id == player.team_id
                && other.key() != player.key()
        })
    }

    pub fn team_name(&self, team_id: u64) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.as_str())
    }
}
