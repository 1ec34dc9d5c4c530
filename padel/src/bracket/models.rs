//! Bracket data models: rounds, placements, set scores and matches.

use super::errors::BracketError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Entrant ID type (a tournament registration: one player or a pair)
pub type EntrantId = i64;

/// Smallest number of entrants that can play a bracket
pub const MIN_ENTRANTS: usize = 2;

/// Largest number of entrants a bracket holds
pub const MAX_ENTRANTS: usize = 32;

/// APA points for winning the tournament
pub const CHAMPION_POINTS: i32 = 1000;
/// APA points for losing the final
pub const FINALIST_POINTS: i32 = 600;
/// APA points for losing a semifinal
pub const SEMIFINALIST_POINTS: i32 = 360;
/// APA points for losing a quarterfinal
pub const QUARTERFINALIST_POINTS: i32 = 180;
/// APA points for losing in the round of 16
pub const ROUND_OF_16_POINTS: i32 = 90;

/// Elimination round, deepest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    #[serde(rename = "round_of_32")]
    RoundOf32,
    #[serde(rename = "round_of_16")]
    RoundOf16,
    #[serde(rename = "quarterfinals")]
    Quarterfinals,
    #[serde(rename = "semifinals")]
    Semifinals,
    #[serde(rename = "final")]
    Final,
}

impl Round {
    /// Every round, deepest first
    pub const ALL: [Round; 5] = [
        Round::RoundOf32,
        Round::RoundOf16,
        Round::Quarterfinals,
        Round::Semifinals,
        Round::Final,
    ];

    /// Round that is played with `count` matches
    pub fn with_matches(count: usize) -> Option<Round> {
        match count {
            16 => Some(Round::RoundOf32),
            8 => Some(Round::RoundOf16),
            4 => Some(Round::Quarterfinals),
            2 => Some(Round::Semifinals),
            1 => Some(Round::Final),
            _ => None,
        }
    }

    /// Number of matches played in this round
    pub fn match_count(self) -> usize {
        match self {
            Round::RoundOf32 => 16,
            Round::RoundOf16 => 8,
            Round::Quarterfinals => 4,
            Round::Semifinals => 2,
            Round::Final => 1,
        }
    }

    /// Round that winners advance to
    pub fn next(self) -> Option<Round> {
        match self {
            Round::RoundOf32 => Some(Round::RoundOf16),
            Round::RoundOf16 => Some(Round::Quarterfinals),
            Round::Quarterfinals => Some(Round::Semifinals),
            Round::Semifinals => Some(Round::Final),
            Round::Final => None,
        }
    }

    /// Placement of an entrant eliminated in this round
    pub fn loser_placement(self) -> Placement {
        match self {
            Round::RoundOf32 => Placement::RoundOf32,
            Round::RoundOf16 => Placement::RoundOf16,
            Round::Quarterfinals => Placement::Quarterfinalist,
            Round::Semifinals => Placement::Semifinalist,
            Round::Final => Placement::Finalist,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Round::RoundOf32 => "round_of_32",
            Round::RoundOf16 => "round_of_16",
            Round::Quarterfinals => "quarterfinals",
            Round::Semifinals => "semifinals",
            Round::Final => "final",
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Round {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Round::ALL
            .into_iter()
            .find(|round| round.as_str() == s)
            .ok_or_else(|| BracketError::UnknownRound(s.to_string()))
    }
}

/// Deepest stage an entrant reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Champion,
    Finalist,
    Semifinalist,
    Quarterfinalist,
    #[serde(rename = "round_of_16")]
    RoundOf16,
    #[serde(rename = "round_of_32")]
    RoundOf32,
}

impl Placement {
    /// APA points awarded for this placement
    pub fn points(self) -> i32 {
        match self {
            Placement::Champion => CHAMPION_POINTS,
            Placement::Finalist => FINALIST_POINTS,
            Placement::Semifinalist => SEMIFINALIST_POINTS,
            Placement::Quarterfinalist => QUARTERFINALIST_POINTS,
            Placement::RoundOf16 => ROUND_OF_16_POINTS,
            Placement::RoundOf32 => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Champion => "champion",
            Placement::Finalist => "finalist",
            Placement::Semifinalist => "semifinalist",
            Placement::Quarterfinalist => "quarterfinalist",
            Placement::RoundOf16 => "round_of_16",
            Placement::RoundOf32 => "round_of_32",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Placement::Champion,
            Placement::Finalist,
            Placement::Semifinalist,
            Placement::Quarterfinalist,
            Placement::RoundOf16,
            Placement::RoundOf32,
        ]
        .into_iter()
        .find(|placement| placement.as_str() == s)
        .ok_or_else(|| BracketError::UnknownPlacement(s.to_string()))
    }
}

/// Games won by each side in one set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    /// Games won by the competitor in slot 1
    pub competitor1: u8,
    /// Games won by the competitor in slot 2
    pub competitor2: u8,
}

impl SetScore {
    pub fn new(competitor1: u8, competitor2: u8) -> Self {
        Self {
            competitor1,
            competitor2,
        }
    }
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for a result (or for competitors)
    Pending,
    /// Winner known
    Completed,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Completed => "completed",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(BracketError::UnknownStatus(other.to_string())),
        }
    }
}

/// One match of the bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub round: Round,
    /// 1-based position within the round
    pub match_number: u32,
    pub competitor1: Option<EntrantId>,
    pub competitor2: Option<EntrantId>,
    pub winner: Option<EntrantId>,
    pub sets: Vec<SetScore>,
    pub status: MatchStatus,
}

impl BracketMatch {
    /// Empty match waiting for competitors
    pub fn pending(round: Round, match_number: u32) -> Self {
        Self {
            round,
            match_number,
            competitor1: None,
            competitor2: None,
            winner: None,
            sets: Vec::new(),
            status: MatchStatus::Pending,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Completed without being played because one slot is a bye
    pub fn is_bye(&self) -> bool {
        self.is_completed() && self.competitor1.is_some() != self.competitor2.is_some()
    }

    pub fn has_competitor(&self, entrant: EntrantId) -> bool {
        self.competitor1 == Some(entrant) || self.competitor2 == Some(entrant)
    }

    /// Entrant eliminated by this match, if it was played
    pub fn loser(&self) -> Option<EntrantId> {
        if !self.is_completed() {
            return None;
        }
        match (self.competitor1, self.competitor2, self.winner) {
            (Some(a), Some(b), Some(w)) if w == a => Some(b),
            (Some(a), Some(b), Some(w)) if w == b => Some(a),
            _ => None,
        }
    }
}
