//! Tournament data models: tournaments, registrations, matches and results.

use super::errors::{TournamentError, TournamentResult};
use crate::auth::UserId;
use crate::bracket::{
    BracketMatch, EntrantId, MAX_ENTRANTS, MIN_ENTRANTS, MatchStatus, Placement, Round,
    SeedingPolicy, SetScore,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, postgres::PgRow};
use std::{fmt, str::FromStr};

/// Tournament ID type
pub type TournamentId = i64;

/// Registration ID type; a registration is a bracket entrant
pub type RegistrationId = EntrantId;

/// Match ID type
pub type MatchId = i64;

/// Label shown for an empty first-round slot
pub const BYE_LABEL: &str = "BYE";

/// Label shown for a slot waiting on an earlier match
pub const TBD_LABEL: &str = "TBD";

pub(crate) const TOURNAMENT_COLUMNS: &str = "id, name, category, date, capacity, \
    current_registrations, status, description, seeding, created_at, started_at, finished_at";

/// Tournament lifecycle: open -> closed -> in_progress -> finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting registrations
    Open,
    /// Registrations closed, bracket not generated yet
    Closed,
    /// Bracket generated, results being recorded
    InProgress,
    /// Final played, points awarded
    Finished,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Open => "open",
            TournamentStatus::Closed => "closed",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Finished => "finished",
        }
    }

    /// Bracket not generated yet
    pub fn is_before_play(self) -> bool {
        matches!(self, TournamentStatus::Open | TournamentStatus::Closed)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TournamentStatus::Open),
            "closed" => Ok(TournamentStatus::Closed),
            "in_progress" => Ok(TournamentStatus::InProgress),
            "finished" => Ok(TournamentStatus::Finished),
            other => Err(TournamentError::InvalidInput(format!(
                "Unknown tournament status: {other}"
            ))),
        }
    }
}

/// Tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Free-text category such as `4ta`
    pub category: String,
    pub date: NaiveDate,
    /// Maximum number of entrants
    pub capacity: i32,
    pub current_registrations: i32,
    pub status: TournamentStatus,
    pub description: Option<String>,
    /// Policy used when the bracket was generated
    pub seeding: Option<SeedingPolicy>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Tournament {
    pub fn is_full(&self) -> bool {
        self.current_registrations >= self.capacity
    }

    pub(crate) fn from_row(row: &PgRow) -> TournamentResult<Self> {
        Ok(Self {
            id: row.get("id"),
            name: row.get("name"),
            category: row.get("category"),
            date: row.get("date"),
            capacity: row.get("capacity"),
            current_registrations: row.get("current_registrations"),
            status: row.get::<String, _>("status").parse()?,
            description: row.get("description"),
            seeding: row
                .get::<Option<String>, _>("seeding")
                .and_then(|s| s.parse().ok()),
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            started_at: row
                .get::<Option<chrono::NaiveDateTime>, _>("started_at")
                .map(|dt| dt.and_utc()),
            finished_at: row
                .get::<Option<chrono::NaiveDateTime>, _>("finished_at")
                .map(|dt| dt.and_utc()),
        })
    }
}

/// New tournament request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub category: String,
    pub date: NaiveDate,
    pub capacity: i32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial tournament update; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub capacity: Option<i32>,
    /// Only `open` and `closed` can be set here
    pub status: Option<TournamentStatus>,
    pub description: Option<String>,
}

impl TournamentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.capacity.is_none()
            && self.status.is_none()
            && self.description.is_none()
    }
}

/// Capacity must be a bracket size: a power of two between 2 and 32
///
/// # Errors
///
/// * `TournamentError::InvalidInput` - any other value
pub fn validate_capacity(capacity: i32) -> TournamentResult<()> {
    let valid = usize::try_from(capacity)
        .map(|c| (MIN_ENTRANTS..=MAX_ENTRANTS).contains(&c) && c.is_power_of_two())
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(TournamentError::InvalidInput(format!(
            "Capacity must be 2, 4, 8, 16 or 32, got {capacity}"
        )))
    }
}

/// A tournament entry: one player, or a pair when `partner_id` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub tournament_id: TournamentId,
    pub user_id: UserId,
    pub partner_id: Option<UserId>,
    /// Player name, or `"A / B"` for a pair
    pub display_name: String,
    pub registered_at: DateTime<Utc>,
}

/// A persisted match with competitor names resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round: Round,
    pub match_number: u32,
    pub competitor1_id: Option<RegistrationId>,
    pub competitor1_name: String,
    pub competitor2_id: Option<RegistrationId>,
    pub competitor2_name: String,
    pub winner_id: Option<RegistrationId>,
    pub winner_name: Option<String>,
    pub sets: Vec<SetScore>,
    pub status: MatchStatus,
}

impl MatchRecord {
    /// Attach display names to an engine match. `name` resolves registration IDs.
    pub fn from_bracket_match(
        id: MatchId,
        tournament_id: TournamentId,
        m: &BracketMatch,
        name: impl Fn(RegistrationId) -> String,
    ) -> Self {
        let slot_name = |slot: Option<RegistrationId>| match slot {
            Some(entrant) => name(entrant),
            None if m.is_bye() => BYE_LABEL.to_string(),
            None => TBD_LABEL.to_string(),
        };

        Self {
            id,
            tournament_id,
            round: m.round,
            match_number: m.match_number,
            competitor1_id: m.competitor1,
            competitor1_name: slot_name(m.competitor1),
            competitor2_id: m.competitor2,
            competitor2_name: slot_name(m.competitor2),
            winner_id: m.winner,
            winner_name: m.winner.map(&name),
            sets: m.sets.clone(),
            status: m.status,
        }
    }
}

/// Matches grouped by round label, each ordered by match number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketView {
    pub round_of_32: Vec<MatchRecord>,
    pub round_of_16: Vec<MatchRecord>,
    pub quarterfinals: Vec<MatchRecord>,
    pub semifinals: Vec<MatchRecord>,
    #[serde(rename = "final")]
    pub final_round: Vec<MatchRecord>,
}

impl BracketView {
    pub fn from_matches(matches: impl IntoIterator<Item = MatchRecord>) -> Self {
        let mut view = Self::default();
        for m in matches {
            view.round_mut(m.round).push(m);
        }
        for round in Round::ALL {
            view.round_mut(round).sort_by_key(|m| m.match_number);
        }
        view
    }

    pub fn round(&self, round: Round) -> &[MatchRecord] {
        match round {
            Round::RoundOf32 => &self.round_of_32,
            Round::RoundOf16 => &self.round_of_16,
            Round::Quarterfinals => &self.quarterfinals,
            Round::Semifinals => &self.semifinals,
            Round::Final => &self.final_round,
        }
    }

    fn round_mut(&mut self, round: Round) -> &mut Vec<MatchRecord> {
        match round {
            Round::RoundOf32 => &mut self.round_of_32,
            Round::RoundOf16 => &mut self.round_of_16,
            Round::Quarterfinals => &mut self.quarterfinals,
            Round::Semifinals => &mut self.semifinals,
            Round::Final => &mut self.final_round,
        }
    }

    pub fn is_empty(&self) -> bool {
        Round::ALL.iter().all(|&round| self.round(round).is_empty())
    }
}

/// Match result as entered by an admin. Scores are from slot 1's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub set1_player1: u8,
    pub set1_player2: u8,
    pub set2_player1: u8,
    pub set2_player2: u8,
    #[serde(default)]
    pub set3_player1: Option<u8>,
    #[serde(default)]
    pub set3_player2: Option<u8>,
    /// Registration ID of the winning entrant
    pub winner_id: RegistrationId,
}

impl MatchResult {
    /// Played sets; a third set needs both of its scores
    pub fn sets(&self) -> TournamentResult<Vec<SetScore>> {
        let mut sets = vec![
            SetScore::new(self.set1_player1, self.set1_player2),
            SetScore::new(self.set2_player1, self.set2_player2),
        ];
        match (self.set3_player1, self.set3_player2) {
            (Some(a), Some(b)) => sets.push(SetScore::new(a, b)),
            (None, None) => {}
            _ => {
                return Err(TournamentError::InvalidInput(
                    "Third set needs a score for both sides".to_string(),
                ));
            }
        }
        Ok(sets)
    }
}

/// Points credited to one user when a tournament finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsAward {
    pub user_id: UserId,
    pub registration_id: RegistrationId,
    pub placement: Placement,
    pub points: i32,
}

/// What happened after a result was recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultOutcome {
    pub match_id: MatchId,
    pub winner_id: RegistrationId,
    pub winner: String,
    pub round_completed: bool,
    /// Round whose competitors were filled in by this result
    pub next_round: Option<Round>,
    pub tournament_finished: bool,
    /// Awards made when the final was played; empty otherwise
    pub awards: Vec<PointsAward>,
}

/// Summary of a freshly generated bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSummary {
    pub tournament_id: TournamentId,
    pub seeding: SeedingPolicy,
    pub entrants: usize,
    pub bracket_size: usize,
    pub first_round: Round,
    pub matches: usize,
    pub byes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_capacity() {
        for capacity in [2, 4, 8, 16, 32] {
            assert!(validate_capacity(capacity).is_ok());
        }
        for capacity in [-8, 0, 1, 3, 6, 12, 64] {
            assert!(validate_capacity(capacity).is_err(), "{capacity}");
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TournamentStatus::Open,
            TournamentStatus::Closed,
            TournamentStatus::InProgress,
            TournamentStatus::Finished,
        ] {
            assert_eq!(status.as_str().parse::<TournamentStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<TournamentStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&TournamentStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_match_result_sets() {
        let mut result = MatchResult {
            set1_player1: 6,
            set1_player2: 4,
            set2_player1: 3,
            set2_player2: 6,
            set3_player1: None,
            set3_player2: None,
            winner_id: 1,
        };
        assert_eq!(result.sets().unwrap().len(), 2);

        result.set3_player1 = Some(7);
        result.set3_player2 = Some(5);
        assert_eq!(result.sets().unwrap()[2], SetScore::new(7, 5));
    }

    #[test]
    fn test_half_filled_third_set_rejected() {
        let mut result = MatchResult {
            set1_player1: 6,
            set1_player2: 4,
            set2_player1: 6,
            set2_player2: 3,
            set3_player1: Some(7),
            set3_player2: None,
            winner_id: 1,
        };
        assert!(matches!(result.sets(), Err(TournamentError::InvalidInput(_))));

        result.set3_player1 = None;
        result.set3_player2 = Some(6);
        assert!(matches!(result.sets(), Err(TournamentError::InvalidInput(_))));
    }

    #[test]
    fn test_match_record_slot_labels() {
        let mut bye = BracketMatch::pending(Round::Quarterfinals, 1);
        bye.competitor1 = Some(5);
        bye.winner = Some(5);
        bye.status = MatchStatus::Completed;

        let record = MatchRecord::from_bracket_match(10, 1, &bye, |id| format!("Entrant {id}"));
        assert_eq!(record.competitor1_name, "Entrant 5");
        assert_eq!(record.competitor2_name, BYE_LABEL);
        assert_eq!(record.winner_name.as_deref(), Some("Entrant 5"));

        let waiting = BracketMatch::pending(Round::Semifinals, 1);
        let record = MatchRecord::from_bracket_match(11, 1, &waiting, |id| format!("Entrant {id}"));
        assert_eq!(record.competitor1_name, TBD_LABEL);
        assert_eq!(record.competitor2_name, TBD_LABEL);
    }

    #[test]
    fn test_bracket_view_groups_and_orders() {
        let record = |round: Round, number: u32| {
            MatchRecord::from_bracket_match(
                number as i64,
                1,
                &BracketMatch::pending(round, number),
                |id| id.to_string(),
            )
        };
        let view = BracketView::from_matches(vec![
            record(Round::Semifinals, 2),
            record(Round::Final, 1),
            record(Round::Semifinals, 1),
        ]);

        let numbers: Vec<u32> = view.semifinals.iter().map(|m| m.match_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(view.final_round.len(), 1);
        assert!(view.quarterfinals.is_empty());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("final").is_some());
        assert!(json.get("round_of_16").is_some());
    }
}
