//! Bracket generation, result recording and placements.

use super::errors::{BracketError, BracketResult};
use super::models::{BracketMatch, EntrantId, MatchStatus, Placement, Round, SetScore};
use super::seeding::{bracket_size, seed_positions};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Games in a set never exceed a 7-6 or 7-5 tie-break set
const MAX_GAMES_PER_SET: u8 = 7;

/// What changed after a result was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advancement {
    /// Every match of the result's round now has a winner
    pub round_completed: bool,
    /// Round whose slots were filled by this result
    pub populated: Option<Round>,
    /// The final has been played
    pub finished: bool,
}

/// Single-elimination bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    size: usize,
    /// Matches per round, first round first
    rounds: Vec<Vec<BracketMatch>>,
}

impl Bracket {
    /// Generate a bracket for entrants ordered by seed (top seed first).
    ///
    /// The bracket has `size / 2` first-round matches where `size` is the
    /// smallest power of two fitting the entrants. Seeds beyond the entrant
    /// count are byes: their opponent wins the match immediately.
    ///
    /// # Errors
    ///
    /// * `BracketError::TooFewEntrants` / `TooManyEntrants` - outside 2..=32
    /// * `BracketError::DuplicateEntrant` - an entrant listed twice
    pub fn generate(entrants: &[EntrantId]) -> BracketResult<Self> {
        let size = bracket_size(entrants.len())?;

        let mut seen = HashSet::with_capacity(entrants.len());
        for &entrant in entrants {
            if !seen.insert(entrant) {
                return Err(BracketError::DuplicateEntrant(entrant));
            }
        }

        let first_round = Round::with_matches(size / 2)
            .ok_or_else(|| BracketError::Malformed(format!("no round for size {size}")))?;

        let opening: Vec<BracketMatch> = seed_positions(size)
            .chunks(2)
            .enumerate()
            .map(|(index, seeds)| {
                let mut m = BracketMatch::pending(first_round, index as u32 + 1);
                m.competitor1 = entrants.get(seeds[0] - 1).copied();
                m.competitor2 = entrants.get(seeds[1] - 1).copied();
                if let (Some(entrant), None) | (None, Some(entrant)) = (m.competitor1, m.competitor2)
                {
                    m.winner = Some(entrant);
                    m.status = MatchStatus::Completed;
                }
                m
            })
            .collect();

        let mut rounds = vec![opening];
        let mut round = first_round;
        while let Some(next) = round.next() {
            rounds.push(
                (1..=next.match_count() as u32)
                    .map(|number| BracketMatch::pending(next, number))
                    .collect(),
            );
            round = next;
        }

        let mut bracket = Self { size, rounds };
        bracket.populate_ready_rounds();
        Ok(bracket)
    }

    /// Rebuild a bracket from persisted matches.
    ///
    /// # Errors
    ///
    /// * `BracketError::Malformed` - rounds missing, wrong match counts or numbering
    pub fn from_matches(matches: Vec<BracketMatch>) -> BracketResult<Self> {
        let mut by_round: BTreeMap<Round, Vec<BracketMatch>> = BTreeMap::new();
        for m in matches {
            by_round.entry(m.round).or_default().push(m);
        }

        let first_round = *by_round
            .keys()
            .next()
            .ok_or_else(|| BracketError::Malformed("no matches".to_string()))?;

        let mut rounds = Vec::with_capacity(by_round.len());
        let mut expected = Some(first_round);
        for (round, mut matches) in by_round {
            if Some(round) != expected {
                return Err(BracketError::Malformed(format!(
                    "unexpected round {round} after {}",
                    rounds.len()
                )));
            }
            matches.sort_by_key(|m| m.match_number);
            if matches.len() != round.match_count() {
                return Err(BracketError::Malformed(format!(
                    "{round} has {} matches, expected {}",
                    matches.len(),
                    round.match_count()
                )));
            }
            if matches
                .iter()
                .enumerate()
                .any(|(index, m)| m.match_number != index as u32 + 1)
            {
                return Err(BracketError::Malformed(format!("{round} numbering has gaps")));
            }
            rounds.push(matches);
            expected = round.next();
        }

        if expected.is_some() {
            return Err(BracketError::Malformed("final is missing".to_string()));
        }

        Ok(Self {
            size: first_round.match_count() * 2,
            rounds,
        })
    }

    /// Number of seed lines (a power of two)
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn first_round(&self) -> Round {
        self.rounds[0][0].round
    }

    /// Matches grouped per round, first round first
    pub fn rounds(&self) -> &[Vec<BracketMatch>] {
        &self.rounds
    }

    /// All matches, first round first
    pub fn matches(&self) -> impl Iterator<Item = &BracketMatch> {
        self.rounds.iter().flatten()
    }

    pub fn get(&self, round: Round, match_number: u32) -> Option<&BracketMatch> {
        self.round_index(round)
            .and_then(|index| self.rounds[index].get(match_number.checked_sub(1)? as usize))
    }

    /// Entrants placed in the first round
    pub fn entrants(&self) -> Vec<EntrantId> {
        self.rounds[0]
            .iter()
            .flat_map(|m| [m.competitor1, m.competitor2])
            .flatten()
            .collect()
    }

    /// Number of first-round byes
    pub fn bye_count(&self) -> usize {
        self.rounds[0].iter().filter(|m| m.is_bye()).count()
    }

    /// Earliest round that still has a match without a result
    pub fn current_round(&self) -> Option<Round> {
        self.rounds
            .iter()
            .find(|matches| matches.iter().any(|m| !m.is_completed()))
            .map(|matches| matches[0].round)
    }

    pub fn is_finished(&self) -> bool {
        self.rounds
            .last()
            .and_then(|last| last.first())
            .is_some_and(BracketMatch::is_completed)
    }

    pub fn champion(&self) -> Option<EntrantId> {
        self.rounds
            .last()
            .and_then(|last| last.first())
            .filter(|m| m.is_completed())
            .and_then(|m| m.winner)
    }

    /// Record the result of a match.
    ///
    /// `sets` are given from slot 1's perspective. When this result completes
    /// its round, the winners are moved into the next round's slots.
    ///
    /// # Errors
    ///
    /// * `BracketError::MatchNotFound` - no such round or match number
    /// * `BracketError::AlreadyCompleted` - result already recorded (byes included)
    /// * `BracketError::CompetitorsPending` - a slot is still empty
    /// * `BracketError::WinnerNotInMatch` - winner is not one of the two competitors
    /// * `BracketError::InvalidSets` - set scores inconsistent with the winner
    pub fn record_result(
        &mut self,
        round: Round,
        match_number: u32,
        winner: EntrantId,
        sets: &[SetScore],
    ) -> BracketResult<Advancement> {
        let not_found = BracketError::MatchNotFound {
            round,
            match_number,
        };
        let round_index = self.round_index(round).ok_or(not_found.clone())?;
        let m = match_number
            .checked_sub(1)
            .and_then(|index| self.rounds[round_index].get_mut(index as usize))
            .ok_or(not_found)?;

        if m.is_completed() {
            return Err(BracketError::AlreadyCompleted {
                round,
                match_number,
            });
        }

        let (Some(competitor1), Some(competitor2)) = (m.competitor1, m.competitor2) else {
            return Err(BracketError::CompetitorsPending {
                round,
                match_number,
            });
        };

        let winner_is_first = if winner == competitor1 {
            true
        } else if winner == competitor2 {
            false
        } else {
            return Err(BracketError::WinnerNotInMatch { winner });
        };

        validate_sets(sets, winner_is_first)?;

        m.winner = Some(winner);
        m.sets = sets.to_vec();
        m.status = MatchStatus::Completed;

        let round_completed = self.rounds[round_index]
            .iter()
            .all(BracketMatch::is_completed);
        let populated = self.populate_ready_rounds();

        Ok(Advancement {
            round_completed,
            populated,
            finished: self.is_finished(),
        })
    }

    /// One placement per entrant once the final is played, deepest first.
    ///
    /// # Errors
    ///
    /// * `BracketError::NotFinished` - the final has no result yet
    pub fn placements(&self) -> BracketResult<Vec<(EntrantId, Placement)>> {
        let champion = self.champion().ok_or(BracketError::NotFinished)?;

        let mut placements = vec![(champion, Placement::Champion)];
        for matches in self.rounds.iter().rev() {
            for m in matches {
                if let Some(loser) = m.loser() {
                    placements.push((loser, m.round.loser_placement()));
                }
            }
        }
        Ok(placements)
    }

    fn round_index(&self, round: Round) -> Option<usize> {
        self.rounds
            .iter()
            .position(|matches| matches.first().is_some_and(|m| m.round == round))
    }

    /// Fill the next round from every fully resolved round whose successor
    /// is still empty. Returns the last round populated.
    fn populate_ready_rounds(&mut self) -> Option<Round> {
        let mut populated = None;
        for index in 0..self.rounds.len().saturating_sub(1) {
            let resolved = self.rounds[index].iter().all(BracketMatch::is_completed);
            let empty = self.rounds[index + 1]
                .iter()
                .all(|m| m.competitor1.is_none() && m.competitor2.is_none());
            if !resolved || !empty {
                continue;
            }

            let winners: Vec<Option<EntrantId>> =
                self.rounds[index].iter().map(|m| m.winner).collect();
            let next = &mut self.rounds[index + 1];
            for (position, winner) in winners.into_iter().enumerate() {
                let slot = &mut next[position / 2];
                if position % 2 == 0 {
                    slot.competitor1 = winner;
                } else {
                    slot.competitor2 = winner;
                }
            }
            populated = Some(next[0].round);
        }
        populated
    }
}

/// Best of three sets; the winner takes two.
fn validate_sets(sets: &[SetScore], winner_is_first: bool) -> BracketResult<()> {
    if !(2..=3).contains(&sets.len()) {
        return Err(BracketError::InvalidSets(format!(
            "a match has two or three sets, got {}",
            sets.len()
        )));
    }

    let mut won_by_winner = 0;
    for (index, set) in sets.iter().enumerate() {
        if set.competitor1 == set.competitor2 {
            return Err(BracketError::InvalidSets(format!("set {} is tied", index + 1)));
        }
        if set.competitor1.max(set.competitor2) > MAX_GAMES_PER_SET {
            return Err(BracketError::InvalidSets(format!(
                "set {} has more than {MAX_GAMES_PER_SET} games for one side",
                index + 1
            )));
        }
        if (set.competitor1 > set.competitor2) == winner_is_first {
            won_by_winner += 1;
        }
    }

    if won_by_winner != 2 {
        return Err(BracketError::InvalidSets(
            "the winner must take two sets".to_string(),
        ));
    }

    if sets.len() == 3 {
        let first_two_same_side =
            (sets[0].competitor1 > sets[0].competitor2) == (sets[1].competitor1 > sets[1].competitor2);
        if first_two_same_side {
            return Err(BracketError::InvalidSets(
                "third set recorded after the match was decided".to_string(),
            ));
        }
    }

    Ok(())
}
