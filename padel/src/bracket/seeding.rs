//! Bracket sizing and seed placement.

use super::errors::{BracketError, BracketResult};
use super::models::{EntrantId, MAX_ENTRANTS, MIN_ENTRANTS};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How entrants are ordered before they are placed on seed lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingPolicy {
    /// Random draw
    #[default]
    Random,
    /// Highest ranking points get the top seeds
    Ranking,
}

impl SeedingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SeedingPolicy::Random => "random",
            SeedingPolicy::Ranking => "ranking",
        }
    }

    /// Order `(entrant, ranking points)` pairs by this policy, top seed first
    pub fn order(self, entrants: &[(EntrantId, i64)]) -> Vec<EntrantId> {
        match self {
            SeedingPolicy::Random => {
                let mut ids: Vec<EntrantId> = entrants.iter().map(|(id, _)| *id).collect();
                ids.shuffle(&mut rand::rng());
                ids
            }
            SeedingPolicy::Ranking => order_by_points(entrants),
        }
    }
}

impl FromStr for SeedingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(SeedingPolicy::Random),
            "ranking" => Ok(SeedingPolicy::Ranking),
            other => Err(format!("unknown seeding policy: {other}")),
        }
    }
}

/// Smallest power of two that fits `entrants`
///
/// # Errors
///
/// * `BracketError::TooFewEntrants` - fewer than 2 entrants
/// * `BracketError::TooManyEntrants` - more than 32 entrants
pub fn bracket_size(entrants: usize) -> BracketResult<usize> {
    if entrants < MIN_ENTRANTS {
        return Err(BracketError::TooFewEntrants {
            min: MIN_ENTRANTS,
            actual: entrants,
        });
    }
    if entrants > MAX_ENTRANTS {
        return Err(BracketError::TooManyEntrants {
            max: MAX_ENTRANTS,
            actual: entrants,
        });
    }
    Ok(entrants.next_power_of_two())
}

/// Standard seed order for a bracket of `size` lines.
///
/// Consecutive pairs of the returned list are first-round opponents. Seed 1
/// meets seed `size`, seed 2 meets seed `size - 1`, and the two top seeds sit
/// in opposite halves.
///
/// ```
/// use padel::bracket::seed_positions;
///
/// assert_eq!(seed_positions(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
/// ```
pub fn seed_positions(size: usize) -> Vec<usize> {
    let mut positions = vec![1];
    while positions.len() < size {
        let lines = positions.len() * 2;
        positions = positions
            .iter()
            .flat_map(|&seed| [seed, lines + 1 - seed])
            .collect();
    }
    positions
}

/// Order entrants by ranking points, highest first.
///
/// Ties keep their input order (registration order).
pub fn order_by_points(entrants: &[(EntrantId, i64)]) -> Vec<EntrantId> {
    let mut ranked = entrants.to_vec();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_size_rounds_up() {
        assert_eq!(bracket_size(2).unwrap(), 2);
        assert_eq!(bracket_size(3).unwrap(), 4);
        assert_eq!(bracket_size(5).unwrap(), 8);
        assert_eq!(bracket_size(16).unwrap(), 16);
        assert_eq!(bracket_size(17).unwrap(), 32);
    }

    #[test]
    fn test_bracket_size_limits() {
        assert_eq!(
            bracket_size(1),
            Err(BracketError::TooFewEntrants { min: 2, actual: 1 })
        );
        assert_eq!(
            bracket_size(33),
            Err(BracketError::TooManyEntrants { max: 32, actual: 33 })
        );
    }

    #[test]
    fn test_seed_positions_small() {
        assert_eq!(seed_positions(2), vec![1, 2]);
        assert_eq!(seed_positions(4), vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_seed_positions_pair_to_size_plus_one() {
        for size in [2, 4, 8, 16, 32] {
            let positions = seed_positions(size);
            assert_eq!(positions.len(), size);
            for pair in positions.chunks(2) {
                assert_eq!(pair[0] + pair[1], size + 1);
            }
        }
    }

    #[test]
    fn test_top_seeds_in_opposite_halves() {
        let positions = seed_positions(16);
        let (top, bottom) = positions.split_at(8);
        assert!(top.contains(&1));
        assert!(bottom.contains(&2));
    }

    #[test]
    fn test_order_by_points_is_stable() {
        let ordered = order_by_points(&[(1, 100), (2, 600), (3, 100), (4, 0)]);
        assert_eq!(ordered, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_random_order_keeps_every_entrant() {
        let entrants: Vec<(EntrantId, i64)> = (1..=8).map(|id| (id, 0)).collect();
        let mut ordered = SeedingPolicy::Random.order(&entrants);
        ordered.sort();
        assert_eq!(ordered, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeding_policy_parse() {
        assert_eq!("ranking".parse::<SeedingPolicy>(), Ok(SeedingPolicy::Ranking));
        assert!("elo".parse::<SeedingPolicy>().is_err());
        assert_eq!(SeedingPolicy::default(), SeedingPolicy::Random);
    }
}
