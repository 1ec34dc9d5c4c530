/// Property-based tests for the bracket engine using proptest
///
/// Brackets are generated for arbitrary entrant counts and played out with
/// arbitrary winners; the structural guarantees must hold every time.
use padel::bracket::{
    Bracket, BracketError, EntrantId, MAX_ENTRANTS, MIN_ENTRANTS, Placement, Round, SetScore,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

// Registration IDs are arbitrary positive numbers, not 1..=n
fn entrants_strategy() -> impl Strategy<Value = Vec<EntrantId>> {
    prop::collection::hash_set(1i64..10_000, MIN_ENTRANTS..=MAX_ENTRANTS)
        .prop_map(|set| set.into_iter().collect())
}

// Straight sets from slot 1's perspective
fn sets_for(first_wins: bool) -> Vec<SetScore> {
    if first_wins {
        vec![SetScore::new(6, 4), SetScore::new(6, 3)]
    } else {
        vec![SetScore::new(4, 6), SetScore::new(3, 6)]
    }
}

/// Play every match, picking slot 1 or slot 2 from `choices` in turn.
/// Returns the current round observed after each result.
fn play_out(bracket: &mut Bracket, choices: &[bool]) -> Vec<Option<Round>> {
    let mut observed = vec![bracket.current_round()];
    let mut turn = 0;

    while let Some(round) = bracket.current_round() {
        let playable: Vec<(u32, EntrantId, EntrantId)> = bracket
            .matches()
            .filter(|m| m.round == round && !m.is_completed())
            .filter_map(|m| Some((m.match_number, m.competitor1?, m.competitor2?)))
            .collect();
        assert!(!playable.is_empty(), "round {round} has nothing playable");

        for (match_number, competitor1, competitor2) in playable {
            let first_wins = choices.get(turn % choices.len().max(1)).copied().unwrap_or(true);
            turn += 1;
            let winner = if first_wins { competitor1 } else { competitor2 };
            bracket
                .record_result(round, match_number, winner, &sets_for(first_wins))
                .unwrap();
            observed.push(bracket.current_round());
        }
    }
    observed
}

fn round_position(round: Option<Round>) -> usize {
    round.map_or(Round::ALL.len(), |r| {
        Round::ALL.iter().position(|&x| x == r).unwrap()
    })
}

proptest! {
    #[test]
    fn test_power_of_two_brackets_have_full_rounds(exponent in 1u32..=5) {
        let capacity = 1usize << exponent;
        let entrants: Vec<EntrantId> = (1..=capacity as i64).collect();
        let bracket = Bracket::generate(&entrants).unwrap();

        prop_assert_eq!(bracket.rounds().len(), exponent as usize);
        for (index, matches) in bracket.rounds().iter().enumerate() {
            prop_assert_eq!(matches.len(), capacity >> (index + 1));
        }
        prop_assert_eq!(bracket.bye_count(), 0);
        prop_assert_eq!(bracket.rounds().last().unwrap()[0].round, Round::Final);
    }

    #[test]
    fn test_every_entrant_placed_once_with_at_most_one_bye(entrants in entrants_strategy()) {
        let bracket = Bracket::generate(&entrants).unwrap();

        prop_assert!(bracket.size().is_power_of_two());
        prop_assert!(bracket.size() >= entrants.len());
        prop_assert!(bracket.size() < entrants.len() * 2);
        prop_assert_eq!(bracket.bye_count(), bracket.size() - entrants.len());

        let mut placed = bracket.entrants();
        placed.sort_unstable();
        let mut expected = entrants.clone();
        expected.sort_unstable();
        prop_assert_eq!(placed, expected);

        let mut byes: HashMap<EntrantId, usize> = HashMap::new();
        for m in bracket.matches().filter(|m| m.is_bye()) {
            prop_assert_eq!(m.round, bracket.first_round());
            *byes.entry(m.winner.unwrap()).or_default() += 1;
        }
        prop_assert!(byes.values().all(|&count| count == 1));
    }

    #[test]
    fn test_winner_outside_match_rejected(entrants in entrants_strategy()) {
        let mut bracket = Bracket::generate(&entrants).unwrap();
        let outsider = entrants.iter().max().unwrap() + 1;
        let target = bracket
            .matches()
            .find(|m| !m.is_completed() && m.competitor1.is_some() && m.competitor2.is_some())
            .map(|m| (m.round, m.match_number))
            .unwrap();
        let before = bracket.clone();

        let err = bracket
            .record_result(target.0, target.1, outsider, &sets_for(true))
            .unwrap_err();

        prop_assert_eq!(err, BracketError::WinnerNotInMatch { winner: outsider });
        prop_assert_eq!(bracket, before);
    }

    #[test]
    fn test_placements_match_deepest_round(
        entrants in entrants_strategy(),
        choices in prop::collection::vec(any::<bool>(), 1..64),
    ) {
        let mut bracket = Bracket::generate(&entrants).unwrap();
        play_out(&mut bracket, &choices);
        prop_assert!(bracket.is_finished());

        let placements = bracket.placements().unwrap();
        prop_assert_eq!(placements.len(), entrants.len());

        let unique: HashSet<EntrantId> = placements.iter().map(|(e, _)| *e).collect();
        prop_assert_eq!(unique.len(), entrants.len());

        let count = |p: Placement| placements.iter().filter(|(_, x)| *x == p).count();
        prop_assert_eq!(count(Placement::Champion), 1);
        prop_assert_eq!(count(Placement::Finalist), 1);

        for (entrant, placement) in &placements {
            let deepest = bracket
                .matches()
                .filter(|m| m.has_competitor(*entrant))
                .map(|m| m.round)
                .max()
                .unwrap();
            let expected = if Some(*entrant) == bracket.champion() {
                Placement::Champion
            } else {
                deepest.loser_placement()
            };
            prop_assert_eq!(*placement, expected);
        }
    }

    #[test]
    fn test_round_progression_is_monotonic(
        entrants in entrants_strategy(),
        choices in prop::collection::vec(any::<bool>(), 1..64),
    ) {
        let mut bracket = Bracket::generate(&entrants).unwrap();
        let observed = play_out(&mut bracket, &choices);

        let positions: Vec<usize> = observed.into_iter().map(round_position).collect();
        prop_assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(*positions.last().unwrap(), Round::ALL.len());
    }

    #[test]
    fn test_later_rounds_wait_for_previous_round(entrants in entrants_strategy()) {
        let bracket = Bracket::generate(&entrants).unwrap();

        // At least one opening match is a real match, so even bye winners wait
        for matches in bracket.rounds().iter().skip(1) {
            for m in matches {
                prop_assert!(m.competitor1.is_none() && m.competitor2.is_none());
            }
        }
    }
}
