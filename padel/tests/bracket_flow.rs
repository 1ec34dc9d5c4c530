//! Integration tests for a full tournament played on the bracket engine
//!
//! These tests walk a six-pair draw from seeding to the final, the way the
//! tournament manager drives the engine, without a database.

#[cfg(test)]
mod bracket_flow_tests {
    use padel::bracket::{
        Bracket, BracketError, BracketMatch, Placement, Round, SeedingPolicy, SetScore,
    };

    /// (registration id, combined ranking points) in sign-up order
    const ENTRIES: [(i64, i64); 6] = [
        (11, 540),
        (12, 1600),
        (13, 960),
        (14, 0),
        (15, 1200),
        (16, 540),
    ];

    fn straight(first_wins: bool) -> [SetScore; 2] {
        if first_wins {
            [SetScore::new(6, 2), SetScore::new(6, 4)]
        } else {
            [SetScore::new(3, 6), SetScore::new(5, 7)]
        }
    }

    fn ranked_bracket() -> Bracket {
        let order = SeedingPolicy::Ranking.order(&ENTRIES);
        Bracket::generate(&order).unwrap()
    }

    fn find_match(bracket: &Bracket, entrant: i64, round: Round) -> BracketMatch {
        bracket
            .matches()
            .find(|m| m.round == round && m.has_competitor(entrant))
            .cloned()
            .unwrap()
    }

    /// Record a win for `winner` in its pending match of `round`
    fn win(bracket: &mut Bracket, round: Round, winner: i64) {
        let m = find_match(bracket, winner, round);
        let first_wins = m.competitor1 == Some(winner);
        bracket
            .record_result(round, m.match_number, winner, &straight(first_wins))
            .unwrap();
    }

    #[test]
    fn test_ranking_seeds_get_the_byes() {
        let order = SeedingPolicy::Ranking.order(&ENTRIES);
        // Ties on 540 keep sign-up order
        assert_eq!(order, vec![12, 15, 13, 11, 16, 14]);

        let bracket = ranked_bracket();
        assert_eq!(bracket.size(), 8);
        assert_eq!(bracket.first_round(), Round::Quarterfinals);
        assert_eq!(bracket.bye_count(), 2);

        let bye_winners: Vec<i64> = bracket
            .matches()
            .filter(|m| m.is_bye())
            .filter_map(|m| m.winner)
            .collect();
        assert!(bye_winners.contains(&12));
        assert!(bye_winners.contains(&15));
        assert_eq!(bracket.current_round(), Some(Round::Quarterfinals));
    }

    #[test]
    fn test_full_draw_to_the_final() {
        let mut bracket = ranked_bracket();

        // Quarterfinals: 13 beats 14, 11 beats 16
        win(&mut bracket, Round::Quarterfinals, 13);
        assert!(bracket.get(Round::Semifinals, 1).unwrap().competitor1.is_none());
        win(&mut bracket, Round::Quarterfinals, 11);

        assert_eq!(bracket.current_round(), Some(Round::Semifinals));
        let semifinalists: Vec<i64> = bracket
            .rounds()[1]
            .iter()
            .flat_map(|m| [m.competitor1, m.competitor2])
            .flatten()
            .collect();
        assert_eq!(semifinalists.len(), 4);
        for entrant in [12, 15, 13, 11] {
            assert!(semifinalists.contains(&entrant));
        }

        // 12 meets 11 and 15 meets 13
        win(&mut bracket, Round::Semifinals, 11);
        win(&mut bracket, Round::Semifinals, 13);
        assert_eq!(bracket.current_round(), Some(Round::Final));

        let final_match = find_match(&bracket, 11, Round::Final);
        let first_wins = final_match.competitor1 == Some(11);
        let advancement = bracket
            .record_result(
                Round::Final,
                1,
                11,
                &[
                    if first_wins { SetScore::new(4, 6) } else { SetScore::new(6, 4) },
                    if first_wins { SetScore::new(7, 6) } else { SetScore::new(6, 7) },
                    if first_wins { SetScore::new(6, 3) } else { SetScore::new(3, 6) },
                ],
            )
            .unwrap();
        assert!(advancement.finished);
        assert_eq!(bracket.champion(), Some(11));

        let placements = bracket.placements().unwrap();
        let placement_of = |entrant: i64| {
            placements
                .iter()
                .find(|(e, _)| *e == entrant)
                .map(|(_, p)| *p)
                .unwrap()
        };
        assert_eq!(placement_of(11), Placement::Champion);
        assert_eq!(placement_of(13), Placement::Finalist);
        assert_eq!(placement_of(12), Placement::Semifinalist);
        assert_eq!(placement_of(15), Placement::Semifinalist);
        assert_eq!(placement_of(14), Placement::Quarterfinalist);
        assert_eq!(placement_of(16), Placement::Quarterfinalist);

        let total: i32 = placements.iter().map(|(_, p)| p.points()).sum();
        assert_eq!(total, 1000 + 600 + 2 * 360 + 2 * 180);
    }

    #[test]
    fn test_bracket_survives_persistence_between_results() {
        let mut bracket = ranked_bracket();
        win(&mut bracket, Round::Quarterfinals, 14);

        // What the manager stores and loads back
        let stored: Vec<BracketMatch> = bracket.matches().cloned().collect();
        let mut reloaded = Bracket::from_matches(stored).unwrap();
        assert_eq!(reloaded, bracket);

        win(&mut reloaded, Round::Quarterfinals, 16);
        assert_eq!(reloaded.current_round(), Some(Round::Semifinals));
    }

    #[test]
    fn test_invalid_results_leave_bracket_untouched() {
        let mut bracket = ranked_bracket();
        let before = bracket.clone();
        let m = find_match(&bracket, 13, Round::Quarterfinals);
        let first_wins = m.competitor1 == Some(13);

        // Loser's sets for the declared winner
        let err = bracket
            .record_result(Round::Quarterfinals, m.match_number, 13, &straight(!first_wins))
            .unwrap_err();
        assert!(matches!(err, BracketError::InvalidSets(_)));

        // Semifinal slots are not known yet
        let err = bracket
            .record_result(Round::Semifinals, 1, 12, &straight(true))
            .unwrap_err();
        assert!(matches!(err, BracketError::CompetitorsPending { .. }));

        // Byes are already decided
        let bye = bracket.matches().find(|m| m.is_bye()).cloned().unwrap();
        let err = bracket
            .record_result(bye.round, bye.match_number, bye.winner.unwrap(), &straight(true))
            .unwrap_err();
        assert!(matches!(err, BracketError::AlreadyCompleted { .. }));

        assert_eq!(bracket, before);
    }

    #[test]
    fn test_random_seeding_places_everyone() {
        let order = SeedingPolicy::Random.order(&ENTRIES);
        let bracket = Bracket::generate(&order).unwrap();

        let mut placed = bracket.entrants();
        placed.sort_unstable();
        assert_eq!(placed, vec![11, 12, 13, 14, 15, 16]);
    }
}
