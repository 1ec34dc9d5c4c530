//! Integration tests for the tournament lifecycle against PostgreSQL.
//!
//! Run with a disposable database:
//! `DATABASE_URL=postgres://postgres@localhost/padel_test cargo test -- --ignored`

use padel::auth::{AuthManager, RegisterRequest, Role, User};
use padel::bracket::{Placement, Round, SeedingPolicy};
use padel::db::{Database, DatabaseConfig, PgUserRepository};
use padel::ranking::RankingManager;
use padel::tournament::{
    BYE_LABEL, MatchResult, NewTournament, TBD_LABEL, TournamentError, TournamentManager,
    TournamentStatus, TournamentUpdate,
};
use padel::users::{UserError, UserManager};
use serial_test::serial;
use sqlx::PgPool;
use std::sync::Arc;

/// Helper to create a migrated test database pool
async fn setup_test_db() -> Arc<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/padel_test".to_string());

    let config = DatabaseConfig {
        database_url,
        max_connections: 5,
        min_connections: 1,
        connection_timeout_secs: 5,
        idle_timeout_secs: 300,
        max_lifetime_secs: 1800,
    };

    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");

    Arc::new(db.pool().clone())
}

async fn create_player(auth: &AuthManager, first_name: &str) -> User {
    let email = format!("{}_{}@test.com", first_name.to_lowercase(), uuid::Uuid::new_v4().simple());
    let (user, _) = auth
        .register(RegisterRequest {
            first_name: first_name.to_string(),
            last_name: "Test".to_string(),
            email,
            password: "test123".to_string(),
        })
        .await
        .expect("Failed to register player");
    user
}

fn new_tournament(capacity: i32) -> NewTournament {
    NewTournament {
        name: format!("Copa {}", uuid::Uuid::new_v4().simple()),
        category: "4ta".to_string(),
        date: "2025-03-15".parse().unwrap(),
        capacity,
        description: Some("Integration test".to_string()),
    }
}

fn straight_sets(winner_is_first: bool, winner_id: i64) -> MatchResult {
    let (w, l) = (6, 3);
    let (p1, p2) = if winner_is_first { (w, l) } else { (l, w) };
    MatchResult {
        set1_player1: p1,
        set1_player2: p2,
        set2_player1: p1,
        set2_player2: p2,
        set3_player1: None,
        set3_player2: None,
        winner_id,
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_capacity_must_be_power_of_two() {
    let pool = setup_test_db().await;
    let tournaments = TournamentManager::new(pool);

    for capacity in [0, 1, 3, 6, 12, 64] {
        let result = tournaments.create_tournament(new_tournament(capacity)).await;
        assert!(
            matches!(result, Err(TournamentError::InvalidInput(_))),
            "capacity {capacity} should be rejected"
        );
    }

    let created = tournaments.create_tournament(new_tournament(8)).await.unwrap();
    assert_eq!(created.status, TournamentStatus::Open);
    assert_eq!(created.current_registrations, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_registration_rules() {
    let pool = setup_test_db().await;
    let auth = AuthManager::new(pool.clone(), "test_pepper".to_string(), "test_secret".to_string());
    let tournaments = TournamentManager::new(pool);

    let juan = create_player(&auth, "Juan").await;
    let carlos = create_player(&auth, "Carlos").await;
    let miguel = create_player(&auth, "Miguel").await;
    let tournament = tournaments.create_tournament(new_tournament(2)).await.unwrap();

    // Pair entry
    let pair = tournaments
        .register(&juan, tournament.id, Some(carlos.id))
        .await
        .unwrap();
    assert!(pair.display_name.contains(" / "));
    assert!(tournaments.is_registered(carlos.id, tournament.id).await.unwrap());

    // Partners see the tournament in their list too
    let entered = tournaments.tournaments_for_user(carlos.id).await.unwrap();
    assert!(entered.iter().any(|t| t.id == tournament.id));
    assert!(tournaments.tournaments_for_user(miguel.id).await.unwrap().is_empty());

    // Neither member can enter again
    assert!(matches!(
        tournaments.register(&juan, tournament.id, None).await,
        Err(TournamentError::AlreadyRegistered)
    ));
    assert!(matches!(
        tournaments.register(&carlos, tournament.id, None).await,
        Err(TournamentError::AlreadyRegistered)
    ));
    assert!(matches!(
        tournaments.register(&miguel, tournament.id, Some(juan.id)).await,
        Err(TournamentError::PartnerAlreadyRegistered)
    ));
    assert!(matches!(
        tournaments.register(&miguel, tournament.id, Some(miguel.id)).await,
        Err(TournamentError::InvalidPartner(_))
    ));

    tournaments.register(&miguel, tournament.id, None).await.unwrap();
    assert_eq!(
        tournaments.get_tournament(tournament.id).await.unwrap().current_registrations,
        2
    );

    // Full now
    let diego = create_player(&auth, "Diego").await;
    assert!(matches!(
        tournaments.register(&diego, tournament.id, None).await,
        Err(TournamentError::TournamentFull)
    ));

    // The partner may withdraw the pair
    tournaments.cancel_registration(&carlos, tournament.id).await.unwrap();
    assert!(!tournaments.is_registered(juan.id, tournament.id).await.unwrap());
    assert_eq!(tournaments.registrations(tournament.id).await.unwrap().len(), 1);

    // Closed tournaments take no entries
    tournaments
        .update_tournament(
            tournament.id,
            TournamentUpdate {
                status: Some(TournamentStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        tournaments.register(&diego, tournament.id, None).await,
        Err(TournamentError::InvalidStatus(_))
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_full_tournament_awards_points() {
    let pool = setup_test_db().await;
    let auth = AuthManager::new(pool.clone(), "test_pepper".to_string(), "test_secret".to_string());
    let tournaments = TournamentManager::new(pool.clone());
    let ranking = RankingManager::new(pool);

    let players = [
        create_player(&auth, "Juan").await,
        create_player(&auth, "Carlos").await,
        create_player(&auth, "Miguel").await,
    ];
    let tournament = tournaments.create_tournament(new_tournament(4)).await.unwrap();
    for player in &players {
        tournaments.register(player, tournament.id, None).await.unwrap();
    }

    let summary = tournaments
        .generate_bracket(tournament.id, SeedingPolicy::Random)
        .await
        .unwrap();
    assert_eq!(summary.entrants, 3);
    assert_eq!(summary.bracket_size, 4);
    assert_eq!(summary.byes, 1);
    assert_eq!(summary.first_round, Round::Semifinals);
    assert_eq!(
        tournaments.get_tournament(tournament.id).await.unwrap().status,
        TournamentStatus::InProgress
    );

    // No second bracket, no late entries
    assert!(tournaments
        .generate_bracket(tournament.id, SeedingPolicy::Random)
        .await
        .is_err());

    let view = tournaments.bracket(tournament.id).await.unwrap();
    assert_eq!(view.semifinals.len(), 2);
    assert_eq!(view.final_round.len(), 1);
    assert!(view
        .semifinals
        .iter()
        .any(|m| m.competitor1_name == BYE_LABEL || m.competitor2_name == BYE_LABEL));
    assert_eq!(view.final_round[0].competitor1_name, TBD_LABEL);

    let semi = view
        .semifinals
        .iter()
        .find(|m| m.competitor1_id.is_some() && m.competitor2_id.is_some())
        .unwrap()
        .clone();

    // Winner must be in the match
    let outsider = view
        .semifinals
        .iter()
        .find(|m| m.id != semi.id)
        .and_then(|m| m.winner_id)
        .unwrap();
    assert!(tournaments
        .record_result(semi.id, straight_sets(true, outsider))
        .await
        .is_err());

    let semi_winner = semi.competitor1_id.unwrap();
    let outcome = tournaments
        .record_result(semi.id, straight_sets(true, semi_winner))
        .await
        .unwrap();
    assert!(outcome.round_completed);
    assert_eq!(outcome.next_round, Some(Round::Final));
    assert!(!outcome.tournament_finished);

    let view = tournaments.bracket(tournament.id).await.unwrap();
    let final_match = view.final_round[0].clone();
    assert!(final_match.competitor1_id.is_some() && final_match.competitor2_id.is_some());

    let champion = final_match.competitor2_id.unwrap();
    let outcome = tournaments
        .record_result(final_match.id, straight_sets(false, champion))
        .await
        .unwrap();
    assert!(outcome.tournament_finished);
    assert_eq!(outcome.awards.len(), 3);

    let finished = tournaments.get_tournament(tournament.id).await.unwrap();
    assert_eq!(finished.status, TournamentStatus::Finished);
    assert!(finished.finished_at.is_some());

    // Each player has exactly one entry matching their placement
    for award in &outcome.awards {
        let history = ranking.points_history(award.user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].placement, award.placement);
        assert_eq!(history[0].points, award.placement.points());
        assert_eq!(history[0].tournament_name, tournament.name);
    }
    let placements: Vec<Placement> = outcome.awards.iter().map(|a| a.placement).collect();
    assert!(placements.contains(&Placement::Champion));
    assert!(placements.contains(&Placement::Finalist));
    assert!(placements.contains(&Placement::Semifinalist));

    // Nothing left to play
    assert!(tournaments
        .record_result(final_match.id, straight_sets(false, champion))
        .await
        .is_err());

    let top = ranking.ranking(Some(100)).await.unwrap();
    let champion_user = outcome
        .awards
        .iter()
        .find(|a| a.placement == Placement::Champion)
        .unwrap()
        .user_id;
    let entry = top.iter().find(|e| e.user_id == champion_user).unwrap();
    assert_eq!(entry.total_points, 1000);
    assert_eq!(entry.tournaments_played, 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_deleting_tournament_keeps_history() {
    let pool = setup_test_db().await;
    let auth = AuthManager::new(pool.clone(), "test_pepper".to_string(), "test_secret".to_string());
    let tournaments = TournamentManager::new(pool.clone());
    let ranking = RankingManager::new(pool);

    let a = create_player(&auth, "Pablo").await;
    let b = create_player(&auth, "Diego").await;
    let tournament = tournaments.create_tournament(new_tournament(2)).await.unwrap();
    tournaments.register(&a, tournament.id, None).await.unwrap();
    tournaments.register(&b, tournament.id, None).await.unwrap();
    tournaments
        .generate_bracket(tournament.id, SeedingPolicy::Ranking)
        .await
        .unwrap();

    let final_match = tournaments.bracket(tournament.id).await.unwrap().final_round[0].clone();
    tournaments
        .record_result(
            final_match.id,
            straight_sets(true, final_match.competitor1_id.unwrap()),
        )
        .await
        .unwrap();

    tournaments.delete_tournament(tournament.id).await.unwrap();
    assert!(matches!(
        tournaments.get_tournament(tournament.id).await,
        Err(TournamentError::NotFound(_))
    ));

    let history = ranking.points_history(a.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].tournament_id, None);
    assert_eq!(history[0].tournament_name, tournament.name);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
#[serial]
async fn test_user_in_drawn_tournament_cannot_be_deleted() {
    let pool = setup_test_db().await;
    let auth = AuthManager::new(pool.clone(), "test_pepper".to_string(), "test_secret".to_string());
    let tournaments = TournamentManager::new(pool.clone());
    let users = UserManager::new(Arc::new(PgUserRepository::new(pool)));

    let admin = User {
        role: Role::Admin,
        ..create_player(&auth, "Admin").await
    };
    let a = create_player(&auth, "Sergio").await;
    let b = create_player(&auth, "Andrés").await;
    let c = create_player(&auth, "Tomás").await;

    let drawn = tournaments.create_tournament(new_tournament(2)).await.unwrap();
    tournaments.register(&a, drawn.id, None).await.unwrap();
    tournaments.register(&b, drawn.id, None).await.unwrap();
    let open = tournaments.create_tournament(new_tournament(4)).await.unwrap();
    tournaments.register(&c, open.id, None).await.unwrap();

    // Entries in open tournaments go with the account
    users.delete_user(&admin, c.id).await.unwrap();
    assert_eq!(
        tournaments.get_tournament(open.id).await.unwrap().current_registrations,
        0
    );

    tournaments
        .generate_bracket(drawn.id, SeedingPolicy::Random)
        .await
        .unwrap();
    assert!(matches!(
        users.delete_user(&admin, a.id).await,
        Err(UserError::InDrawnTournament)
    ));

    let final_match = tournaments.bracket(drawn.id).await.unwrap().final_round[0].clone();
    assert!(final_match.competitor1_id.is_some() && final_match.competitor2_id.is_some());
    assert_ne!(final_match.competitor1_name, BYE_LABEL);
    assert_ne!(final_match.competitor2_name, BYE_LABEL);

    // A third set needs both scores
    let mut half_set = straight_sets(true, final_match.competitor1_id.unwrap());
    half_set.set3_player1 = Some(7);
    assert!(matches!(
        tournaments.record_result(final_match.id, half_set).await,
        Err(TournamentError::InvalidInput(_))
    ));

    let winner = final_match.competitor1_id.unwrap();
    tournaments
        .record_result(final_match.id, straight_sets(true, winner))
        .await
        .unwrap();

    // Finished brackets keep every competitor
    assert!(matches!(
        users.delete_user(&admin, b.id).await,
        Err(UserError::InDrawnTournament)
    ));
    let played = tournaments.bracket(drawn.id).await.unwrap().final_round[0].clone();
    assert_eq!(played.winner_id, Some(winner));
    assert!(played.competitor1_id.is_some() && played.competitor2_id.is_some());
    assert_ne!(played.competitor1_name, BYE_LABEL);
    assert_ne!(played.competitor2_name, BYE_LABEL);
}
