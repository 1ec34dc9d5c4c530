//! Demo data loader.
//!
//! Wipes every table and loads an admin, eight ranked players and four
//! tournaments. Open tournaments get a random handful of registrations.

use crate::auth::{AuthError, AuthManager};
use chrono::NaiveDate;
use rand::seq::index;
use rand::Rng;
use serde::Serialize;
use sqlx::{PgPool, Row};
use thiserror::Error;

/// Admin account created by the seed
pub const ADMIN_EMAIL: &str = "admin@padel.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Password shared by every sample player
pub const PLAYER_PASSWORD: &str = "test123";

/// First name, last name, email, ranking points
const PLAYERS: [(&str, &str, &str, i64); 8] = [
    ("Juan", "Martín", "juan@test.com", 1600),
    ("Carlos", "Rodríguez", "carlos@test.com", 1200),
    ("Miguel", "Fernández", "miguel@test.com", 960),
    ("Pablo", "García", "pablo@test.com", 720),
    ("Diego", "López", "diego@test.com", 540),
    ("Andrés", "Sánchez", "andres@test.com", 360),
    ("Lucas", "Martínez", "lucas@test.com", 270),
    ("Mateo", "González", "mateo@test.com", 180),
];

/// Name, category, (year, month, day), capacity, status
const TOURNAMENTS: [(&str, &str, (i32, u32, u32), i32, &str); 4] = [
    ("Torneo de Verano 2024", "4ta", (2024, 12, 15), 16, "open"),
    ("Copa Navidad", "5ta", (2024, 12, 22), 8, "open"),
    ("Master Series Otoño", "3ra", (2024, 11, 30), 16, "finished"),
    ("Torneo Primavera", "4ta", (2025, 1, 10), 16, "open"),
];

/// Seed errors
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid seed date {0:?}")]
    InvalidDate((i32, u32, u32)),
}

/// What was loaded
#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub users: usize,
    pub tournaments: usize,
    pub registrations: usize,
    pub admin_email: &'static str,
    pub player_email: &'static str,
}

/// Played tournaments implied by a sample player's points
fn tournaments_played(points: i64) -> i32 {
    (points / 360 + 1) as i32
}

/// Pick which players enter each open tournament (indexes into `PLAYERS`)
fn draw_entries<R: Rng>(rng: &mut R) -> Vec<Vec<usize>> {
    TOURNAMENTS
        .iter()
        .map(|&(_, _, _, capacity, status)| {
            if status != "open" {
                return Vec::new();
            }
            let most = PLAYERS.len().min(6).min(capacity as usize);
            let count = rng.random_range(2..=most);
            index::sample(rng, PLAYERS.len(), count).into_vec()
        })
        .collect()
}

/// Replace all data with the demo set
///
/// # Errors
///
/// * `SeedError::Database` - any statement failed; nothing is committed
/// * `SeedError::Auth` - password hashing failed
pub async fn seed_demo_data(pool: &PgPool, auth: &AuthManager) -> Result<SeedSummary, SeedError> {
    let entries = draw_entries(&mut rand::rng());
    let player_hash = auth.hash_password(PLAYER_PASSWORD)?;
    let admin_hash = auth.hash_password(ADMIN_PASSWORD)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        "TRUNCATE points_history, matches, registrations, sessions, tournaments, users
         RESTART IDENTITY CASCADE",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO users (first_name, last_name, email, password_hash, role)
         VALUES ('Admin', 'Padel', $1, $2, 'admin')",
    )
    .bind(ADMIN_EMAIL)
    .bind(&admin_hash)
    .execute(&mut *tx)
    .await?;

    let mut player_ids = Vec::with_capacity(PLAYERS.len());
    for (first_name, last_name, email, points) in PLAYERS {
        let row = sqlx::query(
            "INSERT INTO users
                 (first_name, last_name, email, password_hash, total_points, tournaments_played)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(&player_hash)
        .bind(points)
        .bind(tournaments_played(points))
        .fetch_one(&mut *tx)
        .await?;
        player_ids.push(row.get::<i64, _>("id"));
    }

    let mut registrations = 0;
    for ((name, category, ymd, capacity, status), entrants) in TOURNAMENTS.into_iter().zip(entries) {
        let date = NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).ok_or(SeedError::InvalidDate(ymd))?;
        let row = sqlx::query(
            "INSERT INTO tournaments
                 (name, category, date, capacity, status, description, current_registrations)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(name)
        .bind(category)
        .bind(date)
        .bind(capacity)
        .bind(status)
        .bind(format!("Torneo de pádel categoría {category}"))
        .bind(entrants.len() as i32)
        .fetch_one(&mut *tx)
        .await?;
        let tournament_id: i64 = row.get("id");

        for player in entrants {
            sqlx::query("INSERT INTO registrations (tournament_id, user_id) VALUES ($1, $2)")
                .bind(tournament_id)
                .bind(player_ids[player])
                .execute(&mut *tx)
                .await?;
            registrations += 1;
        }
    }

    tx.commit().await?;

    let summary = SeedSummary {
        users: PLAYERS.len() + 1,
        tournaments: TOURNAMENTS.len(),
        registrations,
        admin_email: ADMIN_EMAIL,
        player_email: PLAYERS[0].2,
    };
    log::info!(
        "Seeded {} users, {} tournaments, {} registrations",
        summary.users,
        summary.tournaments,
        summary.registrations
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tournaments_played_from_points() {
        assert_eq!(tournaments_played(1600), 5);
        assert_eq!(tournaments_played(360), 2);
        assert_eq!(tournaments_played(180), 1);
    }

    #[test]
    fn test_draw_entries_fit_open_tournaments() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let entries = draw_entries(&mut rng);
            assert_eq!(entries.len(), TOURNAMENTS.len());
            for (tournament, picked) in TOURNAMENTS.iter().zip(&entries) {
                if tournament.4 == "open" {
                    assert!((2..=6).contains(&picked.len()));
                    let mut unique = picked.clone();
                    unique.sort();
                    unique.dedup();
                    assert_eq!(unique.len(), picked.len());
                    assert!(picked.iter().all(|&i| i < PLAYERS.len()));
                } else {
                    assert!(picked.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_seed_dates_are_valid() {
        for (_, _, (y, m, d), capacity, _) in TOURNAMENTS {
            assert!(NaiveDate::from_ymd_opt(y, m, d).is_some());
            assert!(crate::tournament::validate_capacity(capacity).is_ok());
        }
    }
}
