//! Tournament manager: lifecycle, registrations, bracket generation and
//! result entry.
//!
//! Every mutating operation runs in one transaction with the tournament row
//! locked (`SELECT ... FOR UPDATE`), so concurrent registrations and results
//! on the same tournament are serialised.

use super::{
    errors::{TournamentError, TournamentResult},
    models::{
        BracketSummary, BracketView, MatchId, MatchRecord, MatchResult, NewTournament,
        PointsAward, Registration, RegistrationId, ResultOutcome, TOURNAMENT_COLUMNS, Tournament,
        TournamentId, TournamentStatus, TournamentUpdate, validate_capacity,
    },
};
use crate::auth::{User, UserId};
use crate::bracket::{Bracket, BracketMatch, MatchStatus, Round, SeedingPolicy};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use std::sync::Arc;

/// Display name of a registration: the player, or both players of a pair
const REGISTRATION_SELECT: &str = r#"
    SELECT r.id, r.tournament_id, r.user_id, r.partner_id, r.registered_at,
           u.first_name || ' ' || u.last_name
               || COALESCE(' / ' || p.first_name || ' ' || p.last_name, '') AS display_name
    FROM registrations r
    JOIN users u ON u.id = r.user_id
    LEFT JOIN users p ON p.id = r.partner_id
"#;

const MATCH_COLUMNS: &str =
    "id, round, match_number, competitor1_id, competitor2_id, winner_id, sets, status";

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    pool: Arc<PgPool>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create a new tournament with status `open`
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidInput` - empty name/category or capacity not in {2, 4, 8, 16, 32}
    pub async fn create_tournament(&self, request: NewTournament) -> TournamentResult<Tournament> {
        let name = required("Name", &request.name)?;
        let category = required("Category", &request.category)?;
        validate_capacity(request.capacity)?;

        let sql = format!(
            "INSERT INTO tournaments (name, category, date, capacity, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TOURNAMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(name)
            .bind(category)
            .bind(request.date)
            .bind(request.capacity)
            .bind(clean_description(request.description))
            .fetch_one(self.pool.as_ref())
            .await?;

        let tournament = Tournament::from_row(&row)?;
        log::info!(
            "Created tournament {} '{}' (capacity {})",
            tournament.id,
            tournament.name,
            tournament.capacity
        );
        Ok(tournament)
    }

    /// List tournaments, latest date first
    pub async fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> TournamentResult<Vec<Tournament>> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments
             WHERE $1::TEXT IS NULL OR status = $1
             ORDER BY date DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(status.map(TournamentStatus::as_str))
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.iter().map(Tournament::from_row).collect()
    }

    /// Get a tournament by ID
    pub async fn get_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(tournament_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))?;

        Tournament::from_row(&row)
    }

    /// Apply a partial update.
    ///
    /// Capacity may only change before the bracket is generated and never
    /// below the current number of registrations. Status may only be toggled
    /// between `open` and `closed`.
    ///
    /// # Errors
    ///
    /// * `TournamentError::NoChanges` - no field set
    /// * `TournamentError::InvalidInput` - invalid name, category or capacity
    /// * `TournamentError::InvalidStatus` - change not allowed in the current status
    pub async fn update_tournament(
        &self,
        tournament_id: TournamentId,
        update: TournamentUpdate,
    ) -> TournamentResult<Tournament> {
        if update.is_empty() {
            return Err(TournamentError::NoChanges);
        }
        let name = update.name.as_deref().map(|n| required("Name", n)).transpose()?;
        let category = update
            .category
            .as_deref()
            .map(|c| required("Category", c))
            .transpose()?;

        let mut tx = self.pool.begin().await?;
        let tournament = lock_tournament(&mut tx, tournament_id).await?;

        if let Some(capacity) = update.capacity {
            if !tournament.status.is_before_play() {
                return Err(TournamentError::InvalidStatus(
                    "Capacity can only change before the bracket is generated".to_string(),
                ));
            }
            validate_capacity(capacity)?;
            if capacity < tournament.current_registrations {
                return Err(TournamentError::InvalidInput(format!(
                    "Capacity cannot be below the {} current registrations",
                    tournament.current_registrations
                )));
            }
        }

        if let Some(status) = update.status
            && status != tournament.status
            && !(status.is_before_play() && tournament.status.is_before_play())
        {
            return Err(TournamentError::InvalidStatus(format!(
                "Status cannot change from {} to {}",
                tournament.status, status
            )));
        }

        let sql = format!(
            "UPDATE tournaments
             SET name = COALESCE($2, name),
                 category = COALESCE($3, category),
                 date = COALESCE($4, date),
                 capacity = COALESCE($5, capacity),
                 status = COALESCE($6, status),
                 description = COALESCE($7, description)
             WHERE id = $1
             RETURNING {TOURNAMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(tournament_id)
            .bind(name)
            .bind(category)
            .bind(update.date)
            .bind(update.capacity)
            .bind(update.status.map(TournamentStatus::as_str))
            .bind(update.description.map(|d| d.trim().to_string()))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Tournament::from_row(&row)
    }

    /// Delete a tournament with its registrations and matches.
    ///
    /// Points already awarded stay in the users' history under the
    /// tournament's name.
    pub async fn delete_tournament(&self, tournament_id: TournamentId) -> TournamentResult<()> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(TournamentError::NotFound(tournament_id));
        }
        log::warn!("Deleted tournament {}", tournament_id);
        Ok(())
    }

    /// Register a player, or a pair when `partner_id` is given.
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - tournament not open
    /// * `TournamentError::TournamentFull` - capacity reached
    /// * `TournamentError::AlreadyRegistered` - user already entered, alone or as a partner
    /// * `TournamentError::InvalidPartner` - partner is the user
    /// * `TournamentError::UserNotFound` - partner does not exist
    /// * `TournamentError::PartnerAlreadyRegistered` - partner already entered
    pub async fn register(
        &self,
        user: &User,
        tournament_id: TournamentId,
        partner_id: Option<UserId>,
    ) -> TournamentResult<Registration> {
        if partner_id == Some(user.id) {
            return Err(TournamentError::InvalidPartner(
                "You cannot partner with yourself".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let tournament = lock_tournament(&mut tx, tournament_id).await?;

        if tournament.status != TournamentStatus::Open {
            return Err(TournamentError::InvalidStatus(
                "Tournament is not open for registration".to_string(),
            ));
        }
        if tournament.is_full() {
            return Err(TournamentError::TournamentFull);
        }
        if is_entered(&mut tx, tournament_id, user.id).await? {
            return Err(TournamentError::AlreadyRegistered);
        }
        if let Some(partner) = partner_id {
            let exists = sqlx::query("SELECT id FROM users WHERE id = $1")
                .bind(partner)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(TournamentError::UserNotFound(partner));
            }
            if is_entered(&mut tx, tournament_id, partner).await? {
                return Err(TournamentError::PartnerAlreadyRegistered);
            }
        }

        let row = sqlx::query(
            "INSERT INTO registrations (tournament_id, user_id, partner_id)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(tournament_id)
        .bind(user.id)
        .bind(partner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_registration)?;
        let registration_id: RegistrationId = row.get("id");

        sqlx::query(
            "UPDATE tournaments SET current_registrations = current_registrations + 1 WHERE id = $1",
        )
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?;

        let sql = format!("{REGISTRATION_SELECT} WHERE r.id = $1");
        let row = sqlx::query(&sql)
            .bind(registration_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let registration = registration_from_row(&row);
        log::info!(
            "Registration {} ({}) entered tournament {}",
            registration.id,
            registration.display_name,
            tournament_id
        );
        Ok(registration)
    }

    /// Cancel the caller's entry (as registrant or partner) while the tournament is open
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - tournament not open
    /// * `TournamentError::NotRegistered` - caller has no entry
    pub async fn cancel_registration(
        &self,
        user: &User,
        tournament_id: TournamentId,
    ) -> TournamentResult<()> {
        let mut tx = self.pool.begin().await?;
        let tournament = lock_tournament(&mut tx, tournament_id).await?;

        if tournament.status != TournamentStatus::Open {
            return Err(TournamentError::InvalidStatus(
                "Cannot cancel registration for non-open tournament".to_string(),
            ));
        }

        let result = sqlx::query(
            "DELETE FROM registrations
             WHERE tournament_id = $1 AND (user_id = $2 OR partner_id = $2)",
        )
        .bind(tournament_id)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TournamentError::NotRegistered);
        }

        sqlx::query(
            "UPDATE tournaments SET current_registrations = current_registrations - 1 WHERE id = $1",
        )
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        log::info!("User {} left tournament {}", user.id, tournament_id);
        Ok(())
    }

    /// Registrations in sign-up order
    pub async fn registrations(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Registration>> {
        self.get_tournament(tournament_id).await?;

        let sql = format!("{REGISTRATION_SELECT} WHERE r.tournament_id = $1 ORDER BY r.registered_at, r.id");
        let rows = sqlx::query(&sql)
            .bind(tournament_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.iter().map(registration_from_row).collect())
    }

    /// Whether the user is entered, alone or as a partner
    pub async fn is_registered(
        &self,
        user_id: UserId,
        tournament_id: TournamentId,
    ) -> TournamentResult<bool> {
        let mut conn = self.pool.acquire().await?;
        is_entered(&mut conn, tournament_id, user_id).await
    }

    /// Tournaments the user is entered in, latest date first
    pub async fn tournaments_for_user(&self, user_id: UserId) -> TournamentResult<Vec<Tournament>> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments t
             WHERE EXISTS (
                 SELECT 1 FROM registrations r
                 WHERE r.tournament_id = t.id AND (r.user_id = $1 OR r.partner_id = $1)
             )
             ORDER BY date DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.iter().map(Tournament::from_row).collect()
    }

    /// Generate the bracket and start the tournament.
    ///
    /// Entrants are ordered by `seeding` (random draw, or combined ranking
    /// points with ties kept in sign-up order), placed on seed lines, and all
    /// matches are persisted. The tournament moves to `in_progress`.
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidStatus` - tournament already started or finished
    /// * `TournamentError::Bracket` - fewer than two entrants
    pub async fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        seeding: SeedingPolicy,
    ) -> TournamentResult<BracketSummary> {
        let mut tx = self.pool.begin().await?;
        let tournament = lock_tournament(&mut tx, tournament_id).await?;

        if !tournament.status.is_before_play() {
            return Err(TournamentError::InvalidStatus(
                "Bracket can only be generated for open or closed tournaments".to_string(),
            ));
        }

        let rows = sqlx::query(
            r#"
            SELECT r.id, u.total_points + COALESCE(p.total_points, 0) AS points
            FROM registrations r
            JOIN users u ON u.id = r.user_id
            LEFT JOIN users p ON p.id = r.partner_id
            WHERE r.tournament_id = $1
            ORDER BY r.registered_at, r.id
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&mut *tx)
        .await?;

        let entrants: Vec<(RegistrationId, i64)> = rows
            .iter()
            .map(|row| (row.get("id"), row.get("points")))
            .collect();
        let bracket = Bracket::generate(&seeding.order(&entrants))?;

        // Leftovers from an aborted run would collide with the unique key.
        sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        for m in bracket.matches() {
            sqlx::query(
                "INSERT INTO matches
                     (tournament_id, round, match_number, competitor1_id, competitor2_id,
                      winner_id, sets, status)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(tournament_id)
            .bind(m.round.as_str())
            .bind(m.match_number as i32)
            .bind(m.competitor1)
            .bind(m.competitor2)
            .bind(m.winner)
            .bind(serde_json::to_value(&m.sets)?)
            .bind(m.status.as_str())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE tournaments SET status = 'in_progress', seeding = $2, started_at = NOW()
             WHERE id = $1",
        )
        .bind(tournament_id)
        .bind(seeding.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let summary = BracketSummary {
            tournament_id,
            seeding,
            entrants: entrants.len(),
            bracket_size: bracket.size(),
            first_round: bracket.first_round(),
            matches: bracket.matches().count(),
            byes: bracket.bye_count(),
        };
        log::info!(
            "Generated {} bracket for tournament {}: {} entrants, {} byes, starting at {}",
            seeding.as_str(),
            tournament_id,
            summary.entrants,
            summary.byes,
            summary.first_round
        );
        Ok(summary)
    }

    /// Matches grouped by round with competitor names
    pub async fn bracket(&self, tournament_id: TournamentId) -> TournamentResult<BracketView> {
        self.get_tournament(tournament_id).await?;

        let mut conn = self.pool.acquire().await?;
        let matches = load_matches(&mut conn, tournament_id).await?;
        let names = registration_names(&mut conn, tournament_id).await?;

        Ok(BracketView::from_matches(matches.iter().map(|(id, m)| {
            MatchRecord::from_bracket_match(*id, tournament_id, m, |entrant| entrant_name(&names, entrant))
        })))
    }

    /// Record a match result.
    ///
    /// The winner advances once its round is complete. When the final is
    /// played, every user of every entrant receives the points of their
    /// placement, `tournaments_played` is incremented for all participants,
    /// history entries are written and the tournament is marked `finished`,
    /// all in the same transaction.
    ///
    /// # Errors
    ///
    /// * `TournamentError::MatchNotFound` - no such match
    /// * `TournamentError::InvalidStatus` - tournament not in progress
    /// * `TournamentError::Bracket` - match not playable, winner not in match, invalid sets
    pub async fn record_result(
        &self,
        match_id: MatchId,
        result: MatchResult,
    ) -> TournamentResult<ResultOutcome> {
        let mut tx = self.pool.begin().await?;

        let tournament_id: TournamentId =
            sqlx::query("SELECT tournament_id FROM matches WHERE id = $1")
                .bind(match_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(TournamentError::MatchNotFound(match_id))?
                .get("tournament_id");

        let tournament = lock_tournament(&mut tx, tournament_id).await?;
        if tournament.status != TournamentStatus::InProgress {
            return Err(TournamentError::InvalidStatus(
                "Results can only be recorded while the tournament is in progress".to_string(),
            ));
        }

        let stored = load_matches(&mut tx, tournament_id).await?;
        let (round, match_number) = stored
            .iter()
            .find(|(id, _)| *id == match_id)
            .map(|(_, m)| (m.round, m.match_number))
            .ok_or(TournamentError::MatchNotFound(match_id))?;

        let mut bracket = Bracket::from_matches(stored.iter().map(|(_, m)| m.clone()).collect())?;
        let advancement =
            bracket.record_result(round, match_number, result.winner_id, &result.sets()?)?;

        let ids: HashMap<(Round, u32), MatchId> = stored
            .iter()
            .map(|(id, m)| ((m.round, m.match_number), *id))
            .collect();
        let before: HashMap<MatchId, &BracketMatch> =
            stored.iter().map(|(id, m)| (*id, m)).collect();

        for m in bracket.matches() {
            let Some(&id) = ids.get(&(m.round, m.match_number)) else {
                continue;
            };
            if before.get(&id).is_some_and(|old| *old == m) {
                continue;
            }
            sqlx::query(
                "UPDATE matches
                 SET competitor1_id = $2, competitor2_id = $3, winner_id = $4,
                     sets = $5, status = $6, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(id)
            .bind(m.competitor1)
            .bind(m.competitor2)
            .bind(m.winner)
            .bind(serde_json::to_value(&m.sets)?)
            .bind(m.status.as_str())
            .execute(&mut *tx)
            .await?;
        }

        let awards = if advancement.finished {
            let awards = award_points(&mut tx, &tournament, &bracket).await?;
            sqlx::query(
                "UPDATE tournaments SET status = 'finished', finished_at = NOW() WHERE id = $1",
            )
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;
            awards
        } else {
            Vec::new()
        };

        let names = registration_names(&mut tx, tournament_id).await?;
        tx.commit().await?;

        let winner = entrant_name(&names, result.winner_id);
        log::info!(
            "Match {} ({} #{}) of tournament {} won by {}",
            match_id,
            round,
            match_number,
            tournament_id,
            winner
        );
        if advancement.finished {
            log::info!(
                "Tournament {} finished; {} users credited",
                tournament_id,
                awards.len()
            );
        }

        Ok(ResultOutcome {
            match_id,
            winner_id: result.winner_id,
            winner,
            round_completed: advancement.round_completed,
            next_round: advancement.populated,
            tournament_finished: advancement.finished,
            awards,
        })
    }
}

/// Load and lock a tournament row for the rest of the transaction
async fn lock_tournament(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> TournamentResult<Tournament> {
    let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1 FOR UPDATE");
    let row = sqlx::query(&sql)
        .bind(tournament_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(TournamentError::NotFound(tournament_id))?;

    Tournament::from_row(&row)
}

async fn is_entered(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
    user_id: UserId,
) -> TournamentResult<bool> {
    let row = sqlx::query(
        "SELECT EXISTS(
             SELECT 1 FROM registrations
             WHERE tournament_id = $1 AND (user_id = $2 OR partner_id = $2)
         ) AS entered",
    )
    .bind(tournament_id)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.get("entered"))
}

/// Persisted matches of a tournament with their IDs
async fn load_matches(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> TournamentResult<Vec<(MatchId, BracketMatch)>> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 ORDER BY match_number"
    );
    let rows = sqlx::query(&sql)
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(match_from_row).collect()
}

fn match_from_row(row: &PgRow) -> TournamentResult<(MatchId, BracketMatch)> {
    let m = BracketMatch {
        round: row.get::<String, _>("round").parse()?,
        match_number: row.get::<i32, _>("match_number") as u32,
        competitor1: row.get("competitor1_id"),
        competitor2: row.get("competitor2_id"),
        winner: row.get("winner_id"),
        sets: serde_json::from_value(row.get("sets"))?,
        status: row.get::<String, _>("status").parse::<MatchStatus>()?,
    };
    Ok((row.get("id"), m))
}

/// Registration ID -> display name, for every entrant of a tournament
async fn registration_names(
    conn: &mut PgConnection,
    tournament_id: TournamentId,
) -> TournamentResult<HashMap<RegistrationId, String>> {
    let sql = format!("{REGISTRATION_SELECT} WHERE r.tournament_id = $1");
    let rows = sqlx::query(&sql)
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("id"), row.get("display_name")))
        .collect())
}

fn entrant_name(names: &HashMap<RegistrationId, String>, entrant: RegistrationId) -> String {
    names
        .get(&entrant)
        .cloned()
        .unwrap_or_else(|| format!("Registration {entrant}"))
}

/// Credit every user of every entrant with the points of their placement
async fn award_points(
    conn: &mut PgConnection,
    tournament: &Tournament,
    bracket: &Bracket,
) -> TournamentResult<Vec<PointsAward>> {
    let rows = sqlx::query("SELECT id, user_id, partner_id FROM registrations WHERE tournament_id = $1")
        .bind(tournament.id)
        .fetch_all(&mut *conn)
        .await?;
    let members: HashMap<RegistrationId, (UserId, Option<UserId>)> = rows
        .iter()
        .map(|row| (row.get("id"), (row.get("user_id"), row.get("partner_id"))))
        .collect();

    let mut awards = Vec::new();
    for (registration_id, placement) in bracket.placements()? {
        let Some(&(user_id, partner_id)) = members.get(&registration_id) else {
            log::warn!(
                "Registration {} of tournament {} vanished before points were awarded",
                registration_id,
                tournament.id
            );
            continue;
        };

        for user_id in std::iter::once(user_id).chain(partner_id) {
            let points = placement.points();
            sqlx::query(
                "UPDATE users
                 SET total_points = total_points + $2,
                     tournaments_played = tournaments_played + 1,
                     updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(user_id)
            .bind(i64::from(points))
            .execute(&mut *conn)
            .await?;

            if points > 0 {
                sqlx::query(
                    "INSERT INTO points_history
                         (user_id, tournament_id, tournament_name, placement, points)
                     VALUES ($1, $2, $3, $4, $5)
                     ON CONFLICT (user_id, tournament_id) DO NOTHING",
                )
                .bind(user_id)
                .bind(tournament.id)
                .bind(&tournament.name)
                .bind(placement.as_str())
                .bind(points)
                .execute(&mut *conn)
                .await?;
            }

            awards.push(PointsAward {
                user_id,
                registration_id,
                placement,
                points,
            });
        }
    }

    Ok(awards)
}

fn registration_from_row(row: &PgRow) -> Registration {
    Registration {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        user_id: row.get("user_id"),
        partner_id: row.get("partner_id"),
        display_name: row.get("display_name"),
        registered_at: row.get::<chrono::NaiveDateTime, _>("registered_at").and_utc(),
    }
}

fn map_unique_registration(e: sqlx::Error) -> TournamentError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            TournamentError::AlreadyRegistered
        }
        _ => TournamentError::Database(e),
    }
}

fn required<'a>(field: &str, value: &'a str) -> TournamentResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::InvalidInput(format!("{field} is required")));
    }
    if trimmed.chars().count() > 200 {
        return Err(TournamentError::InvalidInput(format!(
            "{field} must be at most 200 characters"
        )));
    }
    Ok(trimmed)
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("Name", "  Copa  ").unwrap(), "Copa");
        assert!(matches!(
            required("Name", " "),
            Err(TournamentError::InvalidInput(_))
        ));
        assert!(required("Name", &"x".repeat(201)).is_err());
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description(Some("  ".to_string())), None);
        assert_eq!(
            clean_description(Some(" Torneo de pádel ".to_string())).as_deref(),
            Some("Torneo de pádel")
        );
        assert_eq!(clean_description(None), None);
    }

    #[test]
    fn test_entrant_name_falls_back_to_id() {
        let mut names = HashMap::new();
        names.insert(1, "Juan Pérez".to_string());
        assert_eq!(entrant_name(&names, 1), "Juan Pérez");
        assert_eq!(entrant_name(&names, 2), "Registration 2");
    }
}
