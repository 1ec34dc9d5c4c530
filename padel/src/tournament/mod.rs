//! Tournament module: lifecycle, registrations, brackets and results.
//!
//! A tournament moves through `open -> closed -> in_progress -> finished`:
//! - Players (or pairs) register while it is `open`
//! - Generating the bracket seeds the entrants and starts play
//! - Each recorded result advances winners; the final awards APA points
//!
//! ## Example
//!
//! ```no_run
//! use padel::bracket::SeedingPolicy;
//! use padel::db::Database;
//! use padel::tournament::{NewTournament, TournamentManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let tournaments = TournamentManager::new(Arc::new(db.pool().clone()));
//!
//!     let tournament = tournaments
//!         .create_tournament(NewTournament {
//!             name: "Copa Navidad".to_string(),
//!             category: "5ta".to_string(),
//!             date: "2024-12-22".parse()?,
//!             capacity: 8,
//!             description: None,
//!         })
//!         .await?;
//!
//!     // ... players register ...
//!     let summary = tournaments
//!         .generate_bracket(tournament.id, SeedingPolicy::Ranking)
//!         .await?;
//!     println!("First round: {}", summary.first_round);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    BYE_LABEL, BracketSummary, BracketView, MatchId, MatchRecord, MatchResult, NewTournament,
    PointsAward, Registration, RegistrationId, ResultOutcome, TBD_LABEL, Tournament, TournamentId,
    TournamentStatus, TournamentUpdate, validate_capacity,
};
