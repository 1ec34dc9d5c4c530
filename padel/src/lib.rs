//! # Padel
//!
//! Padel tournament management: accounts, tournaments, registrations,
//! single-elimination brackets and the APA ranking.
//!
//! ## Core Modules
//!
//! - [`bracket`]: Pure bracket engine (seeding, byes, advancement, placements)
//! - [`tournament`]: Tournament lifecycle over PostgreSQL, built on the engine
//! - [`ranking`]: Global ranking and points history
//! - [`auth`]: Registration, login, sessions and JWT access tokens
//! - [`users`]: Profile management behind a repository trait
//! - [`db`]: Connection pool, migrations and timeouts
//! - [`seed`]: Demo data loader
//!
//! ## Example
//!
//! ```
//! use padel::bracket::{Bracket, Placement, Round, SetScore};
//!
//! let mut bracket = Bracket::generate(&[1, 2]).unwrap();
//! assert_eq!(bracket.first_round(), Round::Final);
//!
//! let sets = [SetScore::new(6, 4), SetScore::new(7, 5)];
//! bracket.record_result(Round::Final, 1, 1, &sets).unwrap();
//!
//! let placements = bracket.placements().unwrap();
//! assert_eq!(placements[0], (1, Placement::Champion));
//! assert_eq!(Placement::Finalist.points(), 600);
//! ```

pub mod auth;
pub mod bracket;
pub mod db;
pub mod ranking;
pub mod seed;
pub mod tournament;
pub mod users;

pub use bracket::{Bracket, Placement, Round, SeedingPolicy};
pub use tournament::{Tournament, TournamentManager, TournamentStatus};
