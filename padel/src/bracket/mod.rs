//! Single-elimination bracket engine.
//!
//! The engine is pure: it knows nothing about the database or HTTP. The
//! tournament manager loads persisted matches into a [`Bracket`], applies an
//! operation and writes the matches back.
//!
//! - Brackets hold 2 to 32 entrants and are sized to the next power of two.
//! - Entrants are placed on standard seed lines, so byes go to the top seeds
//!   and no entrant receives more than one bye.
//! - A round is only populated once every match of the previous round has a
//!   result.
//!
//! ## Example
//!
//! ```
//! use padel::bracket::{Bracket, Round, SetScore};
//!
//! let mut bracket = Bracket::generate(&[10, 20, 30]).unwrap();
//! assert_eq!(bracket.first_round(), Round::Semifinals);
//!
//! // Seed 1 (entrant 10) received the bye; seeds 2 and 3 play.
//! let sets = [SetScore::new(6, 3), SetScore::new(6, 4)];
//! bracket.record_result(Round::Semifinals, 2, 20, &sets).unwrap();
//! bracket.record_result(Round::Final, 1, 10, &sets).unwrap();
//! assert_eq!(bracket.champion(), Some(10));
//! ```

pub mod engine;
pub mod errors;
pub mod models;
pub mod seeding;

pub use engine::{Advancement, Bracket};
pub use errors::{BracketError, BracketResult};
pub use models::{
    BracketMatch, EntrantId, MatchStatus, Placement, Round, SetScore, MAX_ENTRANTS, MIN_ENTRANTS,
};
pub use seeding::{SeedingPolicy, bracket_size, order_by_points, seed_positions};
