//! User accounts: profiles, roles and deletion.
//!
//! Storage goes through the [`UserRepository`](crate::db::UserRepository)
//! trait so the manager can run against PostgreSQL or an in-memory mock.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{UserError, UserResult};
pub use manager::UserManager;
pub use models::UserUpdate;
