// Postgres storage layer with sqlx
//
// Provides the Database repository for calendar events. Soft delete only:
// deletes stamp deleted_at and every read filters on it.

pub mod models;
pub mod repositories;

pub use models::*;
pub use repositories::Database;
