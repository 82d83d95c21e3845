//! Staka database layer
//!
//! Postgres repositories (sqlx) and the store traits the API and the operator
//! utilities program against.

pub mod db;
pub mod store_traits;

pub use db::pool::{connect, run_migrations};
pub use db::{FileRepository, StorageUrlRepository, TariffRepository};
pub use store_traits::{FileStore, LegacyUrlStore, TariffStore};
