//! Database repositories for the data access layer
//!
//! Each repository owns a clone of the pool and covers one table (or, for the
//! storage migration, the URL columns of two tables).

pub mod file;
pub mod pool;
pub mod tariff;

pub use file::{FileRepository, StorageUrlRepository};
pub use tariff::TariffRepository;
