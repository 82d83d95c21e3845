//! Staka API Library
//!
//! HTTP handlers, middleware and application setup for the tariff catalog and
//! the admin back-office.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
