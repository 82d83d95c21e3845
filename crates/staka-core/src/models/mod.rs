//! Data models for the application
//!
//! Tariffs (the public catalog and its admin counterpart) and stored artifacts
//! (files and invoices).

mod file;
mod tariff;

pub use file::*;
pub use tariff::*;
