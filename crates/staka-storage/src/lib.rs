//! Staka Storage Library
//!
//! Local file storage and the addressing scheme for uploaded artifacts.
//!
//! # Addressing
//!
//! Every artifact belongs to one category (`invoices`, `projects` or `messages`)
//! and is addressed as:
//!
//! - **Storage key**: `{category}/{stored_name}`
//! - **URL**: `/uploads/{category}/{stored_name}`
//!
//! Key and URL generation is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::{
    filename_from_url, generate_stored_name, is_remote_object_url, local_url, FileCategory,
};
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
