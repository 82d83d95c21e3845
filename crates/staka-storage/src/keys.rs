//! Local addressing scheme for stored artifacts.
//!
//! Every artifact is addressed as `/uploads/<category>/<stored_name>` and lives on
//! disk at `<uploads_dir>/<category>/<stored_name>`. The category is derived from
//! the record's own attributes only, never from its current URL.

use std::fmt;
use uuid::Uuid;

/// URL prefix under which all local artifacts are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

const MAX_EXTENSION_LEN: usize = 10;

/// Storage partition of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Invoices,
    Projects,
    Messages,
}

impl FileCategory {
    pub const ALL: [FileCategory; 3] = [
        FileCategory::Invoices,
        FileCategory::Projects,
        FileCategory::Messages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Invoices => "invoices",
            FileCategory::Projects => "projects",
            FileCategory::Messages => "messages",
        }
    }

    /// Invoice PDFs always go to `invoices`.
    pub fn for_invoice() -> Self {
        FileCategory::Invoices
    }

    /// Admin-authored correction files and files attached to an order are project
    /// content; everything else is a message attachment.
    pub fn for_file(is_admin_file: bool, commande_id: Option<Uuid>) -> Self {
        if is_admin_file || commande_id.is_some() {
            FileCategory::Projects
        } else {
            FileCategory::Messages
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage key (relative path) of an artifact: `<category>/<stored_name>`.
pub fn storage_key(category: FileCategory, stored_name: &str) -> String {
    format!("{}/{}", category.as_str(), stored_name)
}

/// Public URL of an artifact: `/uploads/<category>/<stored_name>`.
pub fn local_url(category: FileCategory, stored_name: &str) -> String {
    format!("{}{}", UPLOADS_URL_PREFIX, storage_key(category, stored_name))
}

/// Whether `url` points at the previous object-storage backend.
///
/// A local `/uploads/` URL never matches, whatever the markers are. The migration
/// relies on this to be a no-op on already migrated records.
pub fn is_remote_object_url<S: AsRef<str>>(url: &str, markers: &[S]) -> bool {
    if url.starts_with(UPLOADS_URL_PREFIX) {
        return false;
    }
    markers
        .iter()
        .map(AsRef::as_ref)
        .filter(|m| !m.is_empty())
        .any(|m| url.contains(m))
}

/// Trailing path segment of a URL, without query string or fragment, percent-decoded.
pub fn filename_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let path = match without_query.split_once("://") {
        // Bare hosts ("https://bucket.s3.amazonaws.com") have no object name.
        Some((_scheme, rest)) => rest.split_once('/').map(|(_host, path)| path)?,
        None => without_query,
    };
    let last = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    if last.is_empty() {
        return None;
    }
    let name = urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string());
    if !is_valid_stored_name(&name) {
        return None;
    }
    Some(name)
}

/// A single path segment: no separators and not `.` or `..`.
pub fn is_valid_stored_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Generate an on-disk name for a new upload: `<uuid><.ext>`.
pub fn generate_stored_name(original_name: &str) -> String {
    let id = Uuid::new_v4();
    match sanitized_extension(original_name) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

fn sanitized_extension(original_name: &str) -> Option<String> {
    let (stem, ext) = original_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
