use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An uploaded artifact: project document, correction file or message attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: Uuid,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size: i64,
    /// Always `/uploads/<category>/<stored_name>` once on local storage
    pub url: String,
    pub commande_id: Option<Uuid>,
    /// Correction artifact uploaded by the Staka team
    pub is_admin_file: bool,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Metadata for a file that has just been written to storage
#[derive(Debug, Clone)]
pub struct NewStoredFile {
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
    pub commande_id: Option<Uuid>,
    pub is_admin_file: bool,
    pub description: Option<String>,
}

/// The columns of an invoice the storage migration needs. The PDF lives at `pdf_url`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceUrlRecord {
    pub id: Uuid,
    pub pdf_url: String,
}

/// The columns of a stored file the storage migration needs to re-address it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileUrlRecord {
    pub id: Uuid,
    pub url: String,
    pub commande_id: Option<Uuid>,
    pub is_admin_file: bool,
}
