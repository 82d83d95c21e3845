//! Repositories for stored artifacts: uploaded files and invoice PDFs.

use staka_core::models::{FileUrlRecord, InvoiceUrlRecord, NewStoredFile, StoredFile};
use staka_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for the `files` table
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, file), fields(db.table = "files", db.operation = "insert"))]
    pub async fn create(&self, file: NewStoredFile) -> Result<StoredFile, AppError> {
        let row = sqlx::query_as::<Postgres, StoredFile>(
            r#"
            INSERT INTO files (original_name, stored_name, mime_type, size, url, commande_id,
                               is_admin_file, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, original_name, stored_name, mime_type, size, url, commande_id,
                      is_admin_file, description, uploaded_at
            "#,
        )
        .bind(&file.original_name)
        .bind(&file.stored_name)
        .bind(&file.mime_type)
        .bind(file.size)
        .bind(&file.url)
        .bind(file.commande_id)
        .bind(file.is_admin_file)
        .bind(&file.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

/// Repository used by the storage migration to find and rewrite legacy URLs
/// in `invoices.pdf_url` and `files.url`.
#[derive(Clone)]
pub struct StorageUrlRepository {
    pool: PgPool,
}

impl StorageUrlRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "invoices", db.operation = "select"))]
    pub async fn invoices_matching(
        &self,
        markers: &[String],
    ) -> Result<Vec<InvoiceUrlRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, InvoiceUrlRecord>(
            "SELECT id, pdf_url FROM invoices WHERE pdf_url LIKE ANY($1) ORDER BY created_at ASC",
        )
        .bind(like_patterns(markers))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "invoices", db.operation = "update", db.record_id = %id))]
    pub async fn update_invoice_url(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE invoices SET pdf_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    pub async fn files_matching(&self, markers: &[String]) -> Result<Vec<FileUrlRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, FileUrlRecord>(
            r#"
            SELECT id, url, commande_id, is_admin_file
            FROM files
            WHERE url LIKE ANY($1)
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(like_patterns(markers))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "update", db.record_id = %id))]
    pub async fn update_file_url(
        &self,
        id: Uuid,
        url: &str,
        stored_name: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE files SET url = $2, stored_name = $3 WHERE id = $1")
            .bind(id)
            .bind(url)
            .bind(stored_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// `%marker%` patterns with LIKE wildcards in the marker escaped.
fn like_patterns(markers: &[String]) -> Vec<String> {
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .map(|m| {
            let escaped = m
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_patterns_escape_wildcards() {
        let markers = vec![
            "amazonaws.com".to_string(),
            String::new(),
            "my_bucket%".to_string(),
        ];
        assert_eq!(
            like_patterns(&markers),
            vec!["%amazonaws.com%", "%my\\_bucket\\%%"]
        );
    }
}
