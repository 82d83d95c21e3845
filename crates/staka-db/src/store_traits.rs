//! Repository trait abstractions
//!
//! Handlers and the migration utility depend on these traits rather than on the
//! Postgres repositories, so they can be exercised without a database.

use async_trait::async_trait;
use staka_core::models::{
    FileUrlRecord, InvoiceUrlRecord, NewStoredFile, NewTariff, PublicTariff, StoredFile, Tariff,
};
use staka_core::AppError;
use uuid::Uuid;

use crate::db::file::{FileRepository, StorageUrlRepository};
use crate::db::tariff::TariffRepository;

/// Tariff catalog. The admin surface is its only writer.
#[async_trait]
pub trait TariffStore: Send + Sync {
    /// Active tariffs only, already projected to the public view, ordered by `(ordre, created_at)`
    async fn list_active_public(&self) -> Result<Vec<PublicTariff>, AppError>;

    /// Every tariff, ordered by `(ordre, created_at)`
    async fn list_all(&self) -> Result<Vec<Tariff>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Tariff>, AppError>;

    async fn create(&self, tariff: NewTariff) -> Result<Tariff, AppError>;

    /// Persist all mutable fields; `None` if the tariff no longer exists
    async fn update(&self, tariff: &Tariff) -> Result<Option<Tariff>, AppError>;

    async fn toggle_active(&self, id: Uuid) -> Result<Option<Tariff>, AppError>;

    /// `false` if nothing was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> Result<(), AppError>;
}

/// Metadata store for uploaded files
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn create(&self, file: NewStoredFile) -> Result<StoredFile, AppError>;
}

/// Legacy URL access for the storage migration.
///
/// The `*_with_remote_urls` queries select records whose URL contains one of the
/// markers; callers still re-check each record.
#[async_trait]
pub trait LegacyUrlStore: Send + Sync {
    async fn invoices_with_remote_urls(
        &self,
        markers: &[String],
    ) -> Result<Vec<InvoiceUrlRecord>, AppError>;

    async fn update_invoice_url(&self, id: Uuid, url: &str) -> Result<(), AppError>;

    async fn files_with_remote_urls(
        &self,
        markers: &[String],
    ) -> Result<Vec<FileUrlRecord>, AppError>;

    /// Rewrites `url` and `stored_name` together so the row stays addressable.
    async fn update_file_url(
        &self,
        id: Uuid,
        url: &str,
        stored_name: &str,
    ) -> Result<(), AppError>;
}

// Implementations for concrete repository types

#[async_trait]
impl TariffStore for TariffRepository {
    async fn list_active_public(&self) -> Result<Vec<PublicTariff>, AppError> {
        TariffRepository::list_active_public(self).await
    }

    async fn list_all(&self) -> Result<Vec<Tariff>, AppError> {
        TariffRepository::list_all(self).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tariff>, AppError> {
        TariffRepository::get(self, id).await
    }

    async fn create(&self, tariff: NewTariff) -> Result<Tariff, AppError> {
        TariffRepository::create(self, tariff).await
    }

    async fn update(&self, tariff: &Tariff) -> Result<Option<Tariff>, AppError> {
        TariffRepository::update(self, tariff).await
    }

    async fn toggle_active(&self, id: Uuid) -> Result<Option<Tariff>, AppError> {
        TariffRepository::toggle_active(self, id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        TariffRepository::delete(self, id).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        TariffRepository::ping(self).await
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn create(&self, file: NewStoredFile) -> Result<StoredFile, AppError> {
        FileRepository::create(self, file).await
    }
}

#[async_trait]
impl LegacyUrlStore for StorageUrlRepository {
    async fn invoices_with_remote_urls(
        &self,
        markers: &[String],
    ) -> Result<Vec<InvoiceUrlRecord>, AppError> {
        self.invoices_matching(markers).await
    }

    async fn update_invoice_url(&self, id: Uuid, url: &str) -> Result<(), AppError> {
        StorageUrlRepository::update_invoice_url(self, id, url).await
    }

    async fn files_with_remote_urls(
        &self,
        markers: &[String],
    ) -> Result<Vec<FileUrlRecord>, AppError> {
        self.files_matching(markers).await
    }

    async fn update_file_url(
        &self,
        id: Uuid,
        url: &str,
        stored_name: &str,
    ) -> Result<(), AppError> {
        StorageUrlRepository::update_file_url(self, id, url, stored_name).await
    }
}
