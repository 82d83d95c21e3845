//! Storage URL migration: rewrite URLs pointing at the previous object-storage
//! backend to the local `/uploads/<category>/<name>` scheme.
//!
//! Each record is updated on its own; there is no batch transaction. A failure
//! aborts the run and leaves the updates already made in place. Already migrated
//! URLs never match the remote markers, so the run converges: a second execute
//! pass rewrites nothing.

use serde::Serialize;
use staka_core::models::{FileUrlRecord, InvoiceUrlRecord};
use staka_core::AppError;
use staka_db::LegacyUrlStore;
use staka_storage::keys::storage_key;
use staka_storage::{filename_from_url, is_remote_object_url, local_url, FileCategory, Storage};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationMode {
    /// Read-only: count and log what would change
    Simulate,
    /// Persist every rewrite
    Execute,
}

impl MigrationMode {
    pub fn from_execute_flag(execute: bool) -> Self {
        if execute {
            MigrationMode::Execute
        } else {
            MigrationMode::Simulate
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub invoices_pending: usize,
    pub files_pending: usize,
    pub invoices_migrated: usize,
    pub files_migrated: usize,
    /// Remote URLs with no usable filename
    pub skipped: usize,
    /// Rewrites whose target file is not present in the uploads directory
    pub missing_local_files: usize,
}

impl MigrationReport {
    pub fn total_pending(&self) -> usize {
        self.invoices_pending + self.files_pending
    }

    pub fn total_migrated(&self) -> usize {
        self.invoices_migrated + self.files_migrated
    }
}

/// A single URL rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRewrite {
    pub id: Uuid,
    pub category: FileCategory,
    pub old_url: String,
    pub new_url: String,
    /// Last segment of the old URL; the on-disk name after migration
    pub stored_name: String,
    pub storage_key: String,
}

/// Rewrite for a record of the given category, or `None` when the URL has no
/// filename to carry over.
pub fn plan_rewrite(id: Uuid, old_url: &str, category: FileCategory) -> Option<PlannedRewrite> {
    let filename = filename_from_url(old_url)?;
    Some(PlannedRewrite {
        id,
        category,
        old_url: old_url.to_string(),
        new_url: local_url(category, &filename),
        storage_key: storage_key(category, &filename),
        stored_name: filename,
    })
}

pub fn plan_invoice(record: &InvoiceUrlRecord) -> Option<PlannedRewrite> {
    plan_rewrite(record.id, &record.pdf_url, FileCategory::for_invoice())
}

pub fn plan_file(record: &FileUrlRecord) -> Option<PlannedRewrite> {
    plan_rewrite(
        record.id,
        &record.url,
        FileCategory::for_file(record.is_admin_file, record.commande_id),
    )
}

#[derive(Debug, Clone, Copy)]
enum RecordKind {
    Invoice,
    File,
}

impl RecordKind {
    fn label(self) -> &'static str {
        match self {
            RecordKind::Invoice => "invoice",
            RecordKind::File => "file",
        }
    }
}

/// Migration over a [`LegacyUrlStore`], optionally checking that the rewritten
/// targets exist in local storage.
pub struct StorageMigration<'a> {
    store: &'a dyn LegacyUrlStore,
    markers: &'a [String],
    local: Option<&'a dyn Storage>,
}

impl<'a> StorageMigration<'a> {
    pub fn new(store: &'a dyn LegacyUrlStore, markers: &'a [String]) -> Self {
        Self {
            store,
            markers,
            local: None,
        }
    }

    pub fn with_local_check(mut self, storage: &'a dyn Storage) -> Self {
        self.local = Some(storage);
        self
    }

    pub async fn run(&self, mode: MigrationMode) -> Result<MigrationReport, AppError> {
        let mut report = MigrationReport::default();

        let invoices = self.store.invoices_with_remote_urls(self.markers).await?;
        let plans = self.collect_plans(
            invoices
                .iter()
                .filter(|r| is_remote_object_url(&r.pdf_url, self.markers))
                .map(|r| (r.id, plan_invoice(r))),
            RecordKind::Invoice,
            &mut report,
        );
        report.invoices_pending = plans.len();
        tracing::info!(count = plans.len(), "Invoices with remote URLs");
        report.invoices_migrated = self
            .apply(&plans, RecordKind::Invoice, mode, &mut report)
            .await?;

        let files = self.store.files_with_remote_urls(self.markers).await?;
        let plans = self.collect_plans(
            files
                .iter()
                .filter(|r| is_remote_object_url(&r.url, self.markers))
                .map(|r| (r.id, plan_file(r))),
            RecordKind::File,
            &mut report,
        );
        report.files_pending = plans.len();
        tracing::info!(count = plans.len(), "Files with remote URLs");
        report.files_migrated = self
            .apply(&plans, RecordKind::File, mode, &mut report)
            .await?;

        Ok(report)
    }

    fn collect_plans(
        &self,
        candidates: impl Iterator<Item = (Uuid, Option<PlannedRewrite>)>,
        kind: RecordKind,
        report: &mut MigrationReport,
    ) -> Vec<PlannedRewrite> {
        let mut plans = Vec::new();
        for (id, plan) in candidates {
            match plan {
                Some(plan) => plans.push(plan),
                None => {
                    tracing::warn!(
                        record = kind.label(),
                        id = %id,
                        "Remote URL has no filename, skipping"
                    );
                    report.skipped += 1;
                }
            }
        }
        plans
    }

    async fn apply(
        &self,
        plans: &[PlannedRewrite],
        kind: RecordKind,
        mode: MigrationMode,
        report: &mut MigrationReport,
    ) -> Result<usize, AppError> {
        let mut migrated = 0;
        for plan in plans {
            self.check_local_file(plan, report).await;

            match mode {
                MigrationMode::Simulate => {
                    tracing::debug!(
                        record = kind.label(),
                        id = %plan.id,
                        "Would rewrite {} → {}",
                        plan.old_url,
                        plan.new_url
                    );
                }
                MigrationMode::Execute => {
                    match kind {
                        RecordKind::Invoice => {
                            self.store.update_invoice_url(plan.id, &plan.new_url).await?
                        }
                        RecordKind::File => {
                            self.store
                                .update_file_url(plan.id, &plan.new_url, &plan.stored_name)
                                .await?
                        }
                    }
                    tracing::info!(
                        record = kind.label(),
                        id = %plan.id,
                        "{} → {}",
                        plan.old_url,
                        plan.new_url
                    );
                    migrated += 1;
                }
            }
        }
        Ok(migrated)
    }

    async fn check_local_file(&self, plan: &PlannedRewrite, report: &mut MigrationReport) {
        let Some(storage) = self.local else {
            return;
        };
        match storage.exists(&plan.storage_key).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    id = %plan.id,
                    storage_key = %plan.storage_key,
                    "Target file missing from local storage"
                );
                report.missing_local_files += 1;
            }
            Err(e) => {
                tracing::warn!(
                    id = %plan.id,
                    storage_key = %plan.storage_key,
                    error = %e,
                    "Could not check local file"
                );
                report.missing_local_files += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_invoice_from_regional_bucket_url() {
        let record = InvoiceUrlRecord {
            id: Uuid::new_v4(),
            pdf_url: "https://bucket.s3.eu-west-3.amazonaws.com/invoice-42.pdf".to_string(),
        };
        let plan = plan_invoice(&record).unwrap();
        assert_eq!(plan.new_url, "/uploads/invoices/invoice-42.pdf");
        assert_eq!(plan.storage_key, "invoices/invoice-42.pdf");
        assert_eq!(plan.stored_name, "invoice-42.pdf");
        assert_eq!(plan.category, FileCategory::Invoices);
    }

    #[test]
    fn test_plan_file_categories() {
        let order_file = FileUrlRecord {
            id: Uuid::new_v4(),
            url: "https://bucket.s3.amazonaws.com/project/report.docx".to_string(),
            commande_id: Some(Uuid::new_v4()),
            is_admin_file: false,
        };
        assert_eq!(
            plan_file(&order_file).unwrap().new_url,
            "/uploads/projects/report.docx"
        );

        let attachment = FileUrlRecord {
            id: Uuid::new_v4(),
            url: "https://bucket.s3.amazonaws.com/messages/att.png".to_string(),
            commande_id: None,
            is_admin_file: false,
        };
        assert_eq!(
            plan_file(&attachment).unwrap().new_url,
            "/uploads/messages/att.png"
        );

        let correction = FileUrlRecord {
            commande_id: None,
            is_admin_file: true,
            ..attachment
        };
        assert_eq!(
            plan_file(&correction).unwrap().new_url,
            "/uploads/projects/att.png"
        );
    }

    #[test]
    fn test_plan_strips_query_string() {
        let plan = plan_rewrite(
            Uuid::new_v4(),
            "https://bucket.s3.amazonaws.com/invoice-7.pdf?X-Amz-Signature=abc",
            FileCategory::Invoices,
        )
        .unwrap();
        assert_eq!(plan.new_url, "/uploads/invoices/invoice-7.pdf");
    }

    #[test]
    fn test_plan_without_filename() {
        assert!(plan_rewrite(
            Uuid::new_v4(),
            "https://bucket.s3.amazonaws.com/",
            FileCategory::Invoices
        )
        .is_none());
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(MigrationMode::from_execute_flag(false), MigrationMode::Simulate);
        assert_eq!(MigrationMode::from_execute_flag(true), MigrationMode::Execute);
    }
}
