//! Test harness: the real router over in-memory stores and a temp uploads dir.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, TimeZone, Utc};
use staka_api::setup::routes::setup_routes;
use staka_api::AppState;
use staka_core::config::DatabaseConfig;
use staka_core::models::{NewStoredFile, NewTariff, PublicTariff, StoredFile, Tariff};
use staka_core::{AppError, Config};
use staka_db::{FileStore, TariffStore};
use staka_storage::LocalStorage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

pub const ADMIN_KEY: &str = "test-admin-key-0123456789abcdefghij";
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

pub fn admin_bearer() -> String {
    format!("Bearer {}", ADMIN_KEY)
}

/// In-memory tariff catalog
#[derive(Clone, Default)]
pub struct InMemoryTariffStore {
    tariffs: Arc<Mutex<Vec<Tariff>>>,
    fail: Arc<AtomicBool>,
    /// Return inactive rows from the public query too, as a broken query would.
    leak_inactive: Arc<AtomicBool>,
}

impl InMemoryTariffStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tariff: Tariff) {
        self.tariffs.lock().unwrap().push(tariff);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_leak_inactive(&self, leak: bool) {
        self.leak_inactive.store(leak, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<Tariff> {
        self.tariffs.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::from(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl TariffStore for InMemoryTariffStore {
    async fn list_active_public(&self) -> Result<Vec<PublicTariff>, AppError> {
        self.check()?;
        let leak = self.leak_inactive.load(Ordering::SeqCst);
        // Insertion order, unsorted: the handler owns the final ordering.
        Ok(self
            .tariffs
            .lock()
            .unwrap()
            .iter()
            .filter(|t| leak || t.actif)
            .map(PublicTariff::from)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Tariff>, AppError> {
        self.check()?;
        let mut all = self.snapshot();
        all.sort_by_key(Tariff::sort_key);
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tariff>, AppError> {
        self.check()?;
        Ok(self.snapshot().into_iter().find(|t| t.id == id))
    }

    async fn create(&self, tariff: NewTariff) -> Result<Tariff, AppError> {
        self.check()?;
        let now = Utc::now();
        let created = Tariff {
            id: Uuid::new_v4(),
            nom: tariff.nom,
            description: tariff.description,
            prix: tariff.prix,
            prix_formate: tariff.prix_formate,
            type_service: tariff.type_service,
            duree_estimee: tariff.duree_estimee,
            actif: tariff.actif,
            ordre: tariff.ordre,
            stripe_product_id: tariff.stripe_product_id,
            stripe_price_id: tariff.stripe_price_id,
            created_at: now,
            updated_at: now,
        };
        self.insert(created.clone());
        Ok(created)
    }

    async fn update(&self, tariff: &Tariff) -> Result<Option<Tariff>, AppError> {
        self.check()?;
        let mut guard = self.tariffs.lock().unwrap();
        match guard.iter_mut().find(|t| t.id == tariff.id) {
            Some(slot) => {
                *slot = tariff.clone();
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn toggle_active(&self, id: Uuid) -> Result<Option<Tariff>, AppError> {
        self.check()?;
        let mut guard = self.tariffs.lock().unwrap();
        Ok(guard.iter_mut().find(|t| t.id == id).map(|t| {
            t.actif = !t.actif;
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.check()?;
        let mut guard = self.tariffs.lock().unwrap();
        let before = guard.len();
        guard.retain(|t| t.id != id);
        Ok(guard.len() != before)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }
}

/// In-memory file metadata store
#[derive(Clone, Default)]
pub struct InMemoryFileStore {
    files: Arc<Mutex<Vec<StoredFile>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryFileStore {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<StoredFile> {
        self.files.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn create(&self, file: NewStoredFile) -> Result<StoredFile, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::from(sqlx::Error::PoolClosed));
        }
        let stored = StoredFile {
            id: Uuid::new_v4(),
            original_name: file.original_name,
            stored_name: file.stored_name,
            mime_type: file.mime_type,
            size: file.size,
            url: file.url,
            commande_id: file.commande_id,
            is_admin_file: file.is_admin_file,
            description: file.description,
            uploaded_at: Utc::now(),
        };
        self.files.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub tariffs: InMemoryTariffStore,
    pub files: InMemoryFileStore,
    pub uploads_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config(uploads_dir: PathBuf) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            timeout_seconds: 1,
        },
        uploads_dir,
        max_upload_size_bytes: MAX_UPLOAD_BYTES,
        admin_api_key: ADMIN_KEY.to_string(),
    }
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let uploads_dir = temp_dir.path().join("uploads");
    let storage = LocalStorage::new(&uploads_dir)
        .await
        .expect("Failed to create local storage");

    let config = test_config(uploads_dir.clone());
    let tariffs = InMemoryTariffStore::new();
    let files = InMemoryFileStore::default();

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(tariffs.clone()),
        Arc::new(files.clone()),
        Arc::new(storage),
    ));
    let router = setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        tariffs,
        files,
        uploads_dir,
        _temp_dir: temp_dir,
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

/// A stored tariff with Stripe references, created `minutes` after [`base_time`].
pub fn tariff(nom: &str, ordre: i32, actif: bool, minutes: i64) -> Tariff {
    let created = base_time() + Duration::minutes(minutes);
    Tariff {
        id: Uuid::new_v4(),
        nom: nom.to_string(),
        description: format!("Pack {}", nom),
        prix: 2000,
        prix_formate: "20€".to_string(),
        type_service: "Correction".to_string(),
        duree_estimee: "7 jours".to_string(),
        actif,
        ordre,
        stripe_product_id: Some(format!("prod_{}", nom)),
        stripe_price_id: Some(format!("price_{}", nom)),
        created_at: created,
        updated_at: created,
    }
}
