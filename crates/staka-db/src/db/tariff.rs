//! Tariff repository: the catalog behind the public and admin tariff endpoints.

use staka_core::models::{NewTariff, PublicTariff, Tariff};
use staka_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Columns of the public view. Must match the fields of [`PublicTariff`].
const PUBLIC_COLUMNS: &str =
    "id, nom, description, prix, prix_formate, type_service, duree_estimee, actif, ordre, created_at";

const ALL_COLUMNS: &str = "id, nom, description, prix, prix_formate, type_service, duree_estimee, \
     actif, ordre, stripe_product_id, stripe_price_id, created_at, updated_at";

/// Repository for the `tarifs` table
#[derive(Clone)]
pub struct TariffRepository {
    pool: PgPool,
}

impl TariffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active tariffs projected onto the public column list, in display order.
    #[tracing::instrument(skip(self), fields(db.table = "tarifs", db.operation = "select"))]
    pub async fn list_active_public(&self) -> Result<Vec<PublicTariff>, AppError> {
        let query = format!(
            "SELECT {} FROM tarifs WHERE actif = TRUE ORDER BY ordre ASC, created_at ASC",
            PUBLIC_COLUMNS
        );
        let rows = sqlx::query_as::<Postgres, PublicTariff>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All tariffs, active or not, in display order.
    #[tracing::instrument(skip(self), fields(db.table = "tarifs", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<Tariff>, AppError> {
        let query = format!(
            "SELECT {} FROM tarifs ORDER BY ordre ASC, created_at ASC",
            ALL_COLUMNS
        );
        let rows = sqlx::query_as::<Postgres, Tariff>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tarifs", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Tariff>, AppError> {
        let query = format!("SELECT {} FROM tarifs WHERE id = $1", ALL_COLUMNS);
        let row = sqlx::query_as::<Postgres, Tariff>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self, tariff), fields(db.table = "tarifs", db.operation = "insert"))]
    pub async fn create(&self, tariff: NewTariff) -> Result<Tariff, AppError> {
        let query = format!(
            r#"
            INSERT INTO tarifs (nom, description, prix, prix_formate, type_service, duree_estimee,
                                actif, ordre, stripe_product_id, stripe_price_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ALL_COLUMNS
        );
        let row = sqlx::query_as::<Postgres, Tariff>(&query)
            .bind(&tariff.nom)
            .bind(&tariff.description)
            .bind(tariff.prix)
            .bind(&tariff.prix_formate)
            .bind(&tariff.type_service)
            .bind(&tariff.duree_estimee)
            .bind(tariff.actif)
            .bind(tariff.ordre)
            .bind(&tariff.stripe_product_id)
            .bind(&tariff.stripe_price_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Overwrite every mutable column of an existing tariff.
    #[tracing::instrument(skip(self, tariff), fields(db.table = "tarifs", db.operation = "update", db.record_id = %tariff.id))]
    pub async fn update(&self, tariff: &Tariff) -> Result<Option<Tariff>, AppError> {
        let query = format!(
            r#"
            UPDATE tarifs
            SET nom = $2, description = $3, prix = $4, prix_formate = $5, type_service = $6,
                duree_estimee = $7, actif = $8, ordre = $9, stripe_product_id = $10,
                stripe_price_id = $11, updated_at = $12
            WHERE id = $1
            RETURNING {}
            "#,
            ALL_COLUMNS
        );
        let row = sqlx::query_as::<Postgres, Tariff>(&query)
            .bind(tariff.id)
            .bind(&tariff.nom)
            .bind(&tariff.description)
            .bind(tariff.prix)
            .bind(&tariff.prix_formate)
            .bind(&tariff.type_service)
            .bind(&tariff.duree_estimee)
            .bind(tariff.actif)
            .bind(tariff.ordre)
            .bind(&tariff.stripe_product_id)
            .bind(&tariff.stripe_price_id)
            .bind(tariff.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Flip the `actif` flag in a single statement.
    #[tracing::instrument(skip(self), fields(db.table = "tarifs", db.operation = "update", db.record_id = %id))]
    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<Tariff>, AppError> {
        let query = format!(
            "UPDATE tarifs SET actif = NOT actif, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ALL_COLUMNS
        );
        let row = sqlx::query_as::<Postgres, Tariff>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Returns `false` when no tariff had this id.
    #[tracing::instrument(skip(self), fields(db.table = "tarifs", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tarifs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
