// db/rotadb.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::rotamodel::*;

#[async_trait]
pub trait RotaExt {
    async fn create_rota(
        &self,
        employer_id: Uuid,
        name: String,
        week_start: NaiveDate,
    ) -> Result<Rota, Error>;

    async fn get_rota(&self, rota_id: Uuid) -> Result<Option<Rota>, Error>;

    async fn get_employer_rotas(&self, employer_id: Uuid) -> Result<Vec<Rota>, Error>;

    /// `None` when the rota was already published.
    async fn mark_rota_published(&self, rota_id: Uuid) -> Result<Option<Rota>, Error>;
}

#[async_trait]
impl RotaExt for DBClient {
    async fn create_rota(
        &self,
        employer_id: Uuid,
        name: String,
        week_start: NaiveDate,
    ) -> Result<Rota, Error> {
        sqlx::query_as::<_, Rota>(
            r#"
            INSERT INTO rotas (employer_id, name, week_start, status)
            VALUES ($1, $2, $3, 'draft'::rota_status)
            RETURNING id, employer_id, name, week_start, status, published_at, created_at
            "#
        )
        .bind(employer_id)
        .bind(name)
        .bind(week_start)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_rota(&self, rota_id: Uuid) -> Result<Option<Rota>, Error> {
        sqlx::query_as::<_, Rota>(
            r#"
            SELECT id, employer_id, name, week_start, status, published_at, created_at
            FROM rotas
            WHERE id = $1
            "#
        )
        .bind(rota_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_employer_rotas(&self, employer_id: Uuid) -> Result<Vec<Rota>, Error> {
        sqlx::query_as::<_, Rota>(
            r#"
            SELECT id, employer_id, name, week_start, status, published_at, created_at
            FROM rotas
            WHERE employer_id = $1
            ORDER BY week_start DESC
            "#
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_rota_published(&self, rota_id: Uuid) -> Result<Option<Rota>, Error> {
        sqlx::query_as::<_, Rota>(
            r#"
            UPDATE rotas
            SET status = 'published'::rota_status, published_at = NOW()
            WHERE id = $1 AND COALESCE(status, 'draft'::rota_status) = 'draft'::rota_status
            RETURNING id, employer_id, name, week_start, status, published_at, created_at
            "#
        )
        .bind(rota_id)
        .fetch_optional(&self.pool)
        .await
    }
}
