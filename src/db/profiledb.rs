// db/profiledb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::*;
use crate::service::review_service::ReviewAggregate;

#[async_trait]
pub trait ProfileExt {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, Error>;

    async fn get_profiles_by_moderation_status(
        &self,
        status: ModerationStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Profile>, Error>;

    async fn update_moderation_status(
        &self,
        profile_id: Uuid,
        status: ModerationStatus,
    ) -> Result<Profile, Error>;

    async fn update_review_aggregates(
        &self,
        profile_id: Uuid,
        aggregate: &ReviewAggregate,
    ) -> Result<Profile, Error>;
}

#[async_trait]
impl ProfileExt for DBClient {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, role, moderation_status,
                   average_rating, total_reviews, would_recommend_percentage,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_profiles_by_moderation_status(
        &self,
        status: ModerationStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Profile>, Error> {
        // Unset moderation status counts as pending
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, role, moderation_status,
                   average_rating, total_reviews, would_recommend_percentage,
                   created_at, updated_at
            FROM profiles
            WHERE COALESCE(moderation_status, 'pending'::moderation_status) = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_moderation_status(
        &self,
        profile_id: Uuid,
        status: ModerationStatus,
    ) -> Result<Profile, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET moderation_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, full_name, role, moderation_status,
                      average_rating, total_reviews, would_recommend_percentage,
                      created_at, updated_at
            "#
        )
        .bind(profile_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_review_aggregates(
        &self,
        profile_id: Uuid,
        aggregate: &ReviewAggregate,
    ) -> Result<Profile, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET average_rating = $2,
                total_reviews = $3,
                would_recommend_percentage = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, full_name, role, moderation_status,
                      average_rating, total_reviews, would_recommend_percentage,
                      created_at, updated_at
            "#
        )
        .bind(profile_id)
        .bind(aggregate.average_rating)
        .bind(aggregate.total_reviews)
        .bind(aggregate.would_recommend_percentage)
        .fetch_one(&self.pool)
        .await
    }
}
