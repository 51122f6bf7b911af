//! Subscription repository - who follows whom

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserRecord;

/// Subscription ledger repository
pub struct SubscriptionRepository;

impl SubscriptionRepository {
    /// Record that `follower_id` follows `followed_id`
    ///
    /// Returns false if the subscription already existed.
    pub async fn add(db: &PgPool, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a subscription
    ///
    /// Returns false if there was nothing to remove.
    pub async fn remove(db: &PgPool, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE follower_id = $1 AND followed_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the follower is currently subscribed to this user
    pub async fn exists(db: &PgPool, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE follower_id = $1 AND followed_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(db)
        .await?;

        Ok(found)
    }

    /// Which of the given users the follower is subscribed to
    pub async fn followed_ids(
        db: &PgPool,
        follower_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT followed_id FROM subscriptions
            WHERE follower_id = $1 AND followed_id = ANY($2)
            "#,
        )
        .bind(follower_id)
        .bind(candidate_ids)
        .fetch_all(db)
        .await?;

        Ok(ids)
    }

    /// Page of users the follower is subscribed to, newest
    /// subscription first
    pub async fn following(
        db: &PgPool,
        follower_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   u.password_hash, u.created_at, u.updated_at
            FROM subscriptions s
            JOIN users u ON u.id = s.followed_id
            WHERE s.follower_id = $1
            ORDER BY s.created_at DESC, u.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(follower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(users)
    }

    /// How many users the follower is subscribed to
    pub async fn count_following(db: &PgPool, follower_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM subscriptions WHERE follower_id = $1
            "#,
        )
        .bind(follower_id)
        .fetch_one(db)
        .await?;

        Ok(count)
    }
}
