//! Subscription service - following other authors
//!
//! A subscription view carries the followed author's profile plus a
//! short tail of their newest recipes, capped by the caller-supplied
//! `recipes_limit`.

use crate::error::ApiError;
use crate::repositories::{RecipeRepository, SubscriptionRepository, UserRecord, UserRepository};
use platebook_shared::types::{Page, RecipeSummary, SubscriptionView};
use sqlx::PgPool;
use uuid::Uuid;

use super::ledger::to_summary;

const SELF_OR_ALREADY: &str =
    "Are you trying to subscribe to yourself, or you are already subscribed to this user.";

/// Subscription service
pub struct SubscriptionService;

impl SubscriptionService {
    /// Subscribe the follower to another user
    ///
    /// A repeat subscribe removes the existing row before the conflict
    /// is reported, so a follow-up unsubscribe finds nothing to delete.
    pub async fn follow(
        db: &PgPool,
        follower_id: Uuid,
        target_id: Uuid,
        recipes_limit: i64,
    ) -> Result<SubscriptionView, ApiError> {
        let target = UserRepository::find_by_id(db, target_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if follower_id == target_id {
            return Err(ApiError::Validation(SELF_OR_ALREADY.to_string()));
        }

        if SubscriptionRepository::exists(db, follower_id, target_id)
            .await
            .map_err(ApiError::Internal)?
        {
            SubscriptionRepository::remove(db, follower_id, target_id)
                .await
                .map_err(ApiError::Internal)?;
            return Err(ApiError::Conflict(SELF_OR_ALREADY.to_string()));
        }

        let inserted = SubscriptionRepository::add(db, follower_id, target_id)
            .await
            .map_err(ApiError::Internal)?;

        // Lost an insert race; the row now belongs to the other request.
        if !inserted {
            return Err(ApiError::Conflict(SELF_OR_ALREADY.to_string()));
        }

        metrics::counter!("subscriptions_created_total").increment(1);

        Self::build_view(db, target, recipes_limit).await
    }

    /// Unsubscribe the follower from another user
    pub async fn unfollow(db: &PgPool, follower_id: Uuid, target_id: Uuid) -> Result<(), ApiError> {
        UserRepository::find_by_id(db, target_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let removed = SubscriptionRepository::remove(db, follower_id, target_id)
            .await
            .map_err(ApiError::Internal)?;

        if !removed {
            return Err(ApiError::BadRequest(
                "You were not subscribed to this person.".to_string(),
            ));
        }

        Ok(())
    }

    /// Page through everyone the follower is subscribed to
    pub async fn subscriptions(
        db: &PgPool,
        follower_id: Uuid,
        recipes_limit: i64,
        page: i64,
        limit: i64,
    ) -> Result<Page<SubscriptionView>, ApiError> {
        let offset = (page - 1) * limit;

        let count = SubscriptionRepository::count_following(db, follower_id)
            .await
            .map_err(ApiError::Internal)?;
        let followed = SubscriptionRepository::following(db, follower_id, limit, offset)
            .await
            .map_err(ApiError::Internal)?;

        let mut results = Vec::with_capacity(followed.len());
        for user in followed {
            results.push(Self::build_view(db, user, recipes_limit).await?);
        }

        Ok(Page { count, results })
    }

    /// Profile plus newest recipes for one followed author
    ///
    /// Callers only reach this for users the follower is subscribed
    /// to, so `is_subscribed` is always true.
    async fn build_view(
        db: &PgPool,
        user: UserRecord,
        recipes_limit: i64,
    ) -> Result<SubscriptionView, ApiError> {
        let recipes: Vec<RecipeSummary> = if recipes_limit > 0 {
            RecipeRepository::recent_by_author(db, user.id, recipes_limit)
                .await
                .map_err(ApiError::Internal)?
                .into_iter()
                .map(to_summary)
                .collect()
        } else {
            Vec::new()
        };

        Ok(SubscriptionView {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed: true,
            recipes,
        })
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require database - marked with #[ignore]
}
