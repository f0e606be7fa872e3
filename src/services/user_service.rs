//! User service
//!
//! Profile upsert on sign-in, directory reads, leaderboard, and user
//! removal. Role assignment happens here at upsert time; nothing downstream
//! ever looks at emails again.

use uuid::Uuid;

use crate::{
    constants::{DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT},
    error::{AppError, AppResult},
    mirror::{MirrorEvent, MirrorHandle},
    models::User,
    services::AdminGate,
    store::{DataStore, UserIdentity},
};

/// User service for business logic
pub struct UserService;

impl UserService {
    /// Upsert the signed-in identity into the user collection.
    ///
    /// Called on every authenticated request; the upsert refreshes the
    /// profile fields and `last_active` while leaving totals untouched. The
    /// role is recomputed from the reserved administrator email so a config
    /// change takes effect on the next sign-in.
    pub async fn ensure_user(
        store: &dyn DataStore,
        mirror: &MirrorHandle,
        id: Uuid,
        email: &str,
        full_name: &str,
        admin_email: &str,
    ) -> AppResult<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::Validation("Email must not be empty".to_string()));
        }

        let user = store
            .upsert_user(UserIdentity {
                id,
                email: email.to_string(),
                full_name: full_name.trim().to_string(),
                role: AdminGate::role_for_email(email, admin_email),
            })
            .await?;

        mirror.push(MirrorEvent::update_user(&user));
        Ok(user)
    }

    /// Get a user by id
    pub async fn get(store: &dyn DataStore, id: Uuid) -> AppResult<User> {
        store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Full user directory, admin only
    pub async fn list(store: &dyn DataStore, actor: &User) -> AppResult<Vec<User>> {
        AdminGate::ensure_admin(actor)?;
        store.list_users().await
    }

    /// Remove a user and everything they contributed.
    ///
    /// Admin-gated; the administrator cannot remove their own account.
    pub async fn delete(store: &dyn DataStore, actor: &User, user_id: Uuid) -> AppResult<()> {
        AdminGate::ensure_admin(actor)?;
        if user_id == actor.id {
            return Err(AppError::Validation(
                "Administrators cannot delete their own account".to_string(),
            ));
        }

        store.delete_user(user_id).await?;
        tracing::info!(user_id = %user_id, admin_id = %actor.id, "user deleted");
        Ok(())
    }

    /// Public leaderboard. `limit` of zero falls back to the default page
    /// size; oversized limits are clamped.
    pub async fn leaderboard(store: &dyn DataStore, limit: Option<usize>) -> AppResult<Vec<User>> {
        let limit = match limit {
            None | Some(0) => DEFAULT_LEADERBOARD_LIMIT,
            Some(n) => n.min(MAX_LEADERBOARD_LIMIT),
        };
        store.leaderboard(limit).await
    }
}
