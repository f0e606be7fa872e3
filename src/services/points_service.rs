//! Points ledger service
//!
//! Direct ledger grants and consistency repair. Bonus grants tied to a
//! problem go through `ProblemService::add_bonus` instead, which enforces the
//! bonus range.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{LedgerSource, PointsLedgerEntry, User},
    services::AdminGate,
    store::{DataStore, PointsGrant},
};

/// Points ledger service for business logic
pub struct PointsService;

impl PointsService {
    /// Grant points to a user directly, not linked to any problem.
    ///
    /// Admin-gated. Unlike problem bonuses, direct grants have no upper
    /// bound, only positivity.
    pub async fn grant(
        store: &dyn DataStore,
        actor: &User,
        user_id: Uuid,
        points: i64,
        reason: &str,
    ) -> AppResult<User> {
        AdminGate::ensure_admin(actor)?;

        if points < 1 {
            return Err(AppError::Validation(
                "Point grants must be a positive integer".to_string(),
            ));
        }
        if reason.trim().is_empty() {
            return Err(AppError::Validation(
                "A reason is required for direct grants".to_string(),
            ));
        }
        if user_id == actor.id {
            return Err(AppError::Validation(
                "Administrators cannot grant points to themselves".to_string(),
            ));
        }

        store
            .grant_points(PointsGrant {
                user_id,
                points,
                reason: reason.trim().to_string(),
                source: LedgerSource::AdminBonus,
                problem_id: None,
                admin_id: Some(actor.id),
            })
            .await
    }

    /// Consistency repair: recompute a user's totals from the ledger.
    pub async fn recompute(
        store: &dyn DataStore,
        actor: &User,
        user_id: Uuid,
    ) -> AppResult<User> {
        AdminGate::ensure_admin(actor)?;
        store.recompute_user(user_id).await
    }

    /// Ledger history for a user. Users may read their own; the
    /// administrator may read anyone's.
    pub async fn ledger(
        store: &dyn DataStore,
        actor: &User,
        user_id: Uuid,
    ) -> AppResult<Vec<PointsLedgerEntry>> {
        if actor.id != user_id {
            AdminGate::ensure_admin(actor)?;
        }
        store.ledger_for_user(user_id).await
    }
}
