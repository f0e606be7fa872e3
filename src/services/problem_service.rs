//! Problem service
//!
//! Submission, moderation, and bonus-point business rules. Storage-level
//! atomicity lives in the store; this layer owns validation, season gating,
//! and the admin gate.

use uuid::Uuid;

use crate::{
    constants::{
        MAX_BONUS_POINTS, MAX_PROBLEM_DESCRIPTION_LENGTH, MAX_PROBLEM_IMAGES,
        MAX_PROBLEM_TITLE_LENGTH, MIN_BONUS_POINTS,
    },
    error::{AppError, AppResult},
    mirror::{MirrorEvent, MirrorHandle},
    models::{Category, Problem, ProblemStatus, User},
    services::AdminGate,
    store::{DataStore, NewProblem},
};

/// Problem service for business logic
pub struct ProblemService;

impl ProblemService {
    /// Submit a new problem.
    ///
    /// Rejected while the season is not accepting submissions. On success the
    /// author's base point, problem counter, and level are updated atomically
    /// with the problem itself.
    pub async fn submit(
        store: &dyn DataStore,
        mirror: &MirrorHandle,
        author: &User,
        title: &str,
        description: &str,
        category: Category,
        images: Vec<String>,
    ) -> AppResult<Problem> {
        let settings = store.get_settings().await?;
        if !settings.accepts_submissions() {
            return Err(AppError::SeasonInactive);
        }

        let title = title.trim();
        let description = description.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        if title.len() as u64 > MAX_PROBLEM_TITLE_LENGTH {
            return Err(AppError::Validation("Title is too long".to_string()));
        }
        if description.is_empty() {
            return Err(AppError::Validation(
                "Description must not be empty".to_string(),
            ));
        }
        if description.len() as u64 > MAX_PROBLEM_DESCRIPTION_LENGTH {
            return Err(AppError::Validation("Description is too long".to_string()));
        }
        if images.len() > MAX_PROBLEM_IMAGES {
            return Err(AppError::Validation(format!(
                "At most {MAX_PROBLEM_IMAGES} images per submission"
            )));
        }

        let problem = store
            .create_problem_with_award(NewProblem {
                author_id: author.id,
                title: title.to_string(),
                description: description.to_string(),
                category,
                images,
            })
            .await?;

        tracing::info!(
            problem_id = %problem.id,
            author_id = %author.id,
            category = %category,
            "problem submitted"
        );
        mirror.push(MirrorEvent::add_survey(&problem));

        Ok(problem)
    }

    /// Get a problem by id
    pub async fn get(store: &dyn DataStore, id: Uuid) -> AppResult<Problem> {
        store
            .find_problem(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))
    }

    /// List all problems, newest first
    pub async fn list(store: &dyn DataStore) -> AppResult<Vec<Problem>> {
        store.list_problems().await
    }

    /// Grant bonus points on a problem to its author.
    ///
    /// Admin-gated; the bonus range is a business rule of bonus issuance, not
    /// just a UI constraint.
    pub async fn add_bonus(
        store: &dyn DataStore,
        mirror: &MirrorHandle,
        actor: &User,
        problem_id: Uuid,
        bonus: i64,
    ) -> AppResult<Problem> {
        AdminGate::ensure_admin(actor)?;

        if !(MIN_BONUS_POINTS..=MAX_BONUS_POINTS).contains(&bonus) {
            return Err(AppError::Validation(format!(
                "Bonus points must be between {MIN_BONUS_POINTS} and {MAX_BONUS_POINTS}"
            )));
        }

        let problem = Self::get(store, problem_id).await?;
        if problem.author_id == actor.id {
            return Err(AppError::Validation(
                "Administrators cannot grant bonus points to their own problems".to_string(),
            ));
        }

        let problem = store.add_bonus(problem_id, bonus, actor.id).await?;

        tracing::info!(
            problem_id = %problem.id,
            admin_id = %actor.id,
            bonus,
            "bonus points granted"
        );
        mirror.push(MirrorEvent::add_bonus_points(
            problem.id,
            problem.author_id,
            bonus,
        ));

        Ok(problem)
    }

    /// Flip the admin "seen" marker on a problem.
    ///
    /// Deliberately a toggle: calling twice returns the problem to its
    /// original reviewed state and clears the audit fields.
    pub async fn toggle_reviewed(
        store: &dyn DataStore,
        actor: &User,
        problem_id: Uuid,
    ) -> AppResult<Problem> {
        AdminGate::ensure_admin(actor)?;
        store.toggle_reviewed(problem_id, actor.id).await
    }

    /// Set the moderation status of a problem
    pub async fn set_status(
        store: &dyn DataStore,
        actor: &User,
        problem_id: Uuid,
        status: ProblemStatus,
    ) -> AppResult<Problem> {
        AdminGate::ensure_admin(actor)?;
        store.set_problem_status(problem_id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, Role};
    use crate::store::contract::seed_user;
    use crate::store::{MemoryStore, SeasonDefaults};

    fn store_with_active(active: bool) -> MemoryStore {
        MemoryStore::new(SeasonDefaults {
            name: "Test Season".to_string(),
            length_days: 30,
            active,
        })
    }

    async fn submit_ok(store: &MemoryStore, author: &User) -> Problem {
        ProblemService::submit(
            store,
            &MirrorHandle::disabled(),
            author,
            "broken window",
            "the window in room 3 does not close",
            Category::Facility,
            vec![],
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_rejected_while_inactive_without_side_effects() {
        let store = store_with_active(false);
        let author = seed_user(&store, "author", Role::Member).await;

        let result = ProblemService::submit(
            &store,
            &MirrorHandle::disabled(),
            &author,
            "too late",
            "season closed",
            Category::Other,
            vec![],
        )
        .await;
        assert!(matches!(result, Err(AppError::SeasonInactive)));

        // No problem, no ledger entry, no point change
        assert!(store.list_problems().await.unwrap().is_empty());
        let author = store.find_user(author.id).await.unwrap().unwrap();
        assert_eq!(author.total_points, 0);
        assert!(store.ledger_for_user(author.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejected_when_finished() {
        let store = store_with_active(true);
        let author = seed_user(&store, "author", Role::Member).await;

        let mut settings = store.get_settings().await.unwrap();
        settings.is_active = false;
        settings.is_finished = true;
        store.save_settings(&settings).await.unwrap();

        let result = ProblemService::submit(
            &store,
            &MirrorHandle::disabled(),
            &author,
            "late",
            "finished season",
            Category::Other,
            vec![],
        )
        .await;
        assert!(matches!(result, Err(AppError::SeasonInactive)));
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let store = store_with_active(true);
        let author = seed_user(&store, "author", Role::Member).await;
        let mirror = MirrorHandle::disabled();

        let empty_title =
            ProblemService::submit(&store, &mirror, &author, "  ", "desc", Category::Other, vec![])
                .await;
        assert!(matches!(empty_title, Err(AppError::Validation(_))));

        let empty_description =
            ProblemService::submit(&store, &mirror, &author, "title", "", Category::Other, vec![])
                .await;
        assert!(matches!(empty_description, Err(AppError::Validation(_))));

        let too_many_images = ProblemService::submit(
            &store,
            &mirror,
            &author,
            "title",
            "desc",
            Category::Other,
            vec!["img".to_string(); MAX_PROBLEM_IMAGES + 1],
        )
        .await;
        assert!(matches!(too_many_images, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_bonus_range_boundaries() {
        let store = store_with_active(true);
        let admin = seed_user(&store, "admin", Role::Admin).await;
        let author = seed_user(&store, "author", Role::Member).await;
        let mirror = MirrorHandle::disabled();
        let problem = submit_ok(&store, &author).await;

        let eleven =
            ProblemService::add_bonus(&store, &mirror, &admin, problem.id, 11).await;
        assert!(matches!(eleven, Err(AppError::Validation(_))));
        let zero = ProblemService::add_bonus(&store, &mirror, &admin, problem.id, 0).await;
        assert!(matches!(zero, Err(AppError::Validation(_))));

        let ten = ProblemService::add_bonus(&store, &mirror, &admin, problem.id, 10)
            .await
            .unwrap();
        assert_eq!(ten.points, 11); // base 1 + bonus 10

        let author = store.find_user(author.id).await.unwrap().unwrap();
        assert_eq!(author.total_points, 11);
        assert_eq!(author.level, Level::for_points(11));
    }

    #[tokio::test]
    async fn test_bonus_requires_admin() {
        let store = store_with_active(true);
        let member = seed_user(&store, "member", Role::Member).await;
        let author = seed_user(&store, "author", Role::Member).await;
        let problem = submit_ok(&store, &author).await;

        let result = ProblemService::add_bonus(
            &store,
            &MirrorHandle::disabled(),
            &member,
            problem.id,
            5,
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_bonus_self_target_rejected() {
        let store = store_with_active(true);
        let admin = seed_user(&store, "admin", Role::Admin).await;
        let own = submit_ok(&store, &admin).await;

        let result =
            ProblemService::add_bonus(&store, &MirrorHandle::disabled(), &admin, own.id, 5).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_toggle_reviewed_twice_restores_state() {
        let store = store_with_active(true);
        let admin = seed_user(&store, "admin", Role::Admin).await;
        let author = seed_user(&store, "author", Role::Member).await;
        let problem = submit_ok(&store, &author).await;

        let marked = ProblemService::toggle_reviewed(&store, &admin, problem.id)
            .await
            .unwrap();
        assert!(marked.reviewed);
        assert!(marked.reviewed_at.is_some());

        let unmarked = ProblemService::toggle_reviewed(&store, &admin, problem.id)
            .await
            .unwrap();
        assert!(!unmarked.reviewed);
        assert!(unmarked.reviewed_at.is_none());
        assert!(unmarked.reviewed_by.is_none());
    }
}
