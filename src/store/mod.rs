//! Persistence layer
//!
//! This module defines the [`DataStore`] capability trait and its two
//! interchangeable backends: an in-memory store for local/simulated
//! deployments and a Postgres-backed remote store. Callers only ever see
//! `Arc<dyn DataStore>`; the backend is a startup-time choice.
//!
//! Both backends must expose identical semantics for every operation,
//! including the error taxonomy, leaderboard ordering, and the atomicity of
//! compound writes. The contract test suite at the bottom of this file runs
//! against both to guarantee parity.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::SeasonConfig,
    error::AppResult,
    models::{
        Category, LedgerSource, PointsLedgerEntry, Problem, ProblemStatus, Role, SeasonSettings,
        SeasonTotals, User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Identity supplied by the external provider on sign-in
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

/// A validated new problem submission
#[derive(Debug, Clone)]
pub struct NewProblem {
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub images: Vec<String>,
}

/// A point grant to append to the ledger
#[derive(Debug, Clone)]
pub struct PointsGrant {
    pub user_id: Uuid,
    pub points: i64,
    pub reason: String,
    pub source: LedgerSource,
    pub problem_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
}

/// Season settings used when no record exists yet
#[derive(Debug, Clone)]
pub struct SeasonDefaults {
    pub name: String,
    pub length_days: i64,
    pub active: bool,
}

impl SeasonDefaults {
    pub fn from_config(config: &SeasonConfig) -> Self {
        Self {
            name: config.default_name.clone(),
            length_days: config.default_length_days,
            active: config.default_active,
        }
    }

    /// Build the initial settings record
    pub fn initial_settings(&self, now: DateTime<Utc>) -> SeasonSettings {
        SeasonSettings {
            current_season: self.name.clone(),
            season_start_date: now,
            season_end_date: now + chrono::Duration::days(self.length_days),
            is_active: self.active,
            is_finished: false,
        }
    }
}

/// Storage capability contract shared by both backends.
///
/// Compound operations (`create_problem_with_award`, `add_bonus`,
/// `toggle_reviewed`, `apply_reset`) must be all-or-nothing from the caller's
/// point of view; each backend guarantees that its own way (a transaction or
/// a single critical section).
#[async_trait]
pub trait DataStore: Send + Sync {
    // -- users -----------------------------------------------------------

    /// Idempotent upsert keyed by user id; refreshes email, full name, role
    /// and `last_active` on every call. Fails with `Database` when the email
    /// is already held by a different id.
    async fn upsert_user(&self, identity: UserIdentity) -> AppResult<User>;

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Hard delete: cascades to the user's problems and ledger entries.
    /// Fails with `NotFound` when the user does not exist.
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    // -- problems --------------------------------------------------------

    /// Create a problem and grant its author the submission base point,
    /// atomically: problem insert, ledger append, author totals and level.
    /// Fails with `NotFound` when the author does not exist.
    async fn create_problem_with_award(&self, new_problem: NewProblem) -> AppResult<Problem>;

    async fn find_problem(&self, id: Uuid) -> AppResult<Option<Problem>>;

    /// Full materialization, ordered by `created_at` descending.
    async fn list_problems(&self) -> AppResult<Vec<Problem>>;

    /// Add bonus points to a problem and grant them to its author,
    /// atomically. Range validation happens in the service layer.
    async fn add_bonus(&self, problem_id: Uuid, bonus: i64, admin_id: Uuid) -> AppResult<Problem>;

    /// Flip the reviewed marker; sets `reviewed_at`/`reviewed_by` when
    /// turning on, clears both when turning off.
    async fn toggle_reviewed(&self, problem_id: Uuid, admin_id: Uuid) -> AppResult<Problem>;

    async fn set_problem_status(
        &self,
        problem_id: Uuid,
        status: ProblemStatus,
    ) -> AppResult<Problem>;

    // -- points ledger ---------------------------------------------------

    /// Append a ledger entry and update the recipient's totals, level and
    /// `last_active`, atomically. Fails with `NotFound` for a missing user.
    async fn grant_points(&self, grant: PointsGrant) -> AppResult<User>;

    async fn ledger_for_user(&self, user_id: Uuid) -> AppResult<Vec<PointsLedgerEntry>>;

    /// Consistency repair: recompute totals from the ledger and the problem
    /// collection, reapply the leveling policy. Idempotent.
    async fn recompute_user(&self, user_id: Uuid) -> AppResult<User>;

    // -- leaderboard -----------------------------------------------------

    /// Users with `total_points > 0`, administrator excluded, ordered by
    /// `total_points` descending with earlier `joined_at` breaking ties.
    async fn leaderboard(&self, limit: usize) -> AppResult<Vec<User>>;

    // -- season settings -------------------------------------------------

    /// Read the settings singleton, creating it with defaults on first
    /// access.
    async fn get_settings(&self) -> AppResult<SeasonSettings>;

    async fn save_settings(&self, settings: &SeasonSettings) -> AppResult<()>;

    /// Season reset as a single logical unit: delete all problems and ledger
    /// entries, zero every user's totals and level, install the new season
    /// settings. Safe to re-run.
    async fn apply_reset(
        &self,
        new_season: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<SeasonSettings>;

    /// Aggregate counters for the season report.
    async fn season_totals(&self) -> AppResult<SeasonTotals>;
}

// ---------------------------------------------------------------------------
// Backend contract suite
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod contract {
    //! Shared checks run against every backend. Each check seeds its own
    //! users with fresh ids/emails so the suite can run sequentially on one
    //! store instance.

    use super::*;
    use crate::constants::reasons;
    use crate::error::AppError;
    use crate::models::Level;

    pub async fn seed_user(store: &dyn DataStore, name: &str, role: Role) -> User {
        let id = Uuid::new_v4();
        store
            .upsert_user(UserIdentity {
                id,
                email: format!("{name}-{id}@example.com"),
                full_name: name.to_string(),
                role,
            })
            .await
            .expect("seed user")
    }

    pub async fn submit(store: &dyn DataStore, author: &User, title: &str) -> Problem {
        store
            .create_problem_with_award(NewProblem {
                author_id: author.id,
                title: title.to_string(),
                description: "something is broken".to_string(),
                category: Category::Facility,
                images: vec![],
            })
            .await
            .expect("create problem")
    }

    async fn ledger_sum(store: &dyn DataStore, user_id: Uuid) -> i64 {
        store
            .ledger_for_user(user_id)
            .await
            .expect("ledger")
            .iter()
            .map(|e| e.points)
            .sum()
    }

    pub async fn check_upsert_is_idempotent(store: &dyn DataStore) {
        let user = seed_user(store, "upsert", Role::Member).await;
        let again = store
            .upsert_user(UserIdentity {
                id: user.id,
                email: user.email.clone(),
                full_name: "Renamed".to_string(),
                role: Role::Member,
            })
            .await
            .expect("second upsert");

        assert_eq!(again.id, user.id);
        assert_eq!(again.full_name, "Renamed");
        assert_eq!(again.total_points, 0);
        assert_eq!(store.list_users().await.unwrap().iter().filter(|u| u.id == user.id).count(), 1);
    }

    pub async fn check_upsert_rejects_duplicate_email(store: &dyn DataStore) {
        let existing = seed_user(store, "email-holder", Role::Member).await;

        let result = store
            .upsert_user(UserIdentity {
                id: Uuid::new_v4(),
                email: existing.email.clone(),
                full_name: "Impostor".to_string(),
                role: Role::Member,
            })
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));

        // The existing account is untouched
        let unchanged = store.find_user(existing.id).await.unwrap().unwrap();
        assert_eq!(unchanged.full_name, existing.full_name);
    }

    pub async fn check_submission_awards_base_point(store: &dyn DataStore) {
        let author = seed_user(store, "author", Role::Member).await;
        let problem = submit(store, &author, "leaky tap").await;

        assert_eq!(problem.points, 1);
        assert_eq!(problem.status, ProblemStatus::Pending);
        assert!(!problem.reviewed);

        let author = store.find_user(author.id).await.unwrap().unwrap();
        assert_eq!(author.total_points, 1);
        assert_eq!(author.total_problems, 1);
        assert_eq!(author.level, Level::Novice);
        assert_eq!(ledger_sum(store, author.id).await, author.total_points);

        let entries = store.ledger_for_user(author.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, LedgerSource::Submission);
        assert_eq!(entries[0].problem_id, Some(problem.id));
    }

    pub async fn check_submission_for_unknown_author_fails(store: &dyn DataStore) {
        let result = store
            .create_problem_with_award(NewProblem {
                author_id: Uuid::new_v4(),
                title: "ghost".to_string(),
                description: "no author".to_string(),
                category: Category::Other,
                images: vec![],
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    pub async fn check_bonus_updates_problem_and_author(store: &dyn DataStore) {
        let admin = seed_user(store, "admin", Role::Admin).await;
        let author = seed_user(store, "bonus-author", Role::Member).await;
        let problem = submit(store, &author, "broken light").await;

        let updated = store.add_bonus(problem.id, 9, admin.id).await.unwrap();
        assert_eq!(updated.points, 10);

        let author = store.find_user(author.id).await.unwrap().unwrap();
        assert_eq!(author.total_points, 10);
        assert_eq!(author.level, Level::Master);
        assert_eq!(ledger_sum(store, author.id).await, 10);

        let bonus_entry = store
            .ledger_for_user(author.id)
            .await
            .unwrap()
            .into_iter()
            .find(|e| e.source == LedgerSource::AdminBonus)
            .expect("bonus entry");
        assert_eq!(bonus_entry.points, 9);
        assert_eq!(bonus_entry.admin_id, Some(admin.id));
    }

    pub async fn check_bonus_on_missing_problem_fails(store: &dyn DataStore) {
        let admin = seed_user(store, "admin2", Role::Admin).await;
        let result = store.add_bonus(Uuid::new_v4(), 5, admin.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    pub async fn check_toggle_reviewed_round_trips(store: &dyn DataStore) {
        let admin = seed_user(store, "admin3", Role::Admin).await;
        let author = seed_user(store, "toggle-author", Role::Member).await;
        let problem = submit(store, &author, "wobbly chair").await;

        let marked = store.toggle_reviewed(problem.id, admin.id).await.unwrap();
        assert!(marked.reviewed);
        assert!(marked.reviewed_at.is_some());
        assert_eq!(marked.reviewed_by, Some(admin.id));

        let unmarked = store.toggle_reviewed(problem.id, admin.id).await.unwrap();
        assert!(!unmarked.reviewed);
        assert!(unmarked.reviewed_at.is_none());
        assert!(unmarked.reviewed_by.is_none());
    }

    pub async fn check_problem_list_is_newest_first(store: &dyn DataStore) {
        let author = seed_user(store, "lister", Role::Member).await;
        let first = submit(store, &author, "first").await;
        let second = submit(store, &author, "second").await;

        let listed = store.list_problems().await.unwrap();
        let pos_first = listed.iter().position(|p| p.id == first.id).unwrap();
        let pos_second = listed.iter().position(|p| p.id == second.id).unwrap();
        assert!(pos_second < pos_first, "newest submission listed first");
    }

    pub async fn check_leaderboard_order_and_exclusions(store: &dyn DataStore) {
        let admin = seed_user(store, "board-admin", Role::Admin).await;
        let high = seed_user(store, "high", Role::Member).await;
        let early = seed_user(store, "early", Role::Member).await;
        let late = seed_user(store, "late", Role::Member).await;
        let zero = seed_user(store, "zero", Role::Member).await;

        for (user, points) in [(&admin, 50), (&high, 10), (&early, 5), (&late, 5)] {
            store
                .grant_points(PointsGrant {
                    user_id: user.id,
                    points,
                    reason: reasons::SUBMISSION.to_string(),
                    source: LedgerSource::Submission,
                    problem_id: None,
                    admin_id: None,
                })
                .await
                .unwrap();
        }

        let board = store.leaderboard(100).await.unwrap();
        assert!(board.iter().all(|u| u.role != Role::Admin));
        assert!(board.iter().all(|u| u.total_points > 0));
        assert!(!board.iter().any(|u| u.id == zero.id));

        let pos_high = board.iter().position(|u| u.id == high.id).unwrap();
        let pos_early = board.iter().position(|u| u.id == early.id).unwrap();
        let pos_late = board.iter().position(|u| u.id == late.id).unwrap();
        assert!(pos_high < pos_early);
        // joined_at ascending breaks the 5-point tie
        assert!(pos_early < pos_late);
    }

    pub async fn check_grant_to_missing_user_fails(store: &dyn DataStore) {
        let result = store
            .grant_points(PointsGrant {
                user_id: Uuid::new_v4(),
                points: 1,
                reason: reasons::SUBMISSION.to_string(),
                source: LedgerSource::Submission,
                problem_id: None,
                admin_id: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    pub async fn check_recompute_matches_ledger(store: &dyn DataStore) {
        let author = seed_user(store, "recompute", Role::Member).await;
        submit(store, &author, "one").await;
        submit(store, &author, "two").await;

        let repaired = store.recompute_user(author.id).await.unwrap();
        assert_eq!(repaired.total_points, ledger_sum(store, author.id).await);
        assert_eq!(repaired.total_problems, 2);
        assert_eq!(repaired.level, Level::for_points(repaired.total_points));

        // Idempotent
        let again = store.recompute_user(author.id).await.unwrap();
        assert_eq!(again.total_points, repaired.total_points);
    }

    pub async fn check_settings_singleton_round_trip(store: &dyn DataStore) {
        let settings = store.get_settings().await.unwrap();
        assert!(!settings.is_finished);

        let mut updated = settings.clone();
        updated.current_season = "Contract Season".to_string();
        updated.is_active = false;
        store.save_settings(&updated).await.unwrap();

        let read_back = store.get_settings().await.unwrap();
        assert_eq!(read_back.current_season, "Contract Season");
        assert!(!read_back.is_active);

        // Restore an active season for subsequent checks
        updated.is_active = true;
        store.save_settings(&updated).await.unwrap();
    }

    pub async fn check_reset_clears_everything(store: &dyn DataStore) {
        let author = seed_user(store, "reset-author", Role::Member).await;
        submit(store, &author, "doomed").await;

        let now = Utc::now();
        let settings = store
            .apply_reset("Fresh Season", now, now + chrono::Duration::days(30))
            .await
            .unwrap();
        assert_eq!(settings.current_season, "Fresh Season");
        assert!(settings.is_active);
        assert!(!settings.is_finished);

        assert!(store.list_problems().await.unwrap().is_empty());
        let author = store.find_user(author.id).await.unwrap().unwrap();
        assert_eq!(author.total_points, 0);
        assert_eq!(author.total_problems, 0);
        assert_eq!(author.level, Level::Novice);
        assert!(store.ledger_for_user(author.id).await.unwrap().is_empty());
        assert!(store.leaderboard(100).await.unwrap().is_empty());
    }

    pub async fn check_delete_user_cascades(store: &dyn DataStore) {
        let author = seed_user(store, "deleted", Role::Member).await;
        let problem = submit(store, &author, "orphaned").await;

        store.delete_user(author.id).await.unwrap();
        assert!(store.find_user(author.id).await.unwrap().is_none());
        assert!(store.find_problem(problem.id).await.unwrap().is_none());
        assert!(store.ledger_for_user(author.id).await.unwrap().is_empty());

        let result = store.delete_user(author.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    /// Run every check in sequence against one store instance.
    pub async fn run_all(store: &dyn DataStore) {
        check_upsert_is_idempotent(store).await;
        check_upsert_rejects_duplicate_email(store).await;
        check_submission_awards_base_point(store).await;
        check_submission_for_unknown_author_fails(store).await;
        check_bonus_updates_problem_and_author(store).await;
        check_bonus_on_missing_problem_fails(store).await;
        check_toggle_reviewed_round_trips(store).await;
        check_problem_list_is_newest_first(store).await;
        check_grant_to_missing_user_fails(store).await;
        check_recompute_matches_ledger(store).await;
        check_settings_singleton_round_trip(store).await;
        check_leaderboard_order_and_exclusions(store).await;
        check_reset_clears_everything(store).await;
        check_delete_user_cascades(store).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_SEASON_LENGTH_DAYS, DEFAULT_SEASON_NAME};

    fn memory_store() -> MemoryStore {
        MemoryStore::new(SeasonDefaults {
            name: DEFAULT_SEASON_NAME.to_string(),
            length_days: DEFAULT_SEASON_LENGTH_DAYS,
            active: true,
        })
    }

    #[tokio::test]
    async fn memory_backend_satisfies_contract() {
        let store = memory_store();
        contract::run_all(&store).await;
    }

    /// Parity run against a real Postgres instance. Requires
    /// `TEST_DATABASE_URL` pointing at a disposable database.
    #[tokio::test]
    #[ignore]
    async fn postgres_backend_satisfies_contract() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .expect("connect to test database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("run migrations");

        let store = PostgresStore::new(
            pool,
            SeasonDefaults {
                name: DEFAULT_SEASON_NAME.to_string(),
                length_days: DEFAULT_SEASON_LENGTH_DAYS,
                active: true,
            },
        );
        contract::run_all(&store).await;
    }
}
