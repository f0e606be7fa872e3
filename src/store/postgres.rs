//! Postgres backend
//!
//! Remote document-store variant of [`DataStore`]. Compound writes run inside
//! transactions so a crash mid-operation never leaves a problem without its
//! base point or a ledger entry without its aggregate update.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        LedgerSource, Level, PointsLedgerEntry, Problem, ProblemStatus, SeasonSettings,
        SeasonTotals, User,
    },
    store::{DataStore, NewProblem, PointsGrant, SeasonDefaults, UserIdentity},
};

use async_trait::async_trait;

/// Postgres-backed data store
pub struct PostgresStore {
    pool: PgPool,
    defaults: SeasonDefaults,
}

impl PostgresStore {
    pub fn new(pool: PgPool, defaults: SeasonDefaults) -> Self {
        Self { pool, defaults }
    }

    /// Append a ledger entry and update the recipient inside an open
    /// transaction. The level is recomputed in Rust so the leveling policy
    /// has a single source of truth.
    async fn grant_in_txn(
        txn: &mut Transaction<'_, Postgres>,
        grant: &PointsGrant,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET total_points = total_points + $2, last_active = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(grant.user_id)
        .bind(grant.points)
        .fetch_optional(&mut **txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let level = Level::for_points(user.total_points);
        let user = sqlx::query_as::<_, User>(
            r#"UPDATE users SET level = $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(grant.user_id)
        .bind(level)
        .fetch_one(&mut **txn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO points_ledger (user_id, problem_id, points, reason, source, admin_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(grant.user_id)
        .bind(grant.problem_id)
        .bind(grant.points)
        .bind(&grant.reason)
        .bind(grant.source)
        .bind(grant.admin_id)
        .execute(&mut **txn)
        .await?;

        Ok(user)
    }

    async fn upsert_settings(
        pool: &PgPool,
        settings: &SeasonSettings,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO season_settings
                (id, current_season, season_start_date, season_end_date, is_active, is_finished)
            VALUES ('current', $1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                current_season = EXCLUDED.current_season,
                season_start_date = EXCLUDED.season_start_date,
                season_end_date = EXCLUDED.season_end_date,
                is_active = EXCLUDED.is_active,
                is_finished = EXCLUDED.is_finished
            "#,
        )
        .bind(&settings.current_season)
        .bind(settings.season_start_date)
        .bind(settings.season_end_date)
        .bind(settings.is_active)
        .bind(settings.is_finished)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DataStore for PostgresStore {
    async fn upsert_user(&self, identity: UserIdentity) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, full_name, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role,
                last_active = NOW()
            RETURNING *
            "#,
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.full_name)
        .bind(identity.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT * FROM users ORDER BY joined_at DESC"#)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        // Problems and ledger entries go with the user (ON DELETE CASCADE)
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn create_problem_with_award(&self, new_problem: NewProblem) -> AppResult<Problem> {
        let mut txn = self.pool.begin().await?;

        let author_exists: Option<i32> =
            sqlx::query_scalar(r#"SELECT 1 FROM users WHERE id = $1"#)
                .bind(new_problem.author_id)
                .fetch_optional(&mut *txn)
                .await?;
        if author_exists.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let problem = sqlx::query_as::<_, Problem>(
            r#"
            INSERT INTO problems (title, description, category, images, author_id, points)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new_problem.title)
        .bind(&new_problem.description)
        .bind(new_problem.category)
        .bind(&new_problem.images)
        .bind(new_problem.author_id)
        .bind(crate::constants::BASE_SUBMISSION_POINTS)
        .fetch_one(&mut *txn)
        .await?;

        Self::grant_in_txn(
            &mut txn,
            &PointsGrant {
                user_id: new_problem.author_id,
                points: crate::constants::BASE_SUBMISSION_POINTS,
                reason: crate::constants::reasons::SUBMISSION.to_string(),
                source: LedgerSource::Submission,
                problem_id: Some(problem.id),
                admin_id: None,
            },
        )
        .await?;

        sqlx::query(r#"UPDATE users SET total_problems = total_problems + 1 WHERE id = $1"#)
            .bind(new_problem.author_id)
            .execute(&mut *txn)
            .await?;

        txn.commit().await?;
        Ok(problem)
    }

    async fn find_problem(&self, id: Uuid) -> AppResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(r#"SELECT * FROM problems WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(problem)
    }

    async fn list_problems(&self) -> AppResult<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            r#"SELECT * FROM problems ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(problems)
    }

    async fn add_bonus(&self, problem_id: Uuid, bonus: i64, admin_id: Uuid) -> AppResult<Problem> {
        let mut txn = self.pool.begin().await?;

        let problem = sqlx::query_as::<_, Problem>(
            r#"UPDATE problems SET points = points + $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(problem_id)
        .bind(bonus)
        .fetch_optional(&mut *txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

        Self::grant_in_txn(
            &mut txn,
            &PointsGrant {
                user_id: problem.author_id,
                points: bonus,
                reason: crate::constants::reasons::ADMIN_BONUS.to_string(),
                source: LedgerSource::AdminBonus,
                problem_id: Some(problem_id),
                admin_id: Some(admin_id),
            },
        )
        .await?;

        txn.commit().await?;
        Ok(problem)
    }

    async fn toggle_reviewed(&self, problem_id: Uuid, admin_id: Uuid) -> AppResult<Problem> {
        // Single statement: CASE arms read the pre-update row values
        let problem = sqlx::query_as::<_, Problem>(
            r#"
            UPDATE problems
            SET reviewed = NOT reviewed,
                reviewed_at = CASE WHEN reviewed THEN NULL ELSE NOW() END,
                reviewed_by = CASE WHEN reviewed THEN NULL ELSE $2 END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(problem_id)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

        Ok(problem)
    }

    async fn set_problem_status(
        &self,
        problem_id: Uuid,
        status: ProblemStatus,
    ) -> AppResult<Problem> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"UPDATE problems SET status = $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(problem_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

        Ok(problem)
    }

    async fn grant_points(&self, grant: PointsGrant) -> AppResult<User> {
        let mut txn = self.pool.begin().await?;
        let user = Self::grant_in_txn(&mut txn, &grant).await?;
        txn.commit().await?;
        Ok(user)
    }

    async fn ledger_for_user(&self, user_id: Uuid) -> AppResult<Vec<PointsLedgerEntry>> {
        let entries = sqlx::query_as::<_, PointsLedgerEntry>(
            r#"SELECT * FROM points_ledger WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn recompute_user(&self, user_id: Uuid) -> AppResult<User> {
        let mut txn = self.pool.begin().await?;

        let total_points: i64 = sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(points), 0)::BIGINT FROM points_ledger WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(&mut *txn)
        .await?;

        let total_problems: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM problems WHERE author_id = $1"#)
                .bind(user_id)
                .fetch_one(&mut *txn)
                .await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET total_points = $2, total_problems = $3, level = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(total_points)
        .bind(total_problems)
        .bind(Level::for_points(total_points))
        .fetch_optional(&mut *txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        txn.commit().await?;
        Ok(user)
    }

    async fn leaderboard(&self, limit: usize) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE total_points > 0 AND role <> 'admin'
            ORDER BY total_points DESC, joined_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn get_settings(&self) -> AppResult<SeasonSettings> {
        if let Some(settings) = sqlx::query_as::<_, SeasonSettings>(
            r#"SELECT * FROM season_settings WHERE id = 'current'"#,
        )
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(settings);
        }

        let initial = self.defaults.initial_settings(Utc::now());
        sqlx::query(
            r#"
            INSERT INTO season_settings
                (id, current_season, season_start_date, season_end_date, is_active, is_finished)
            VALUES ('current', $1, $2, $3, $4, FALSE)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&initial.current_season)
        .bind(initial.season_start_date)
        .bind(initial.season_end_date)
        .bind(initial.is_active)
        .execute(&self.pool)
        .await?;

        // Re-read: a concurrent first access may have won the insert
        let settings = sqlx::query_as::<_, SeasonSettings>(
            r#"SELECT * FROM season_settings WHERE id = 'current'"#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    async fn save_settings(&self, settings: &SeasonSettings) -> AppResult<()> {
        Self::upsert_settings(&self.pool, settings).await
    }

    async fn apply_reset(
        &self,
        new_season: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<SeasonSettings> {
        let mut txn = self.pool.begin().await?;

        sqlx::query(r#"DELETE FROM points_ledger"#).execute(&mut *txn).await?;
        sqlx::query(r#"DELETE FROM problems"#).execute(&mut *txn).await?;
        sqlx::query(
            r#"UPDATE users SET total_points = 0, total_problems = 0, level = 'novice'"#,
        )
        .execute(&mut *txn)
        .await?;

        let settings = SeasonSettings {
            current_season: new_season.to_string(),
            season_start_date: start,
            season_end_date: end,
            is_active: true,
            is_finished: false,
        };
        sqlx::query(
            r#"
            INSERT INTO season_settings
                (id, current_season, season_start_date, season_end_date, is_active, is_finished)
            VALUES ('current', $1, $2, $3, TRUE, FALSE)
            ON CONFLICT (id) DO UPDATE SET
                current_season = EXCLUDED.current_season,
                season_start_date = EXCLUDED.season_start_date,
                season_end_date = EXCLUDED.season_end_date,
                is_active = EXCLUDED.is_active,
                is_finished = EXCLUDED.is_finished
            "#,
        )
        .bind(&settings.current_season)
        .bind(settings.season_start_date)
        .bind(settings.season_end_date)
        .execute(&mut *txn)
        .await?;

        txn.commit().await?;
        Ok(settings)
    }

    async fn season_totals(&self) -> AppResult<SeasonTotals> {
        #[derive(sqlx::FromRow)]
        struct MemberTotals {
            participant_count: i64,
            total_points: i64,
        }

        let members = sqlx::query_as::<_, MemberTotals>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE total_points > 0) AS participant_count,
                COALESCE(SUM(total_points), 0)::BIGINT AS total_points
            FROM users
            WHERE role <> 'admin'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let problem_count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM problems"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(SeasonTotals {
            participant_count: members.participant_count,
            problem_count,
            total_points: members.total_points,
        })
    }
}
