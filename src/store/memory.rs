//! In-memory backend
//!
//! Local/simulated persistence used for development and tests. The whole
//! dataset sits behind one `RwLock`, so every compound operation is a single
//! critical section and the atomicity contract holds trivially.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        LedgerSource, Level, PointsLedgerEntry, Problem, ProblemStatus, Role, SeasonSettings,
        SeasonTotals, User,
    },
    store::{DataStore, NewProblem, PointsGrant, SeasonDefaults, UserIdentity},
};

use async_trait::async_trait;

/// In-memory data store
pub struct MemoryStore {
    defaults: SeasonDefaults,
    inner: RwLock<Dataset>,
}

#[derive(Default)]
struct Dataset {
    users: HashMap<Uuid, User>,
    problems: HashMap<Uuid, Problem>,
    ledger: Vec<PointsLedgerEntry>,
    settings: Option<SeasonSettings>,
}

impl MemoryStore {
    pub fn new(defaults: SeasonDefaults) -> Self {
        Self {
            defaults,
            inner: RwLock::new(Dataset::default()),
        }
    }
}

impl Dataset {
    fn user_mut(&mut self, id: Uuid) -> AppResult<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Append a ledger entry and update the recipient's aggregate view.
    fn apply_grant(&mut self, grant: PointsGrant, now: DateTime<Utc>) -> AppResult<User> {
        let user = self.user_mut(grant.user_id)?;
        user.total_points += grant.points;
        user.level = Level::for_points(user.total_points);
        user.last_active = now;
        let snapshot = user.clone();

        self.ledger.push(PointsLedgerEntry {
            id: Uuid::new_v4(),
            user_id: grant.user_id,
            problem_id: grant.problem_id,
            points: grant.points,
            reason: grant.reason,
            source: grant.source,
            admin_id: grant.admin_id,
            created_at: now,
        });

        Ok(snapshot)
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn upsert_user(&self, identity: UserIdentity) -> AppResult<User> {
        let mut data = self.inner.write().await;
        let now = Utc::now();

        // Same email uniqueness rule the database schema enforces
        if data
            .users
            .values()
            .any(|u| u.id != identity.id && u.email == identity.email)
        {
            return Err(AppError::Database(format!(
                "email already in use: {}",
                identity.email
            )));
        }

        let user = data
            .users
            .entry(identity.id)
            .and_modify(|u| {
                u.email = identity.email.clone();
                u.full_name = identity.full_name.clone();
                u.role = identity.role;
                u.last_active = now;
            })
            .or_insert_with(|| User {
                id: identity.id,
                email: identity.email.clone(),
                full_name: identity.full_name.clone(),
                total_points: 0,
                total_problems: 0,
                level: Level::Novice,
                role: identity.role,
                joined_at: now,
                last_active: now,
            });

        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.get(&id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let data = self.inner.read().await;
        let mut users: Vec<User> = data.users.values().cloned().collect();
        users.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let mut data = self.inner.write().await;
        if data.users.remove(&id).is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let doomed: Vec<Uuid> = data
            .problems
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for problem_id in &doomed {
            data.problems.remove(problem_id);
        }
        data.ledger.retain(|e| {
            e.user_id != id && !e.problem_id.is_some_and(|pid| doomed.contains(&pid))
        });

        Ok(())
    }

    async fn create_problem_with_award(&self, new_problem: NewProblem) -> AppResult<Problem> {
        let mut data = self.inner.write().await;
        let now = Utc::now();

        // Check the author first so no problem exists without its base point
        if !data.users.contains_key(&new_problem.author_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let problem = Problem {
            id: Uuid::new_v4(),
            title: new_problem.title,
            description: new_problem.description,
            category: new_problem.category,
            images: new_problem.images,
            author_id: new_problem.author_id,
            points: crate::constants::BASE_SUBMISSION_POINTS,
            status: ProblemStatus::Pending,
            reviewed: false,
            reviewed_at: None,
            reviewed_by: None,
            created_at: now,
        };
        data.problems.insert(problem.id, problem.clone());

        data.apply_grant(
            PointsGrant {
                user_id: new_problem.author_id,
                points: crate::constants::BASE_SUBMISSION_POINTS,
                reason: crate::constants::reasons::SUBMISSION.to_string(),
                source: LedgerSource::Submission,
                problem_id: Some(problem.id),
                admin_id: None,
            },
            now,
        )?;
        data.user_mut(new_problem.author_id)?.total_problems += 1;

        Ok(problem)
    }

    async fn find_problem(&self, id: Uuid) -> AppResult<Option<Problem>> {
        let data = self.inner.read().await;
        Ok(data.problems.get(&id).cloned())
    }

    async fn list_problems(&self) -> AppResult<Vec<Problem>> {
        let data = self.inner.read().await;
        let mut problems: Vec<Problem> = data.problems.values().cloned().collect();
        problems.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(problems)
    }

    async fn add_bonus(&self, problem_id: Uuid, bonus: i64, admin_id: Uuid) -> AppResult<Problem> {
        let mut data = self.inner.write().await;
        let now = Utc::now();

        let problem = data
            .problems
            .get_mut(&problem_id)
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;
        problem.points += bonus;
        let author_id = problem.author_id;
        let snapshot = problem.clone();

        data.apply_grant(
            PointsGrant {
                user_id: author_id,
                points: bonus,
                reason: crate::constants::reasons::ADMIN_BONUS.to_string(),
                source: LedgerSource::AdminBonus,
                problem_id: Some(problem_id),
                admin_id: Some(admin_id),
            },
            now,
        )?;

        Ok(snapshot)
    }

    async fn toggle_reviewed(&self, problem_id: Uuid, admin_id: Uuid) -> AppResult<Problem> {
        let mut data = self.inner.write().await;
        let problem = data
            .problems
            .get_mut(&problem_id)
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

        if problem.reviewed {
            problem.reviewed = false;
            problem.reviewed_at = None;
            problem.reviewed_by = None;
        } else {
            problem.reviewed = true;
            problem.reviewed_at = Some(Utc::now());
            problem.reviewed_by = Some(admin_id);
        }

        Ok(problem.clone())
    }

    async fn set_problem_status(
        &self,
        problem_id: Uuid,
        status: ProblemStatus,
    ) -> AppResult<Problem> {
        let mut data = self.inner.write().await;
        let problem = data
            .problems
            .get_mut(&problem_id)
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;
        problem.status = status;
        Ok(problem.clone())
    }

    async fn grant_points(&self, grant: PointsGrant) -> AppResult<User> {
        let mut data = self.inner.write().await;
        data.apply_grant(grant, Utc::now())
    }

    async fn ledger_for_user(&self, user_id: Uuid) -> AppResult<Vec<PointsLedgerEntry>> {
        let data = self.inner.read().await;
        let mut entries: Vec<PointsLedgerEntry> = data
            .ledger
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn recompute_user(&self, user_id: Uuid) -> AppResult<User> {
        let mut data = self.inner.write().await;

        let total_points: i64 = data
            .ledger
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.points)
            .sum();
        let total_problems = data
            .problems
            .values()
            .filter(|p| p.author_id == user_id)
            .count() as i64;

        let user = data.user_mut(user_id)?;
        user.total_points = total_points;
        user.total_problems = total_problems;
        user.level = Level::for_points(total_points);
        Ok(user.clone())
    }

    async fn leaderboard(&self, limit: usize) -> AppResult<Vec<User>> {
        let data = self.inner.read().await;
        let mut board: Vec<User> = data
            .users
            .values()
            .filter(|u| u.total_points > 0 && u.role != Role::Admin)
            .cloned()
            .collect();
        board.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(a.joined_at.cmp(&b.joined_at))
        });
        board.truncate(limit);
        Ok(board)
    }

    async fn get_settings(&self) -> AppResult<SeasonSettings> {
        {
            let data = self.inner.read().await;
            if let Some(settings) = &data.settings {
                return Ok(settings.clone());
            }
        }

        let mut data = self.inner.write().await;
        let settings = data
            .settings
            .get_or_insert_with(|| self.defaults.initial_settings(Utc::now()));
        Ok(settings.clone())
    }

    async fn save_settings(&self, settings: &SeasonSettings) -> AppResult<()> {
        let mut data = self.inner.write().await;
        data.settings = Some(settings.clone());
        Ok(())
    }

    async fn apply_reset(
        &self,
        new_season: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<SeasonSettings> {
        let mut data = self.inner.write().await;

        data.problems.clear();
        data.ledger.clear();
        for user in data.users.values_mut() {
            user.total_points = 0;
            user.total_problems = 0;
            user.level = Level::Novice;
        }

        let settings = SeasonSettings {
            current_season: new_season.to_string(),
            season_start_date: start,
            season_end_date: end,
            is_active: true,
            is_finished: false,
        };
        data.settings = Some(settings.clone());
        Ok(settings)
    }

    async fn season_totals(&self) -> AppResult<SeasonTotals> {
        let data = self.inner.read().await;
        let members = data.users.values().filter(|u| u.role != Role::Admin);
        let mut totals = SeasonTotals {
            problem_count: data.problems.len() as i64,
            ..Default::default()
        };
        for user in members {
            totals.total_points += user.total_points;
            if user.total_points > 0 {
                totals.participant_count += 1;
            }
        }
        Ok(totals)
    }
}
