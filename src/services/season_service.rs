//! Season service
//!
//! Owns the Inactive/Active/Finished state machine and the season report.
//! Every transition is admin-gated. `reset` is the only path out of a
//! finished season and the only operation that clears accumulated data.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    constants::SEASON_WINNER_COUNT,
    error::{AppError, AppResult},
    models::{SeasonReport, SeasonSettings, SeasonWinner, User},
    services::AdminGate,
    store::{DataStore, SeasonDefaults},
};

/// Season controller service
pub struct SeasonService;

impl SeasonService {
    /// Current settings (created with defaults on first access)
    pub async fn get(store: &dyn DataStore) -> AppResult<SeasonSettings> {
        store.get_settings().await
    }

    /// Reconfigure the season definition.
    ///
    /// Allowed in any state; configuring while finished starts defining the
    /// next season but does not clear `is_finished`; only `reset` does.
    pub async fn configure(
        store: &dyn DataStore,
        actor: &User,
        name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        initial_active: bool,
    ) -> AppResult<SeasonSettings> {
        AdminGate::ensure_admin(actor)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Season name must not be empty".to_string(),
            ));
        }
        if end <= start {
            return Err(AppError::Validation(
                "Season end date must be after the start date".to_string(),
            ));
        }

        let mut settings = store.get_settings().await?;
        settings.current_season = name.to_string();
        settings.season_start_date = start;
        settings.season_end_date = end;
        settings.is_active = initial_active && !settings.is_finished;
        store.save_settings(&settings).await?;

        tracing::info!(season = %settings.current_season, "season reconfigured");
        Ok(settings)
    }

    /// Inactive → Active. No-op when already active; a finished season must
    /// be reset first.
    pub async fn activate(store: &dyn DataStore, actor: &User) -> AppResult<SeasonSettings> {
        AdminGate::ensure_admin(actor)?;

        let mut settings = store.get_settings().await?;
        if settings.is_finished {
            return Err(AppError::Validation(
                "Season is finished; reset it to start a new one".to_string(),
            ));
        }
        if !settings.is_active {
            settings.is_active = true;
            store.save_settings(&settings).await?;
            tracing::info!(season = %settings.current_season, "season activated");
        }
        Ok(settings)
    }

    /// Active → Inactive. No-op when already inactive. Blocks new
    /// submissions only; no data is cleared.
    pub async fn deactivate(store: &dyn DataStore, actor: &User) -> AppResult<SeasonSettings> {
        AdminGate::ensure_admin(actor)?;

        let mut settings = store.get_settings().await?;
        if settings.is_finished {
            return Err(AppError::Validation(
                "Season is finished; reset it to start a new one".to_string(),
            ));
        }
        if settings.is_active {
            settings.is_active = false;
            store.save_settings(&settings).await?;
            tracing::info!(season = %settings.current_season, "season deactivated");
        }
        Ok(settings)
    }

    /// Close the season and produce the final report.
    ///
    /// Data is kept so the report stays queryable; re-running on an already
    /// finished season recomputes the same report.
    pub async fn finish(store: &dyn DataStore, actor: &User) -> AppResult<SeasonReport> {
        AdminGate::ensure_admin(actor)?;

        let mut settings = store.get_settings().await?;
        settings.is_active = false;
        settings.is_finished = true;
        store.save_settings(&settings).await?;

        let report = Self::build_report(store, &settings).await?;
        tracing::info!(
            season = %report.season,
            participants = report.participant_count,
            "season finished"
        );
        Ok(report)
    }

    /// The report for a finished (or running) season, without changing state
    pub async fn report(store: &dyn DataStore) -> AppResult<SeasonReport> {
        let settings = store.get_settings().await?;
        Self::build_report(store, &settings).await
    }

    /// Wipe all accumulated data and start a fresh active season.
    ///
    /// Safe to re-run: clearing already-empty collections and re-zeroing
    /// totals changes nothing.
    pub async fn reset(
        store: &dyn DataStore,
        actor: &User,
        defaults: &SeasonDefaults,
    ) -> AppResult<SeasonSettings> {
        AdminGate::ensure_admin(actor)?;

        let now = Utc::now();
        let new_season = Self::generate_season_name(now);
        let settings = store
            .apply_reset(
                &new_season,
                now,
                now + chrono::Duration::days(defaults.length_days),
            )
            .await?;

        tracing::info!(season = %settings.current_season, "season reset");
        Ok(settings)
    }

    async fn build_report(
        store: &dyn DataStore,
        settings: &SeasonSettings,
    ) -> AppResult<SeasonReport> {
        let totals = store.season_totals().await?;
        let winners = store
            .leaderboard(SEASON_WINNER_COUNT)
            .await?
            .iter()
            .enumerate()
            .map(|(i, user)| SeasonWinner::from_user(i + 1, user))
            .collect();

        Ok(SeasonReport {
            season: settings.current_season.clone(),
            finished_at: Utc::now(),
            participant_count: totals.participant_count,
            problem_count: totals.problem_count,
            total_points: totals.total_points,
            winners,
        })
    }

    /// Fresh season identifier for resets
    fn generate_season_name(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("Season {}-{}", now.format("%Y-%m-%d"), &suffix[..8])
    }
}
