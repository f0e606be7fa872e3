//! Season handler implementations

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::identity::CurrentUser,
    services::SeasonService,
    state::AppState,
    store::SeasonDefaults,
};

use super::{
    request::ConfigureSeasonRequest,
    response::{SeasonReportResponse, SeasonResponse},
};

/// Current season state
pub async fn get_season(State(state): State<AppState>) -> AppResult<Json<SeasonResponse>> {
    let settings = SeasonService::get(state.store()).await?;
    Ok(Json(settings.into()))
}

/// Season report with podium and totals
pub async fn get_report(State(state): State<AppState>) -> AppResult<Json<SeasonReportResponse>> {
    let report = SeasonService::report(state.store()).await?;
    Ok(Json(report.into()))
}

/// Reconfigure the season definition (admin only)
pub async fn configure(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ConfigureSeasonRequest>,
) -> AppResult<Json<SeasonResponse>> {
    payload.validate()?;

    let settings = SeasonService::configure(
        state.store(),
        &user,
        &payload.season_name,
        payload.start_date,
        payload.end_date,
        payload.is_active.unwrap_or(true),
    )
    .await?;

    Ok(Json(settings.into()))
}

/// Open the season for submissions (admin only)
pub async fn activate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SeasonResponse>> {
    let settings = SeasonService::activate(state.store(), &user).await?;
    Ok(Json(settings.into()))
}

/// Pause submissions without losing data (admin only)
pub async fn deactivate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SeasonResponse>> {
    let settings = SeasonService::deactivate(state.store(), &user).await?;
    Ok(Json(settings.into()))
}

/// Close the season and produce the final report (admin only)
pub async fn finish(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SeasonReportResponse>> {
    let report = SeasonService::finish(state.store(), &user).await?;
    Ok(Json(report.into()))
}

/// Wipe all season data and start fresh (admin only)
pub async fn reset(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SeasonResponse>> {
    let defaults = SeasonDefaults::from_config(&state.config().season);
    let settings = SeasonService::reset(state.store(), &user, &defaults).await?;
    Ok(Json(settings.into()))
}
