//! Problem handler implementations

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::identity::CurrentUser,
    services::ProblemService,
    state::AppState,
};

use super::{
    request::{AddBonusRequest, CreateProblemRequest, SetStatusRequest},
    response::{ProblemResponse, ProblemsListResponse},
};

/// List all problems, newest first
pub async fn list_problems(
    State(state): State<AppState>,
) -> AppResult<Json<ProblemsListResponse>> {
    let problems = ProblemService::list(state.store()).await?;
    let total = problems.len();

    Ok(Json(ProblemsListResponse {
        problems: problems.into_iter().map(ProblemResponse::from).collect(),
        total,
    }))
}

/// Get a specific problem
pub async fn get_problem(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProblemResponse>> {
    let problem = ProblemService::get(state.store(), id).await?;
    Ok(Json(problem.into()))
}

/// Submit a new problem report
pub async fn create_problem(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateProblemRequest>,
) -> AppResult<(StatusCode, Json<ProblemResponse>)> {
    payload.validate()?;

    let problem = ProblemService::submit(
        state.store(),
        state.mirror(),
        &user,
        &payload.title,
        &payload.description,
        payload.category,
        payload.images.unwrap_or_default(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(problem.into())))
}

/// Grant bonus points on a problem
pub async fn add_bonus(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddBonusRequest>,
) -> AppResult<Json<ProblemResponse>> {
    let problem = ProblemService::add_bonus(
        state.store(),
        state.mirror(),
        &user,
        id,
        payload.bonus_points,
    )
    .await?;

    Ok(Json(problem.into()))
}

/// Toggle the reviewed marker on a problem
pub async fn toggle_reviewed(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProblemResponse>> {
    let problem = ProblemService::toggle_reviewed(state.store(), &user, id).await?;
    Ok(Json(problem.into()))
}

/// Set the moderation status of a problem
pub async fn set_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> AppResult<Json<ProblemResponse>> {
    let problem =
        ProblemService::set_status(state.store(), &user, id, payload.status).await?;
    Ok(Json(problem.into()))
}
