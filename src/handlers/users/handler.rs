//! User handler implementations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::identity::CurrentUser,
    services::{PointsService, UserService},
    state::AppState,
};

use super::{
    request::{GrantPointsRequest, LeaderboardQuery},
    response::{
        LeaderboardEntry, LeaderboardResponse, LedgerEntryResponse, LedgerResponse, UserResponse,
        UsersListResponse,
    },
};

/// The caller's own profile
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

/// List all users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<UsersListResponse>> {
    let users = UserService::list(state.store(), &user).await?;
    let total = users.len();

    Ok(Json(UsersListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        total,
    }))
}

/// Get a specific user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = UserService::get(state.store(), id).await?;
    Ok(Json(user.into()))
}

/// Remove a user and everything they contributed (admin only)
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    UserService::delete(state.store(), &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Grant points to a user directly (admin only)
pub async fn grant_points(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<GrantPointsRequest>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;

    let updated =
        PointsService::grant(state.store(), &user, id, payload.points, &payload.reason).await?;
    Ok(Json(updated.into()))
}

/// Recompute a user's totals from the ledger (admin only)
pub async fn recompute(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let repaired = PointsService::recompute(state.store(), &user, id).await?;
    Ok(Json(repaired.into()))
}

/// Ledger history for a user (self, or admin for anyone)
pub async fn get_ledger(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LedgerResponse>> {
    let entries = PointsService::ledger(state.store(), &user, id).await?;
    let total_points = entries.iter().map(|e| e.points).sum();

    Ok(Json(LedgerResponse {
        entries: entries.into_iter().map(LedgerEntryResponse::from).collect(),
        total_points,
    }))
}

/// Public leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<LeaderboardResponse>> {
    let users = UserService::leaderboard(state.store(), query.limit).await?;

    Ok(Json(LeaderboardResponse {
        entries: users
            .into_iter()
            .enumerate()
            .map(|(i, u)| LeaderboardEntry::from_user(i + 1, u))
            .collect(),
    }))
}
