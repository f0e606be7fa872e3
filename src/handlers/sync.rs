//! Mirror sync handlers

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::{
    error::AppResult,
    middleware::identity::CurrentUser,
    services::SyncService,
    state::AppState,
};

/// Full sync response
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub users: usize,
    pub problems: usize,
}

/// Enqueue a full mirror re-export (admin only)
async fn sync_all(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SyncResponse>> {
    let (users, problems) = SyncService::sync_all(state.store(), state.mirror(), &user).await?;
    Ok(Json(SyncResponse { users, problems }))
}

/// Sync routes (identity layer applied by the caller)
pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(sync_all))
}
