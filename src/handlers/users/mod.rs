//! User and points handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{middleware::identity::identity_middleware, state::AppState};

/// User routes; everything here requires identity. The public leaderboard
/// endpoint is mounted separately at the API root.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handler::me))
        .route("/", get(handler::list_users))
        .route("/{id}", get(handler::get_user))
        .route("/{id}", delete(handler::delete_user))
        .route("/{id}/points", post(handler::grant_points))
        .route("/{id}/recompute", post(handler::recompute))
        .route("/{id}/ledger", get(handler::get_ledger))
        .route_layer(middleware::from_fn_with_state(state, identity_middleware))
}
