//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.
//! Read-only endpoints are public; every mutation sits behind the identity
//! middleware, which verifies the provider token and upserts the caller.

pub mod health;
pub mod problems;
pub mod season;
pub mod sync;
pub mod users;

use axum::{middleware, routing::get, Router};

use crate::{middleware::identity::identity_middleware, state::AppState};

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .route("/leaderboard", get(users::leaderboard))
        .nest("/problems", problems::routes(state.clone()))
        .nest("/users", users::routes(state.clone()))
        .nest("/season", season::routes(state.clone()))
        .nest(
            "/sync",
            sync::routes().route_layer(middleware::from_fn_with_state(
                state,
                identity_middleware,
            )),
        )
}
