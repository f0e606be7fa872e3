//! Problem reporting handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{middleware::identity::identity_middleware, state::AppState};

/// Problem routes; reads are public, mutations require identity.
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(handler::list_problems))
        .route("/{id}", get(handler::get_problem));

    let authed = Router::new()
        .route("/", post(handler::create_problem))
        .route("/{id}/bonus", post(handler::add_bonus))
        .route("/{id}/reviewed", post(handler::toggle_reviewed))
        .route("/{id}/status", put(handler::set_status))
        .route_layer(middleware::from_fn_with_state(state, identity_middleware));

    public.merge(authed)
}
