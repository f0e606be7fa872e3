//! Season lifecycle handlers

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

/// Season routes; state is publicly readable, transitions require identity.
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(handler::get_season))
        .route("/report", get(handler::get_report));

    let authed = Router::new()
        .route("/", put(handler::configure))
        .route("/activate", post(handler::activate))
        .route("/deactivate", post(handler::deactivate))
        .route("/finish", post(handler::finish))
        .route("/reset", post(handler::reset))
        .route_layer(middleware::from_fn_with_state(state, identity_middleware));

    public.merge(authed)
}
