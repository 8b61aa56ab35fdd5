use axum::handler::Handler;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;

use crate::auth::{authz, middleware};
use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/tours",
            get(handlers::list_tours).post(
                handlers::create_tour
                    .layer(from_fn(authz::restrict_staff))
                    .layer(from_fn_with_state(state.clone(), middleware::authenticate)),
            ),
        )
        .route(
            "/tours/:tour_id",
            get(handlers::get_tour).delete(
                handlers::delete_tour
                    .layer(from_fn(authz::restrict_staff))
                    .layer(from_fn_with_state(state, middleware::authenticate)),
            ),
        )
}
