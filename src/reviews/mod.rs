use axum::handler::Handler;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch};
use axum::Router;

use crate::auth::{authz, middleware};
use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/tours/:tour_id/reviews",
            get(handlers::list_reviews)
                .post(handlers::create_review.layer(from_fn(authz::restrict_reviewers))),
        )
        .route(
            "/reviews/:id",
            patch(handlers::update_review.layer(from_fn(authz::restrict_review_owners)))
                .delete(handlers::delete_review.layer(from_fn(authz::restrict_review_owners))),
        )
        .route_layer(from_fn_with_state(state, middleware::authenticate))
}
