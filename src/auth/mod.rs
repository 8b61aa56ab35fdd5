use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

pub mod authz;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod reset;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/users/me", get(handlers::me))
        .route("/users/update-password", patch(handlers::update_password))
        .route_layer(from_fn_with_state(state.clone(), middleware::authenticate));

    let soft = Router::new()
        .route("/users/session", get(handlers::session))
        .route_layer(from_fn_with_state(state, middleware::maybe_authenticate));

    Router::new()
        .route("/users/signup", post(handlers::signup))
        .route("/users/login", post(handlers::login))
        .route("/users/logout", get(handlers::logout))
        .route("/users/forgot-password", post(handlers::forgot_password))
        .route("/users/reset-password/:token", patch(handlers::reset_password))
        .merge(protected)
        .merge(soft)
}
