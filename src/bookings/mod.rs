use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;

use crate::auth::middleware;
use crate::state::AppState;

mod dto;
pub mod gateway;
pub mod handlers;
pub mod reconciler;
pub mod repo;
pub mod webhook;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/bookings/checkout-session/:tour_id",
            get(handlers::checkout_session),
        )
        .route("/bookings/my", get(handlers::my_bookings))
        .route_layer(from_fn_with_state(state, middleware::authenticate))
}
